//! Store client trait and wire-level request/response types.
//!
//! # Responsibility
//! - Describe the opaque `execute(operation, params) -> result | error`
//!   capability of the underlying document store.
//!
//! # Invariants
//! - Implementations must be safe for concurrent use; the client handle is
//!   the only resource shared across callers.
//! - Cursors are opaque to callers; only the issuing client interprets them.

use crate::chain::filter::FilterExpression;
use crate::model::value::Item;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque pagination token returned by `scan`/`query` pages.
pub type Cursor = String;

/// Machine-matchable category of a raw store failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientErrorKind {
    /// The referenced table was never created or was dropped.
    TableMissing,
    /// The request shape was rejected: malformed key, missing parameter,
    /// type mismatch.
    InvalidRequest,
    /// Any other store-reported failure.
    Other,
}

/// Raw failure reported by a store client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientError {
    pub kind: ClientErrorKind,
    pub message: String,
}

impl ClientError {
    pub fn table_missing(message: impl Into<String>) -> Self {
        Self {
            kind: ClientErrorKind::TableMissing,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: ClientErrorKind::InvalidRequest,
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self {
            kind: ClientErrorKind::Other,
            message: message.into(),
        }
    }
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            ClientErrorKind::TableMissing => "table_missing",
            ClientErrorKind::InvalidRequest => "invalid_request",
            ClientErrorKind::Other => "store_error",
        };
        write!(f, "{kind}: {}", self.message)
    }
}

impl Error for ClientError {}

/// One page of scan/query results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Item>,
    /// Present when more pages may follow; feed back as the next cursor.
    pub next_cursor: Option<Cursor>,
}

/// Table metadata reported by `describe_table`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescription {
    pub item_count: u64,
    pub status: String,
}

/// Options for a full-table scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub filter: Option<FilterExpression>,
    /// Restrict returned items to these attributes.
    pub projection: Option<Vec<String>>,
    /// Maximum items in this page; the client may return fewer.
    pub limit: Option<u32>,
    pub cursor: Option<Cursor>,
}

/// Options for an indexed query.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Secondary index to query; `None` targets the primary table key.
    pub index: Option<String>,
    /// Key condition; must constrain the hash key of the target index.
    pub key_condition: FilterExpression,
    /// Additional non-key filter applied after key resolution.
    pub filter: Option<FilterExpression>,
    pub limit: Option<u32>,
    /// Range-key order; `false` reverses (used by `last`).
    pub forward: bool,
    pub cursor: Option<Cursor>,
}

/// Low-level operations of the underlying document store.
///
/// Every method may fail with a store-specific `ClientError`; the repo
/// layer translates those into the domain taxonomy.
pub trait StoreClient: Send + Sync {
    fn get_item(&self, table: &str, key: &Item) -> Result<Option<Item>, ClientError>;
    fn put_item(&self, table: &str, item: Item) -> Result<(), ClientError>;
    fn delete_item(&self, table: &str, key: &Item) -> Result<(), ClientError>;
    fn scan(&self, table: &str, options: &ScanOptions) -> Result<Page, ClientError>;
    fn query(&self, table: &str, options: &QueryOptions) -> Result<Page, ClientError>;
    fn describe_table(&self, table: &str) -> Result<TableDescription, ClientError>;
}
