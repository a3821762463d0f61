//! Persistence layer: gateway, record repository, domain error taxonomy.
//!
//! # Responsibility
//! - Own the domain errors callers pattern-match on.
//! - Keep raw store failures behind the gateway translation boundary.
//!
//! # Invariants
//! - No `ClientError` crosses this layer uncaught; every store failure is
//!   re-expressed as a `ModelError` kind with its original message kept.
//! - Local recovery is limited to `try_save` downgrading `Generic`.

pub mod gateway;
pub mod record_repo;

use crate::store::client::{ClientError, ClientErrorKind};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ModelResult<T> = Result<T, ModelError>;

/// Domain errors surfaced by records, repositories and chains.
///
/// Distinguished by kind, not message text; the embedded string preserves
/// the original diagnostic context for observability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The operation referenced a table that was never created or dropped.
    TableDoesNotExist(String),
    /// Malformed request or failed required-attribute validation; the
    /// caller must fix its input.
    Validation(String),
    /// Transient or unspecified store failure; `try_save` reports it as a
    /// boolean, everything else propagates it.
    Generic(String),
    /// `find_strict` on a missing primary key.
    RecordNotFound(String),
    /// `first`/`last` (or any terminal) on an under-specified chain.
    InvalidQuery(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TableDoesNotExist(message) => write!(f, "table does not exist: {message}"),
            Self::Validation(message) => write!(f, "validation failed: {message}"),
            Self::Generic(message) => write!(f, "store operation failed: {message}"),
            Self::RecordNotFound(message) => write!(f, "record not found: {message}"),
            Self::InvalidQuery(message) => write!(f, "invalid query: {message}"),
        }
    }
}

impl Error for ModelError {}

impl From<ClientError> for ModelError {
    fn from(value: ClientError) -> Self {
        match value.kind {
            ClientErrorKind::TableMissing => Self::TableDoesNotExist(value.message),
            ClientErrorKind::InvalidRequest => Self::Validation(value.message),
            ClientErrorKind::Other => Self::Generic(value.message),
        }
    }
}
