//! Object-mapping core for a schemaless, DynamoDB-like document store.
//! This crate is the single source of truth for record lifecycle and
//! query-chain semantics.

pub mod chain;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schema;
pub mod store;

pub use chain::filter::FilterExpression;
pub use chain::{Chain, ChainIter, ChainMode};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::record::Record;
pub use model::timestamps::{epoch_ms, CREATED_AT, UPDATED_AT};
pub use model::value::{item_of, Item, Value};
pub use repo::record_repo::RecordRepository;
pub use repo::{ModelError, ModelResult};
pub use schema::field::{Field, FieldType};
pub use schema::{Schema, SchemaBuilder, SecondaryIndex};
pub use store::client::{
    ClientError, ClientErrorKind, Cursor, Page, QueryOptions, ScanOptions, StoreClient,
    TableDescription,
};
pub use store::memory::{IndexDef, MemoryStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
