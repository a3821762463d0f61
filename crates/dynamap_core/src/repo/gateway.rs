//! Storage gateway: per-table adapter over a shared store client.
//!
//! # Responsibility
//! - Inject the table name into every store call so call sites pass only
//!   operation-specific parameters.
//! - Translate raw `ClientError`s into the domain taxonomy at a single
//!   boundary.
//! - Emit `store_execute` logging events with operation, status and
//!   duration.

use crate::model::value::Item;
use crate::repo::{ModelError, ModelResult};
use crate::store::client::{
    ClientError, ClientErrorKind, Page, QueryOptions, ScanOptions, StoreClient, TableDescription,
};
use log::{debug, error};
use std::sync::Arc;
use std::time::Instant;

/// Thin adapter binding one table to a shared, concurrency-safe client.
#[derive(Debug)]
pub struct Gateway<C: StoreClient> {
    client: Arc<C>,
    table: String,
}

impl<C: StoreClient> Gateway<C> {
    pub fn new(client: Arc<C>, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn get_item(&self, key: &Item) -> ModelResult<Option<Item>> {
        let started_at = Instant::now();
        let result = self.client.get_item(&self.table, key);
        self.observe("get_item", started_at, result)
    }

    pub fn put_item(&self, item: Item) -> ModelResult<()> {
        let started_at = Instant::now();
        let result = self.client.put_item(&self.table, item);
        self.observe("put_item", started_at, result)
    }

    pub fn delete_item(&self, key: &Item) -> ModelResult<()> {
        let started_at = Instant::now();
        let result = self.client.delete_item(&self.table, key);
        self.observe("delete_item", started_at, result)
    }

    pub fn scan(&self, options: &ScanOptions) -> ModelResult<Page> {
        let started_at = Instant::now();
        let result = self.client.scan(&self.table, options);
        self.observe("scan", started_at, result)
    }

    pub fn query(&self, options: &QueryOptions) -> ModelResult<Page> {
        let started_at = Instant::now();
        let result = self.client.query(&self.table, options);
        self.observe("query", started_at, result)
    }

    pub fn describe_table(&self) -> ModelResult<TableDescription> {
        let started_at = Instant::now();
        let result = self.client.describe_table(&self.table);
        self.observe("describe_table", started_at, result)
    }

    fn observe<T>(
        &self,
        op: &str,
        started_at: Instant,
        result: Result<T, ClientError>,
    ) -> ModelResult<T> {
        match result {
            Ok(value) => {
                debug!(
                    "event=store_execute module=repo op={op} table={} status=ok duration_ms={}",
                    self.table,
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                let error_code = match err.kind {
                    ClientErrorKind::TableMissing => "table_missing",
                    ClientErrorKind::InvalidRequest => "invalid_request",
                    ClientErrorKind::Other => "store_error",
                };
                error!(
                    "event=store_execute module=repo op={op} table={} status=error error_code={error_code} duration_ms={} error={err}",
                    self.table,
                    started_at.elapsed().as_millis()
                );
                Err(ModelError::from(err))
            }
        }
    }
}
