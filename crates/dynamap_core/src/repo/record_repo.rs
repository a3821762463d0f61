//! Record repository: lifecycle and type-level operations.
//!
//! # Responsibility
//! - Tie schema, callbacks, validations and gateway together into the
//!   create/read/update/delete surface of one record type.
//! - Provide chain entry points for scan and query reads.
//!
//! # Invariants
//! - `before_create` hooks run only for not-yet-persisted records;
//!   `before_save` hooks run on every save.
//! - Presence validations run after hooks and before any store call.
//! - Saves are unconditional overwrites; concurrent writers race and the
//!   last one wins.

use crate::chain::{Chain, ChainMode};
use crate::model::callbacks::{CallbackKind, CallbackSet};
use crate::model::record::Record;
use crate::model::timestamps::{epoch_ms, CREATED_AT, UPDATED_AT};
use crate::model::value::{Item, Value};
use crate::repo::gateway::Gateway;
use crate::repo::{ModelError, ModelResult};
use crate::schema::Schema;
use crate::store::client::{ScanOptions, StoreClient};
use log::debug;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Persistence façade for one record type over a shared store client.
///
/// Built once at type-registration time; hook and validation registration
/// happens through the builder-style methods before first use.
pub struct RecordRepository<C: StoreClient> {
    schema: Arc<Schema>,
    gateway: Gateway<C>,
    callbacks: CallbackSet,
    required: Vec<String>,
}

impl<C: StoreClient> fmt::Debug for RecordRepository<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordRepository")
            .field("table", &self.gateway.table())
            .field("callbacks", &self.callbacks)
            .field("required", &self.required)
            .finish()
    }
}

impl<C: StoreClient> RecordRepository<C> {
    pub fn new(schema: Arc<Schema>, client: Arc<C>) -> Self {
        let gateway = Gateway::new(client, schema.table_name());
        Self {
            schema,
            gateway,
            callbacks: CallbackSet::new(),
            required: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub(crate) fn gateway(&self) -> &Gateway<C> {
        &self.gateway
    }

    // -- type registration ---------------------------------------------------

    pub fn before_create<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Record) + Send + Sync + 'static,
    {
        self.callbacks
            .register(CallbackKind::BeforeCreate, Box::new(hook));
        self
    }

    pub fn before_save<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Record) + Send + Sync + 'static,
    {
        self.callbacks
            .register(CallbackKind::BeforeSave, Box::new(hook));
        self
    }

    pub fn before_update<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Record) + Send + Sync + 'static,
    {
        self.callbacks
            .register(CallbackKind::BeforeUpdate, Box::new(hook));
        self
    }

    pub fn before_delete<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Record) + Send + Sync + 'static,
    {
        self.callbacks
            .register(CallbackKind::BeforeDelete, Box::new(hook));
        self
    }

    /// Requires `field` to be present (non-null, non-blank) before saves.
    pub fn validates_presence(mut self, field: impl Into<String>) -> Self {
        self.required.push(field.into());
        self
    }

    /// Fills the primary key with a fresh UUID on create when unset.
    pub fn autogenerate_primary_key(self) -> Self {
        let key = self.schema.primary_key().to_string();
        self.before_create(move |record| {
            if record.get(&key).is_none_or(Value::is_null) {
                record.set(&key, Uuid::new_v4().to_string());
            }
        })
    }

    /// Maintains `created_at` / `updated_at` in epoch milliseconds.
    ///
    /// The schema must declare both fields (`SchemaBuilder::timestamps`),
    /// otherwise the writes are dropped by the attribute store.
    pub fn track_timestamps(self) -> Self {
        self.before_create(|record| {
            if record.get(CREATED_AT).is_none_or(Value::is_null) {
                record.set(CREATED_AT, epoch_ms());
            }
        })
        .before_save(|record| record.set(UPDATED_AT, epoch_ms()))
    }

    // -- record construction -------------------------------------------------

    /// Builds an empty, not-yet-persisted record with defaults applied.
    pub fn new_record(&self) -> Record {
        self.build(Item::new())
    }

    /// Builds a not-yet-persisted record from initial attributes.
    pub fn build(&self, attrs: Item) -> Record {
        Record::new(self.schema.clone(), attrs)
    }

    pub(crate) fn record_from_item(&self, item: Item) -> Record {
        Record::from_item(self.schema.clone(), item)
    }

    // -- lifecycle -----------------------------------------------------------

    /// Persists the record, propagating every failure.
    ///
    /// Runs `before_create` hooks for new records, then `before_save`
    /// hooks, then presence validations, then an unconditional put of the
    /// full attribute map.
    pub fn save(&self, record: &mut Record) -> ModelResult<()> {
        if !record.persisted() {
            self.callbacks.run(CallbackKind::BeforeCreate, record);
        }
        self.callbacks.run(CallbackKind::BeforeSave, record);
        self.check_presence(record)?;
        self.gateway.put_item(record.attributes().clone())?;
        record.mark_persisted();
        Ok(())
    }

    /// Persists the record, reporting `Generic` store failures as
    /// `Ok(false)` instead of an error. Every other kind propagates.
    pub fn try_save(&self, record: &mut Record) -> ModelResult<bool> {
        match self.save(record) {
            Ok(()) => Ok(true),
            Err(ModelError::Generic(message)) => {
                debug!(
                    "event=record_save module=repo table={} status=soft_fail error={message}",
                    self.gateway.table()
                );
                Ok(false)
            }
            Err(other) => Err(other),
        }
    }

    /// Runs `before_update` hooks, merges `patch`, then saves with
    /// `try_save` semantics.
    pub fn update_attributes(&self, record: &mut Record, patch: Item) -> ModelResult<bool> {
        self.callbacks.run(CallbackKind::BeforeUpdate, record);
        record.assign(patch);
        self.try_save(record)
    }

    /// Removes the remote item, clears the primary key locally, and marks
    /// the record not persisted.
    ///
    /// A record with an unset primary key still issues the delete; the
    /// store treats that as addressing nothing.
    pub fn delete(&self, record: &mut Record) -> ModelResult<()> {
        self.callbacks.run(CallbackKind::BeforeDelete, record);
        let mut key = Item::new();
        key.insert(
            self.schema.primary_key().to_string(),
            record.primary_key().cloned().unwrap_or(Value::Null),
        );
        self.gateway.delete_item(&key)?;
        record.clear_primary_key();
        record.mark_not_persisted();
        Ok(())
    }

    /// Constructs and saves in one step, propagating every failure.
    pub fn create(&self, attrs: Item) -> ModelResult<Record> {
        let mut record = self.build(attrs);
        self.save(&mut record)?;
        Ok(record)
    }

    /// Fetches by primary key; `Ok(None)` when no item exists.
    pub fn find(&self, id: impl Into<Value>) -> ModelResult<Option<Record>> {
        let mut key = Item::new();
        key.insert(self.schema.primary_key().to_string(), id.into());
        let item = self.gateway.get_item(&key)?;
        Ok(item.map(|item| self.record_from_item(item)))
    }

    /// Like `find`, but absent records are an error.
    pub fn find_strict(&self, id: impl Into<Value>) -> ModelResult<Record> {
        let id = id.into();
        self.find(id.clone())?.ok_or_else(|| {
            ModelError::RecordNotFound(format!("unable to find record with key {id:?}"))
        })
    }

    /// Approximate item count from the store's table description.
    pub fn count(&self) -> ModelResult<u64> {
        Ok(self.gateway.describe_table()?.item_count)
    }

    /// Deletes every item, one delete per primary key, no batching.
    ///
    /// Intended for test fixtures, not production data volumes.
    pub fn truncate(&self) -> ModelResult<()> {
        let primary_key = self.schema.primary_key().to_string();
        let mut cursor = None;
        loop {
            let page = self.gateway.scan(&ScanOptions {
                filter: None,
                projection: Some(vec![primary_key.clone()]),
                limit: None,
                cursor,
            })?;
            for item in page.items {
                if let Some(value) = item.get(&primary_key) {
                    let mut key = Item::new();
                    key.insert(primary_key.clone(), value.clone());
                    self.gateway.delete_item(&key)?;
                }
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => return Ok(()),
            }
        }
    }

    // -- chain entry points --------------------------------------------------

    /// Starts a full-table scan chain.
    pub fn scan(&self) -> Chain<'_, C> {
        Chain::new(self, ChainMode::Scan)
    }

    /// Starts an indexed-query chain; add a `where` condition before any
    /// terminal operation.
    pub fn query(&self) -> Chain<'_, C> {
        Chain::new(self, ChainMode::Query)
    }

    /// Shorthand for `query().where_eq(field, value)`.
    pub fn where_eq(&self, field: &str, value: impl Into<Value>) -> Chain<'_, C> {
        self.query().where_eq(field, value)
    }

    fn check_presence(&self, record: &Record) -> ModelResult<()> {
        for name in &self.required {
            let present = match record.get(name) {
                None | Some(Value::Null) => false,
                Some(Value::String(text)) => !text.trim().is_empty(),
                Some(_) => true,
            };
            if !present {
                return Err(ModelError::Validation(format!(
                    "required attribute `{name}` is missing"
                )));
            }
        }
        Ok(())
    }
}
