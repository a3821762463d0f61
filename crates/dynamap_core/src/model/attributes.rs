//! Per-record attribute store.
//!
//! # Responsibility
//! - Hold one record's current attribute state, gated by its schema.
//! - Apply field defaults on construction.
//!
//! # Invariants
//! - Only the primary key and declared fields may be written; writes to
//!   unknown names are silently dropped. This preserves the permissive
//!   policy of the store layer this module models; typos in field names go
//!   unnoticed by design.
//! - Defaults come from a fresh `default_provider()` call per record.

use crate::model::value::{Item, Value};
use crate::schema::Schema;
use std::sync::Arc;

/// Attribute state owned exclusively by one record.
#[derive(Debug, Clone)]
pub struct Attributes {
    schema: Arc<Schema>,
    values: Item,
}

impl Attributes {
    /// Builds the store from initial attributes, then fills absent fields
    /// that declare defaults.
    pub(crate) fn new(schema: Arc<Schema>, initial: Item) -> Self {
        let mut attributes = Self {
            schema,
            values: Item::new(),
        };
        attributes.assign_many(initial);
        attributes.apply_defaults();
        attributes
    }

    fn apply_defaults(&mut self) {
        let defaults: Vec<(String, Value)> = self
            .schema
            .fields()
            .filter(|field| !self.values.contains_key(field.name()))
            .filter_map(|field| {
                field
                    .default_value()
                    .map(|value| (field.name().to_string(), value))
            })
            .collect();
        for (name, value) in defaults {
            self.values.insert(name, value);
        }
    }

    pub fn read(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Sets `name` to `value`; a no-op when the schema does not know `name`.
    pub fn write(&mut self, name: &str, value: Value) {
        if self.schema.knows(name) {
            self.values.insert(name.to_string(), value);
        }
    }

    /// Applies `write` for every entry; order-independent point updates.
    pub fn assign_many(&mut self, entries: Item) {
        for (name, value) in entries {
            self.write(&name, value);
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn values(&self) -> &Item {
        &self.values
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }
}
