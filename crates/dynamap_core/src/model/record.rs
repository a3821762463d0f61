//! Record instance state.
//!
//! # Responsibility
//! - Combine one attribute store with a persistence flag and a shared
//!   schema reference.
//!
//! # Invariants
//! - Records constructed in memory start `persisted = false`; records
//!   loaded from the store start `persisted = true` and bypass create hooks.
//! - A record performs no I/O itself; persistence goes through
//!   `RecordRepository`.

use crate::model::attributes::Attributes;
use crate::model::value::{Item, Value};
use crate::schema::Schema;
use std::sync::Arc;

/// One persisted or in-memory entity instance of a schema-defined type.
#[derive(Debug, Clone)]
pub struct Record {
    attributes: Attributes,
    persisted: bool,
}

impl Record {
    /// Builds a fresh, not-yet-persisted record.
    pub(crate) fn new(schema: Arc<Schema>, initial: Item) -> Self {
        Self {
            attributes: Attributes::new(schema, initial),
            persisted: false,
        }
    }

    /// Builds a record from a stored item; marked persisted from the start.
    pub(crate) fn from_item(schema: Arc<Schema>, item: Item) -> Self {
        Self {
            attributes: Attributes::new(schema, item),
            persisted: true,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.read(name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.attributes.write(name, value.into());
    }

    pub fn assign(&mut self, patch: Item) {
        self.attributes.assign_many(patch);
    }

    /// Boolean presence accessor for declared boolean fields.
    ///
    /// Returns `false` for non-boolean or unknown fields, and for boolean
    /// fields whose value is absent, null or `false`.
    pub fn flag(&self, name: &str) -> bool {
        let declared_boolean = self
            .attributes
            .schema()
            .field(name)
            .is_some_and(|field| field.is_boolean());
        declared_boolean && self.get(name).is_some_and(Value::truthy)
    }

    pub fn primary_key(&self) -> Option<&Value> {
        self.get(self.attributes.schema().primary_key())
    }

    pub fn attributes(&self) -> &Item {
        self.attributes.values()
    }

    pub fn schema(&self) -> &Arc<Schema> {
        self.attributes.schema()
    }

    pub fn persisted(&self) -> bool {
        self.persisted
    }

    pub(crate) fn mark_persisted(&mut self) {
        self.persisted = true;
    }

    pub(crate) fn mark_not_persisted(&mut self) {
        self.persisted = false;
    }

    pub(crate) fn clear_primary_key(&mut self) {
        let name = self.attributes.schema().primary_key().to_string();
        self.attributes.remove(&name);
    }
}
