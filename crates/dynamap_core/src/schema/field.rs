//! Field declarations for record schemas.
//!
//! # Responsibility
//! - Describe one declared attribute: name, type, optional default provider.
//!
//! # Invariants
//! - Default providers are invoked once per record construction, never
//!   cached, so mutable defaults (empty maps) stay private to each record.

use crate::model::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Zero-argument factory producing a fresh default value.
pub type DefaultProvider = Arc<dyn Fn() -> Value + Send + Sync>;

/// Declared type of a schema field.
///
/// The store itself is schemaless; the declared type only drives model-side
/// behavior such as the boolean presence accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Map,
    List,
}

/// One declared attribute of a record type. Immutable once registered.
#[derive(Clone)]
pub struct Field {
    name: String,
    kind: FieldType,
    default: Option<DefaultProvider>,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldType) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    pub fn with_default<F>(name: impl Into<String>, kind: FieldType, provider: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind,
            default: Some(Arc::new(provider)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldType {
        self.kind
    }

    pub fn is_boolean(&self) -> bool {
        self.kind == FieldType::Boolean
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Produces a fresh default value, or `None` when the field has no
    /// default provider.
    pub fn default_value(&self) -> Option<Value> {
        self.default.as_ref().map(|provider| provider())
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("has_default", &self.default.is_some())
            .finish()
    }
}
