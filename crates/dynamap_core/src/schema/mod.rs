//! Static schema definitions for record types.
//!
//! # Responsibility
//! - Hold the table name, primary key, field registry and secondary indexes
//!   of one record type.
//! - Provide the builder used at type-registration time.
//!
//! # Invariants
//! - A `Schema` is built once and shared read-only (`Arc`) by every record,
//!   repository and chain of its type.
//! - Field names are unique; re-registering a name overwrites the previous
//!   definition (last-writer-wins).

pub mod field;

use crate::model::value::Value;
use field::{Field, FieldType};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Primary key used when a schema does not declare one explicitly.
pub const DEFAULT_PRIMARY_KEY: &str = "content_id";

/// Secondary index declaration: hash key plus optional range key.
///
/// The range key is what gives `last` on a query chain its ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryIndex {
    name: String,
    hash_key: String,
    range_key: Option<String>,
}

impl SecondaryIndex {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hash_key(&self) -> &str {
        &self.hash_key
    }

    pub fn range_key(&self) -> Option<&str> {
        self.range_key.as_deref()
    }
}

/// Read-only schema of one record type.
#[derive(Debug, Clone)]
pub struct Schema {
    table_name: String,
    primary_key: String,
    fields: BTreeMap<String, Field>,
    indexes: Vec<SecondaryIndex>,
}

impl Schema {
    pub fn builder(table_name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(table_name)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Returns whether `name` is the primary key or a declared field.
    pub fn knows(&self, name: &str) -> bool {
        self.primary_key == name || self.fields.contains_key(name)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    pub fn indexes(&self) -> &[SecondaryIndex] {
        &self.indexes
    }

    pub fn index(&self, name: &str) -> Option<&SecondaryIndex> {
        self.indexes.iter().find(|index| index.name == name)
    }

    /// Produces a fresh default for `name`, or `None` when the field is
    /// unknown or has no default provider.
    pub fn default_for(&self, name: &str) -> Option<Value> {
        self.fields.get(name).and_then(Field::default_value)
    }
}

/// Type-registration surface producing a shared `Schema`.
pub struct SchemaBuilder {
    table_name: String,
    primary_key: String,
    fields: BTreeMap<String, Field>,
    indexes: Vec<SecondaryIndex>,
}

impl SchemaBuilder {
    fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            primary_key: DEFAULT_PRIMARY_KEY.to_string(),
            fields: BTreeMap::new(),
            indexes: Vec::new(),
        }
    }

    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        self.primary_key = name.into();
        self
    }

    pub fn field(mut self, name: impl Into<String>, kind: FieldType) -> Self {
        let field = Field::new(name, kind);
        self.fields.insert(field.name().to_string(), field);
        self
    }

    pub fn field_with_default<F>(
        mut self,
        name: impl Into<String>,
        kind: FieldType,
        provider: F,
    ) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        let field = Field::with_default(name, kind, provider);
        self.fields.insert(field.name().to_string(), field);
        self
    }

    /// Declares the `created_at` / `updated_at` timestamp fields.
    ///
    /// Pair with `RecordRepository::track_timestamps` to have them
    /// maintained by lifecycle hooks.
    pub fn timestamps(self) -> Self {
        self.field(crate::model::timestamps::CREATED_AT, FieldType::Number)
            .field(crate::model::timestamps::UPDATED_AT, FieldType::Number)
    }

    pub fn index(self, name: impl Into<String>, hash_key: impl Into<String>) -> Self {
        self.push_index(name, hash_key, None)
    }

    pub fn index_with_range(
        self,
        name: impl Into<String>,
        hash_key: impl Into<String>,
        range_key: impl Into<String>,
    ) -> Self {
        self.push_index(name, hash_key, Some(range_key.into()))
    }

    fn push_index(
        mut self,
        name: impl Into<String>,
        hash_key: impl Into<String>,
        range_key: Option<String>,
    ) -> Self {
        self.indexes.push(SecondaryIndex {
            name: name.into(),
            hash_key: hash_key.into(),
            range_key,
        });
        self
    }

    pub fn build(self) -> Arc<Schema> {
        Arc::new(Schema {
            table_name: self.table_name,
            primary_key: self.primary_key,
            fields: self.fields,
            indexes: self.indexes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Schema, DEFAULT_PRIMARY_KEY};
    use crate::model::value::Value;
    use crate::schema::field::FieldType;

    #[test]
    fn primary_key_defaults_and_can_be_overridden() {
        let schema = Schema::builder("movies").build();
        assert_eq!(schema.primary_key(), DEFAULT_PRIMARY_KEY);

        let custom = Schema::builder("movies").primary_key("custom_id").build();
        assert_eq!(custom.primary_key(), "custom_id");
        assert!(custom.knows("custom_id"));
    }

    #[test]
    fn registering_a_field_twice_overwrites() {
        let schema = Schema::builder("movies")
            .field("title", FieldType::Number)
            .field_with_default("title", FieldType::String, || Value::from("untitled"))
            .build();

        let field = schema.field("title").unwrap();
        assert_eq!(field.kind(), FieldType::String);
        assert_eq!(schema.default_for("title"), Some(Value::from("untitled")));
    }

    #[test]
    fn index_lookup_by_name() {
        let schema = Schema::builder("resources")
            .field("period", FieldType::Number)
            .index_with_range("period_created_at_index", "period", "created_at")
            .build();

        let index = schema.index("period_created_at_index").unwrap();
        assert_eq!(index.hash_key(), "period");
        assert_eq!(index.range_key(), Some("created_at"));
        assert!(schema.index("missing").is_none());
    }

    #[test]
    fn unknown_names_are_not_known() {
        let schema = Schema::builder("movies")
            .field("title", FieldType::String)
            .build();
        assert!(schema.knows("title"));
        assert!(!schema.knows("does_not_exist"));
        assert_eq!(schema.default_for("does_not_exist"), None);
    }
}
