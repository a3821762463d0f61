//! In-memory store client.
//!
//! # Responsibility
//! - Implement `StoreClient` over process-local tables for tests and
//!   development.
//! - Model the store-side semantics the engine relies on: cursor-based
//!   pagination, hash/range secondary indexes, raw error conditions.
//!
//! # Invariants
//! - Tables must be created before use; operations against unknown tables
//!   report `ClientErrorKind::TableMissing`.
//! - `put_item` without a usable primary key reports
//!   `ClientErrorKind::Other`, matching the behavior observed from the real
//!   store; `delete_item` with an absent or null key is a silent no-op.
//! - Scan order is encoded-primary-key order; query order is range-key
//!   order with primary-key tie-breaking.

use crate::model::value::{Item, Value};
use crate::schema::Schema;
use crate::store::client::{
    ClientError, Page, QueryOptions, ScanOptions, StoreClient, TableDescription,
};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::Mutex;

/// Items returned per page unless the request asks for fewer.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Secondary index declaration for a memory table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    pub name: String,
    pub hash_key: String,
    pub range_key: Option<String>,
}

#[derive(Debug, Default)]
struct TableData {
    primary_key: String,
    indexes: Vec<IndexDef>,
    items: BTreeMap<String, Item>,
}

/// Process-local `StoreClient` implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, TableData>>,
    page_size: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Builds a store with a small page size to exercise pagination.
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            page_size: page_size.max(1),
        }
    }

    pub fn create_table(
        &self,
        name: impl Into<String>,
        primary_key: impl Into<String>,
        indexes: Vec<IndexDef>,
    ) {
        let mut tables = self.lock_tables();
        tables.insert(
            name.into(),
            TableData {
                primary_key: primary_key.into(),
                indexes,
                items: BTreeMap::new(),
            },
        );
    }

    /// Creates the table and secondary indexes a schema declares.
    pub fn create_table_for(&self, schema: &Schema) {
        let indexes = schema
            .indexes()
            .iter()
            .map(|index| IndexDef {
                name: index.name().to_string(),
                hash_key: index.hash_key().to_string(),
                range_key: index.range_key().map(str::to_string),
            })
            .collect();
        self.create_table(schema.table_name(), schema.primary_key(), indexes);
    }

    pub fn delete_table(&self, name: &str) -> bool {
        self.lock_tables().remove(name).is_some()
    }

    fn lock_tables(&self) -> std::sync::MutexGuard<'_, HashMap<String, TableData>> {
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn missing_table(table: &str) -> ClientError {
    ClientError::table_missing(format!("table `{table}` not found"))
}

/// Encodes a scalar key value into the canonical map key string.
///
/// The type tag keeps differently typed keys apart: `Number(1.0)` and
/// `String("1")` address distinct items.
fn encode_key(primary_key: &str, value: &Value) -> Result<String, ClientError> {
    match value {
        Value::String(text) => Ok(format!("s:{text}")),
        Value::Number(number) => Ok(format!("n:{number}")),
        Value::Bool(flag) => Ok(format!("b:{flag}")),
        Value::Null | Value::List(_) | Value::Map(_) => Err(ClientError::invalid_request(
            format!("unsupported key type for `{primary_key}`"),
        )),
    }
}

fn project(item: &Item, projection: &Option<Vec<String>>) -> Item {
    match projection {
        Some(names) => item
            .iter()
            .filter(|(name, _)| names.iter().any(|wanted| wanted == *name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect(),
        None => item.clone(),
    }
}

fn parse_failure(err: crate::chain::filter::FilterParseError) -> ClientError {
    ClientError::invalid_request(err.to_string())
}

/// Total order over attribute values used for range-key sorting.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::String(_)) => 4,
            Some(Value::List(_)) => 5,
            Some(Value::Map(_)) => 6,
        }
    }

    match (a, b) {
        (Some(Value::Bool(left)), Some(Value::Bool(right))) => left.cmp(right),
        (Some(Value::Number(left)), Some(Value::Number(right))) => {
            left.partial_cmp(right).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(left)), Some(Value::String(right))) => left.cmp(right),
        _ => rank(a).cmp(&rank(b)),
    }
}

impl StoreClient for MemoryStore {
    fn get_item(&self, table: &str, key: &Item) -> Result<Option<Item>, ClientError> {
        let tables = self.lock_tables();
        let data = tables.get(table).ok_or_else(|| missing_table(table))?;
        let value = key
            .get(&data.primary_key)
            .filter(|value| !value.is_null())
            .ok_or_else(|| {
                ClientError::invalid_request(format!("malformed key: missing `{}`", data.primary_key))
            })?;
        let encoded = encode_key(&data.primary_key, value)?;
        Ok(data.items.get(&encoded).cloned())
    }

    fn put_item(&self, table: &str, item: Item) -> Result<(), ClientError> {
        let mut tables = self.lock_tables();
        let data = tables.get_mut(table).ok_or_else(|| missing_table(table))?;
        let value = item
            .get(&data.primary_key)
            .filter(|value| !value.is_null())
            .ok_or_else(|| {
                ClientError::other(format!(
                    "missing primary key `{}` in item",
                    data.primary_key
                ))
            })?;
        let encoded = encode_key(&data.primary_key, value)?;
        data.items.insert(encoded, item);
        Ok(())
    }

    fn delete_item(&self, table: &str, key: &Item) -> Result<(), ClientError> {
        let mut tables = self.lock_tables();
        let data = tables.get_mut(table).ok_or_else(|| missing_table(table))?;
        // Absent or null key: nothing to address, nothing to fail.
        let Some(value) = key.get(&data.primary_key).filter(|value| !value.is_null()) else {
            return Ok(());
        };
        let encoded = encode_key(&data.primary_key, value)?;
        data.items.remove(&encoded);
        Ok(())
    }

    fn scan(&self, table: &str, options: &ScanOptions) -> Result<Page, ClientError> {
        let tables = self.lock_tables();
        let data = tables.get(table).ok_or_else(|| missing_table(table))?;

        let page_limit = options.limit.unwrap_or(self.page_size).min(self.page_size);
        if page_limit == 0 {
            return Ok(Page::default());
        }

        let range: Box<dyn Iterator<Item = (&String, &Item)>> = match &options.cursor {
            Some(cursor) => Box::new(
                data.items
                    .range::<String, _>((Bound::Excluded(cursor.clone()), Bound::Unbounded)),
            ),
            None => Box::new(data.items.iter()),
        };

        let mut items = Vec::new();
        let mut last_key = None;
        let mut truncated = false;
        for (key, item) in range {
            if items.len() as u32 >= page_limit {
                truncated = true;
                break;
            }
            last_key = Some(key.clone());
            let matched = match &options.filter {
                Some(filter) => filter.matches(item).map_err(parse_failure)?,
                None => true,
            };
            if matched {
                items.push(project(item, &options.projection));
            }
        }

        Ok(Page {
            items,
            next_cursor: if truncated { last_key } else { None },
        })
    }

    fn query(&self, table: &str, options: &QueryOptions) -> Result<Page, ClientError> {
        let tables = self.lock_tables();
        let data = tables.get(table).ok_or_else(|| missing_table(table))?;

        let (hash_key, range_key) = match &options.index {
            Some(name) => {
                let index = data
                    .indexes
                    .iter()
                    .find(|index| index.name == *name)
                    .ok_or_else(|| {
                        ClientError::invalid_request(format!("index `{name}` does not exist"))
                    })?;
                (index.hash_key.clone(), index.range_key.clone())
            }
            None => (data.primary_key.clone(), None),
        };

        let conditions = options.key_condition.equalities().map_err(parse_failure)?;
        let hash_value = conditions
            .iter()
            .find(|(field, _)| *field == hash_key)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| {
                ClientError::invalid_request(format!("key condition must constrain `{hash_key}`"))
            })?;
        let extra: Vec<&(String, Value)> = conditions
            .iter()
            .filter(|(field, _)| *field != hash_key)
            .collect();

        let mut matched: Vec<(&String, &Item)> = Vec::new();
        for (key, item) in &data.items {
            if item.get(&hash_key) != Some(&hash_value) {
                continue;
            }
            if extra
                .iter()
                .any(|(field, value)| item.get(field) != Some(value))
            {
                continue;
            }
            if let Some(filter) = &options.filter {
                if !filter.matches(item).map_err(parse_failure)? {
                    continue;
                }
            }
            matched.push((key, item));
        }

        matched.sort_by(|(key_a, item_a), (key_b, item_b)| {
            let by_range = match &range_key {
                Some(range) => compare_values(item_a.get(range), item_b.get(range)),
                None => Ordering::Equal,
            };
            by_range.then_with(|| key_a.cmp(key_b))
        });
        if !options.forward {
            matched.reverse();
        }

        let page_limit = options.limit.unwrap_or(self.page_size).min(self.page_size);
        if page_limit == 0 {
            return Ok(Page::default());
        }

        let offset = match &options.cursor {
            Some(cursor) => cursor
                .parse::<usize>()
                .map_err(|_| ClientError::invalid_request("invalid query cursor"))?,
            None => 0,
        };

        let items: Vec<Item> = matched
            .iter()
            .skip(offset)
            .take(page_limit as usize)
            .map(|(_, item)| (*item).clone())
            .collect();
        let consumed = offset + items.len();
        let next_cursor = (consumed < matched.len()).then(|| consumed.to_string());

        Ok(Page { items, next_cursor })
    }

    fn describe_table(&self, table: &str) -> Result<TableDescription, ClientError> {
        let tables = self.lock_tables();
        let data = tables.get(table).ok_or_else(|| missing_table(table))?;
        Ok(TableDescription {
            item_count: data.items.len() as u64,
            status: "ACTIVE".to_string(),
        })
    }
}
