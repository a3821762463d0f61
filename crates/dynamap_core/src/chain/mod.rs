//! Lazy, composable query chains over scan and indexed-query reads.
//!
//! # Responsibility
//! - Accumulate index selection, filter conditions and limits as pure
//!   builder steps.
//! - Execute against the storage gateway only when a terminal operation
//!   runs, following pagination cursors on demand.
//!
//! # Invariants
//! - Builder steps return new chain values; a chain can be branched and
//!   reused, and every terminal re-executes from scratch.
//! - No page is requested beyond what `limit`/`first`/`last` require.
//! - Query-mode chains need a `where` condition before any terminal; a
//!   key-less query has no well-defined answer and fails loudly.
//! - The mode is fixed by the entry point; `index` on a scan-mode chain is
//!   rejected at terminal time instead of silently ignored.

pub mod filter;

use crate::model::record::Record;
use crate::model::value::Value;
use crate::repo::record_repo::RecordRepository;
use crate::repo::{ModelError, ModelResult};
use crate::store::client::{Cursor, QueryOptions, ScanOptions, StoreClient};
use filter::FilterExpression;
use std::collections::VecDeque;

/// Access pattern a chain resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainMode {
    /// Full-table read, optionally filtered.
    Scan,
    /// Indexed read scoped by a key condition.
    Query,
}

/// Immutable-per-step query builder producing lazy record sequences.
#[derive(Debug)]
pub struct Chain<'a, C: StoreClient> {
    repo: &'a RecordRepository<C>,
    mode: ChainMode,
    index_name: Option<String>,
    filter: Option<FilterExpression>,
    limit: Option<u32>,
    reverse: bool,
}

impl<C: StoreClient> Clone for Chain<'_, C> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo,
            mode: self.mode,
            index_name: self.index_name.clone(),
            filter: self.filter.clone(),
            limit: self.limit,
            reverse: self.reverse,
        }
    }
}

impl<'a, C: StoreClient> Chain<'a, C> {
    pub(crate) fn new(repo: &'a RecordRepository<C>, mode: ChainMode) -> Self {
        Self {
            repo,
            mode,
            index_name: None,
            filter: None,
            limit: None,
            reverse: false,
        }
    }

    pub fn mode(&self) -> ChainMode {
        self.mode
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }

    pub fn limit_value(&self) -> Option<u32> {
        self.limit
    }

    // -- builder steps -------------------------------------------------------

    /// Narrows the chain with an equality condition (logical AND).
    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.merge_filter(FilterExpression::equality(field, value));
        self
    }

    /// Narrows the chain with an expression string and bound values.
    pub fn where_expr<K, V, I>(mut self, expression: &str, values: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.merge_filter(FilterExpression::with_values(expression, values));
        self
    }

    /// Selects the secondary index to query against.
    ///
    /// Only meaningful in query mode; scan-mode terminals reject a chain
    /// carrying an index with `InvalidQuery`.
    pub fn index(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    /// Caps the number of items terminals will see; pagination stops once
    /// the cap is reached.
    pub fn limit(mut self, n: u32) -> Self {
        self.limit = Some(n);
        self
    }

    fn merge_filter(&mut self, condition: FilterExpression) {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
    }

    // -- terminal operations -------------------------------------------------

    /// Starts lazy execution, validating the chain is resolvable first.
    pub fn iter(&self) -> ModelResult<ChainIter<'a, C>> {
        self.ensure_executable()?;
        Ok(ChainIter {
            repo: self.repo,
            mode: self.mode,
            index_name: self.index_name.clone(),
            filter: self.filter.clone(),
            limit: self.limit,
            reverse: self.reverse,
            buffer: VecDeque::new(),
            cursor: None,
            produced: 0,
            exhausted: false,
        })
    }

    /// Runs `f` for every produced record.
    pub fn each<F: FnMut(Record)>(&self, mut f: F) -> ModelResult<()> {
        for record in self.iter()? {
            f(record?);
        }
        Ok(())
    }

    /// Eagerly collects the lazy sequence.
    pub fn to_vec(&self) -> ModelResult<Vec<Record>> {
        self.iter()?.collect()
    }

    /// Returns the first produced record without paginating further.
    pub fn first(&self) -> ModelResult<Option<Record>> {
        let limited = self.clone().limit(1);
        limited.iter()?.next().transpose()
    }

    /// Returns the last record in range-key order.
    ///
    /// Only defined for query-mode chains narrowed by a `where` condition;
    /// executes in reverse order and takes one item.
    pub fn last(&self) -> ModelResult<Option<Record>> {
        if self.mode == ChainMode::Scan {
            return Err(ModelError::InvalidQuery(
                "last is not defined for scan chains".to_string(),
            ));
        }
        let mut reversed = self.clone().limit(1);
        reversed.reverse = true;
        reversed.iter()?.next().transpose()
    }

    fn ensure_executable(&self) -> ModelResult<()> {
        match self.mode {
            ChainMode::Scan => {
                if self.index_name.is_some() {
                    return Err(ModelError::InvalidQuery(
                        "index is not applicable to scan chains".to_string(),
                    ));
                }
            }
            ChainMode::Query => {
                if self.filter.is_none() {
                    return Err(ModelError::InvalidQuery(
                        "query chain has no key condition; add a where clause".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Lazy execution state of one terminal run.
///
/// Buffers one page at a time and requests the next only when the consumer
/// demands more items than already produced.
pub struct ChainIter<'a, C: StoreClient> {
    repo: &'a RecordRepository<C>,
    mode: ChainMode,
    index_name: Option<String>,
    filter: Option<FilterExpression>,
    limit: Option<u32>,
    reverse: bool,
    buffer: VecDeque<crate::model::value::Item>,
    cursor: Option<Cursor>,
    produced: u32,
    exhausted: bool,
}

impl<C: StoreClient> ChainIter<'_, C> {
    fn fetch_page(&mut self) -> ModelResult<()> {
        let remaining = self.limit.map(|limit| limit - self.produced);
        let page = match self.mode {
            ChainMode::Scan => self.repo.gateway().scan(&ScanOptions {
                filter: self.filter.clone(),
                projection: None,
                limit: remaining,
                cursor: self.cursor.take(),
            })?,
            ChainMode::Query => {
                let key_condition = self.filter.clone().ok_or_else(|| {
                    ModelError::InvalidQuery(
                        "query chain has no key condition; add a where clause".to_string(),
                    )
                })?;
                self.repo.gateway().query(&QueryOptions {
                    index: self.index_name.clone(),
                    key_condition,
                    filter: None,
                    limit: remaining,
                    forward: !self.reverse,
                    cursor: self.cursor.take(),
                })?
            }
        };
        self.buffer.extend(page.items);
        self.cursor = page.next_cursor;
        if self.cursor.is_none() {
            self.exhausted = true;
        }
        Ok(())
    }
}

impl<C: StoreClient> Iterator for ChainIter<'_, C> {
    type Item = ModelResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(limit) = self.limit {
                if self.produced >= limit {
                    return None;
                }
            }
            if let Some(item) = self.buffer.pop_front() {
                self.produced += 1;
                return Some(Ok(self.repo.record_from_item(item)));
            }
            if self.exhausted {
                return None;
            }
            if let Err(err) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(err));
            }
        }
    }
}
