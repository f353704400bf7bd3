//! Remote store abstraction.
//!
//! The remote is a set of tables of JSON rows addressed by table name and
//! keyed by `id`. Queries carry equality and greater-than filters; upserts
//! overwrite the row with the same id instead of rejecting it. Push always
//! sends whole records, so an upserted row is the pushed row.

use crate::error::{SyncError, SyncResult};
use bizsync_model::{parse_timestamp, Record};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// A single column filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `column = value`
    Eq {
        /// Column name.
        column: String,
        /// Expected value.
        value: String,
    },
    /// `column > value`, compared as timestamps.
    Gt {
        /// Column name.
        column: String,
        /// Lower bound (exclusive).
        value: String,
    },
}

impl Filter {
    /// Returns true if a row passes this filter.
    pub fn matches(&self, row: &Record) -> bool {
        match self {
            Filter::Eq { column, value } => match row.get(column) {
                Some(Value::String(s)) => s == value,
                Some(Value::Null) | None => false,
                Some(other) => other.to_string() == *value,
            },
            Filter::Gt { column, value } => {
                let actual = row.get(column).and_then(Value::as_str).and_then(parse_timestamp);
                match (actual, parse_timestamp(value)) {
                    (Some(actual), Some(bound)) => actual > bound,
                    _ => false,
                }
            }
        }
    }
}

/// A filtered select over one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteQuery {
    /// Filters, all of which must match.
    pub filters: Vec<Filter>,
}

impl RemoteQuery {
    /// Creates an unfiltered query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality filter.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(Filter::Eq {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    /// Adds a greater-than filter.
    pub fn gt(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(Filter::Gt {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    /// Returns true if a row passes every filter.
    pub fn matches(&self, row: &Record) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }
}

/// The remote store collaborator.
///
/// This trait abstracts the network layer, allowing for different
/// implementations (HTTP, in-memory for testing, etc.).
pub trait RemoteStore: Send + Sync {
    /// Returns the rows of `table` matching `query`.
    fn query(&self, table: &str, query: &RemoteQuery) -> SyncResult<Vec<Record>>;

    /// Inserts `rows` into `table`, updating in place on an existing id.
    fn upsert(&self, table: &str, rows: &[Record]) -> SyncResult<()>;
}

impl<R: RemoteStore + ?Sized> RemoteStore for &R {
    fn query(&self, table: &str, query: &RemoteQuery) -> SyncResult<Vec<Record>> {
        (**self).query(table, query)
    }

    fn upsert(&self, table: &str, rows: &[Record]) -> SyncResult<()> {
        (**self).upsert(table, rows)
    }
}

impl<R: RemoteStore + ?Sized> RemoteStore for std::sync::Arc<R> {
    fn query(&self, table: &str, query: &RemoteQuery) -> SyncResult<Vec<Record>> {
        (**self).query(table, query)
    }

    fn upsert(&self, table: &str, rows: &[Record]) -> SyncResult<()> {
        (**self).upsert(table, rows)
    }
}

#[derive(Debug, Clone, Copy)]
struct UpsertFailure {
    remaining: u32,
    retryable: bool,
}

/// An in-memory remote store for testing.
///
/// Honors filters and id-keyed upsert, records upsert batch sizes, and can
/// be told to fail queries or upserts for specific tables.
#[derive(Debug, Default)]
pub struct MemoryRemoteStore {
    tables: RwLock<HashMap<String, BTreeMap<String, Record>>>,
    failing_queries: RwLock<HashMap<String, String>>,
    failing_upserts: RwLock<HashMap<String, UpsertFailure>>,
    batches: RwLock<Vec<(String, usize)>>,
}

impl MemoryRemoteStore {
    /// Creates an empty remote.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a row directly, bypassing failure injection.
    pub fn insert_row(&self, table: &str, row: Record) {
        if let Some(id) = row.id().map(str::to_string) {
            self.tables
                .write()
                .entry(table.to_string())
                .or_default()
                .insert(id, row);
        }
    }

    /// Returns every row of a table, ordered by id.
    pub fn rows(&self, table: &str) -> Vec<Record> {
        self.tables
            .read()
            .get(table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns one row by id.
    pub fn row(&self, table: &str, id: &str) -> Option<Record> {
        self.tables.read().get(table).and_then(|rows| rows.get(id)).cloned()
    }

    /// Makes every query against `table` fail.
    pub fn fail_queries(&self, table: &str, message: impl Into<String>) {
        self.failing_queries
            .write()
            .insert(table.to_string(), message.into());
    }

    /// Makes the next `times` upserts against `table` fail.
    pub fn fail_upserts(&self, table: &str, times: u32, retryable: bool) {
        self.failing_upserts.write().insert(
            table.to_string(),
            UpsertFailure {
                remaining: times,
                retryable,
            },
        );
    }

    /// Sizes of successful upsert batches, in call order.
    pub fn upsert_batches(&self) -> Vec<(String, usize)> {
        self.batches.read().clone()
    }

    fn take_upsert_failure(&self, table: &str) -> Option<SyncError> {
        let mut failures = self.failing_upserts.write();
        let failure = failures.get_mut(table)?;
        if failure.remaining == 0 {
            return None;
        }
        failure.remaining -= 1;
        let message = format!("upsert into {table} failed");
        Some(if failure.retryable {
            SyncError::transport_retryable(message)
        } else {
            SyncError::Remote(message)
        })
    }
}

impl RemoteStore for MemoryRemoteStore {
    fn query(&self, table: &str, query: &RemoteQuery) -> SyncResult<Vec<Record>> {
        if let Some(message) = self.failing_queries.read().get(table) {
            return Err(SyncError::transport_fatal(message.clone()));
        }
        Ok(self
            .tables
            .read()
            .get(table)
            .map(|rows| rows.values().filter(|row| query.matches(row)).cloned().collect())
            .unwrap_or_default())
    }

    fn upsert(&self, table: &str, rows: &[Record]) -> SyncResult<()> {
        if let Some(err) = self.take_upsert_failure(table) {
            return Err(err);
        }
        if let Some(index) = rows.iter().position(|row| row.id().is_none()) {
            return Err(SyncError::Remote(format!(
                "{table}: row {index} has no id"
            )));
        }

        let mut tables = self.tables.write();
        let stored = tables.entry(table.to_string()).or_default();
        for row in rows {
            let Some(id) = row.id() else { continue };
            stored.insert(id.to_string(), row.clone());
        }
        self.batches.write().push((table.to_string(), rows.len()));
        Ok(())
    }
}
