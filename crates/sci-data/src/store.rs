//! Record-store seam.
//!
//! Every source is read with one [`RangeQuery`]: rows whose date column is on
//! or after the window start, optionally narrowed by section and team. The
//! backend-facing implementation lives in [`crate::rest`]; [`MemoryStore`]
//! applies the same filter semantics in memory for fixtures and tests.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use sci_core::error::{DashboardError, Result};
use sci_core::models::RecordSource;
use sci_core::time_utils::parse_record_date;
use serde_json::Value;
use thiserror::Error;

// ── Errors ────────────────────────────────────────────────────────────────────

/// A failed read against a record store.
///
/// The display text leaves the table out; callers attach it once.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The request never produced a response.
    #[error("request failed: {source}")]
    Request {
        table: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        table: String,
        status: u16,
        message: String,
    },

    /// The backend answered with something other than an array of rows.
    #[error("unexpected payload: {message}")]
    Payload { table: String, message: String },

    /// The table cannot be read at all.
    #[error("unavailable: {message}")]
    Unavailable { table: String, message: String },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

// ── Scope & RangeQuery ────────────────────────────────────────────────────────

/// Organisational filter pair applied uniformly across sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub section_id: Option<String>,
    pub team_id: Option<String>,
}

impl Scope {
    /// Build a scope, treating blank ids as "no filter".
    pub fn new(section_id: Option<String>, team_id: Option<String>) -> Self {
        let clean = |id: Option<String>| {
            id.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        Self {
            section_id: clean(section_id),
            team_id: clean(team_id),
        }
    }
}

/// One filtered range read against a single table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeQuery {
    pub table: String,
    /// Column projection, possibly embedding a joined relation.
    pub select: String,
    /// Column (or `relation.column` path) compared against `since`.
    pub date_column: String,
    /// Inclusive lower bound on `date_column`.
    pub since: NaiveDate,
    /// Equality filters as `(column path, value)` pairs.
    pub equals: Vec<(String, String)>,
}

impl RangeQuery {
    /// The query that reads `source` from `since` onwards within `scope`.
    ///
    /// Section and team filters go through the source's scope relation when
    /// those columns live on a parent record.
    pub fn for_source(source: RecordSource, since: NaiveDate, scope: &Scope) -> Self {
        let prefix = source
            .scope_relation()
            .map(|relation| format!("{}.", relation))
            .unwrap_or_default();

        let mut equals = Vec::new();
        if let Some(section) = &scope.section_id {
            equals.push((format!("{}secao_id", prefix), section.clone()));
        }
        if let Some(team) = &scope.team_id {
            equals.push((format!("{}equipe_id", prefix), team.clone()));
        }

        Self {
            table: source.table().to_string(),
            select: source.projection().to_string(),
            date_column: source.date_column().to_string(),
            since,
            equals,
        }
    }
}

// ── RecordStore ───────────────────────────────────────────────────────────────

/// Anything that can answer a [`RangeQuery`] with raw JSON rows.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn select(&self, query: &RangeQuery) -> StoreResult<Vec<Value>>;
}

// ── MemoryStore ───────────────────────────────────────────────────────────────

/// In-memory tables with the same filter semantics as the backend.
///
/// Dotted column paths reach into embedded relations (an embedded array is
/// read through its first element). Rows whose date column is missing or
/// unparsable never match the lower bound, like SQL `NULL`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: HashMap<String, Vec<Value>>,
    failures: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the rows of `table`.
    pub fn with_table(mut self, table: impl Into<String>, rows: Vec<Value>) -> Self {
        self.tables.insert(table.into(), rows);
        self
    }

    /// Make every read of `table` fail with `message`.
    pub fn fail_table(mut self, table: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures.insert(table.into(), message.into());
        self
    }

    /// Build a store from a JSON object mapping table names to row arrays.
    ///
    /// Entries whose value is not an array are ignored.
    pub fn from_json(document: Value) -> Result<Self> {
        let Value::Object(map) = document else {
            return Err(DashboardError::Config(
                "fixture must be a JSON object of table arrays".to_string(),
            ));
        };

        let tables = map
            .into_iter()
            .filter_map(|(table, rows)| match rows {
                Value::Array(rows) => Some((table, rows)),
                _ => {
                    tracing::warn!(table = %table, "fixture entry is not an array; ignoring");
                    None
                }
            })
            .collect();

        Ok(Self {
            tables,
            failures: HashMap::new(),
        })
    }

    /// Load a fixture file written in the [`MemoryStore::from_json`] shape.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| DashboardError::FixtureRead {
            path: path.to_path_buf(),
            source,
        })?;
        let document: Value = serde_json::from_str(&content)?;
        Self::from_json(document)
    }

    /// Number of rows held for `table`.
    pub fn row_count(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, Vec::len)
    }

    fn matches(row: &Value, query: &RangeQuery) -> bool {
        let on_or_after = lookup(row, &query.date_column)
            .and_then(scalar_text)
            .and_then(|s| parse_record_date(&s))
            .is_some_and(|date| date >= query.since);

        on_or_after
            && query.equals.iter().all(|(column, expected)| {
                lookup(row, column).and_then(scalar_text).as_deref() == Some(expected.as_str())
            })
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn select(&self, query: &RangeQuery) -> StoreResult<Vec<Value>> {
        if let Some(message) = self.failures.get(&query.table) {
            return Err(StoreError::Unavailable {
                table: query.table.clone(),
                message: message.clone(),
            });
        }

        let rows = self
            .tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| Self::matches(row, query))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }
}

/// Follow a dotted path through nested objects.
fn lookup<'a>(row: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(row, |current, segment| {
        let current = match current {
            Value::Array(items) => items.first()?,
            other => other,
        };
        current.get(segment)
    })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
