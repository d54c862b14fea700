//! Store Module - Loan Table Access
//!
//! The loan table lives in an external tabular store. The engine only sees
//! the `TabularStore` trait: grouped aggregates, a row count, the column
//! catalog and a lookup by id.
//!
//! ## Structure
//! - `schema`: whitelisted columns, `LoanRecord`, `ColumnInfo`
//! - `query`: typed grouped-aggregate queries
//! - `sqlite`: SQLite adapter (the ingestion job writes SQLite)

pub mod schema;
pub mod query;
pub mod sqlite;

#[cfg(test)]
pub(crate) mod fixtures;


use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use query::{Filter, GroupKey, GroupedQuery, Measure, OrderBy, SortDirection};
pub use schema::{Column, ColumnInfo, LoanRecord};
pub use sqlite::SqliteStore;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database not found at {0}. Please run the ingestion job first to create the database.")]
    MissingDatabase(PathBuf),

    #[error("Table '{0}' not found. Please run the ingestion job first.")]
    MissingTable(String),

    #[error("Table '{0}' is empty. Please run the ingestion job first.")]
    EmptyTable(String),

    #[error("Invalid table name '{0}'")]
    InvalidIdentifier(String),

    #[error("Loan record {0} not found")]
    RecordNotFound(i64),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

// ============================================================================
// RESULT ROWS
// ============================================================================

/// Value of a grouping key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SegmentValue {
    Integer(i64),
    Real(f64),
    Text(String),
    Null,
}

impl SegmentValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SegmentValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl std::fmt::Display for SegmentValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentValue::Integer(i) => write!(f, "{}", i),
            SegmentValue::Real(r) => write!(f, "{}", r),
            SegmentValue::Text(s) => write!(f, "{}", s),
            SegmentValue::Null => write!(f, "null"),
        }
    }
}

/// One row of a grouped aggregate: optional key plus one value per measure
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub key: Option<SegmentValue>,
    pub values: Vec<Option<f64>>,
}

impl AggregateRow {
    /// Measure `i`, with SQL NULL (empty group / no rows) read as 0
    pub fn value(&self, i: usize) -> f64 {
        self.values.get(i).copied().flatten().unwrap_or(0.0)
    }

    /// Measure `i` read as a count
    pub fn count(&self, i: usize) -> u64 {
        self.value(i).max(0.0).round() as u64
    }

    pub fn key_or_null(&self) -> SegmentValue {
        self.key.clone().unwrap_or(SegmentValue::Null)
    }
}

// ============================================================================
// STORE TRAIT
// ============================================================================

/// Queryable tabular store holding one row per loan
pub trait TabularStore: Send + Sync {
    fn table_name(&self) -> &str;

    /// Total rows in the loan table
    fn row_count(&self) -> Result<u64, StoreError>;

    /// Run one grouped-aggregate read
    fn aggregate(&self, query: &GroupedQuery) -> Result<Vec<AggregateRow>, StoreError>;

    /// Column catalog of the loan table
    fn columns(&self) -> Result<Vec<ColumnInfo>, StoreError>;

    /// Single loan by id
    fn find_loan(&self, id: i64) -> Result<Option<LoanRecord>, StoreError>;

    /// Fails unless the table exists and holds at least one row
    fn ensure_ready(&self) -> Result<u64, StoreError> {
        let count = self.row_count()?;
        if count == 0 {
            return Err(StoreError::EmptyTable(self.table_name().to_string()));
        }
        Ok(count)
    }
}
