//! SQLite adapter for the loan table
//!
//! The connection is opened read-only on first use, so a missing database
//! surfaces per request as `MissingDatabase` instead of failing startup.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection, OpenFlags, OptionalExtension, Row};

use super::query::GroupedQuery;
use super::schema::{Column, ColumnInfo, LoanRecord};
use super::{AggregateRow, SegmentValue, StoreError, TabularStore};

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

/// Columns fetched by `find_loan`, in `LoanRecord` field order
const RECORD_COLUMNS: [Column; 15] = Column::ALL;

pub struct SqliteStore {
    path: Option<PathBuf>,
    table: String,
    conn: Mutex<Option<Connection>>,
}

impl SqliteStore {
    /// Store backed by a database file, opened lazily
    pub fn open(path: impl Into<PathBuf>, table: &str) -> Result<Self, StoreError> {
        validate_identifier(table)?;
        Ok(Self {
            path: Some(path.into()),
            table: table.to_string(),
            conn: Mutex::new(None),
        })
    }

    /// Store over an already-open connection (in-memory databases)
    pub fn from_connection(conn: Connection, table: &str) -> Result<Self, StoreError> {
        validate_identifier(table)?;
        Ok(Self {
            path: None,
            table: table.to_string(),
            conn: Mutex::new(Some(conn)),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn open_connection(&self) -> Result<Connection, StoreError> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| StoreError::MissingDatabase(PathBuf::from(":memory:")))?;

        if !path.exists() {
            return Err(StoreError::MissingDatabase(path.clone()));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        log::info!("Opened loan database at {}", path.display());
        Ok(conn)
    }

    fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.conn.lock();
        if guard.is_none() {
            *guard = Some(self.open_connection()?);
        }
        match guard.as_ref() {
            Some(conn) => f(conn),
            None => Err(StoreError::MissingDatabase(
                self.path.clone().unwrap_or_default(),
            )),
        }
    }

    fn table_exists(&self, conn: &Connection) -> Result<bool, StoreError> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [&self.table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn map_err(&self, err: rusqlite::Error) -> StoreError {
        if err.to_string().contains("no such table") {
            StoreError::MissingTable(self.table.clone())
        } else {
            StoreError::Sqlite(err)
        }
    }
}

impl TabularStore for SqliteStore {
    fn table_name(&self) -> &str {
        &self.table
    }

    fn row_count(&self) -> Result<u64, StoreError> {
        self.with_connection(|conn| {
            if !self.table_exists(conn)? {
                return Err(StoreError::MissingTable(self.table.clone()));
            }
            let count: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", self.table), [], |row| row.get(0))
                .map_err(|e| self.map_err(e))?;
            Ok(count.max(0) as u64)
        })
    }

    fn aggregate(&self, query: &GroupedQuery) -> Result<Vec<AggregateRow>, StoreError> {
        let (sql, params) = query.to_sql(&self.table);
        log::debug!("aggregate: {}", sql);

        let grouped = query.group.is_some();
        let measure_count = query.measures.len();

        self.with_connection(|conn| {
            let mut stmt = conn.prepare(&sql).map_err(|e| self.map_err(e))?;
            let rows = stmt
                .query_map(params_from_iter(params.iter()), |row| {
                    let offset = usize::from(grouped);
                    let key = if grouped {
                        Some(segment_value(row.get_ref(0)?))
                    } else {
                        None
                    };
                    let mut values = Vec::with_capacity(measure_count);
                    for i in 0..measure_count {
                        values.push(numeric_value(row.get_ref(offset + i)?));
                    }
                    Ok(AggregateRow { key, values })
                })
                .map_err(|e| self.map_err(e))?;

            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|e| self.map_err(e))
        })
    }

    fn columns(&self) -> Result<Vec<ColumnInfo>, StoreError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", self.table))?;
            let columns = stmt
                .query_map([], |row| {
                    Ok(ColumnInfo {
                        name: row.get(1)?,
                        data_type: row.get(2)?,
                        not_null: row.get::<_, i64>(3)? != 0,
                        primary_key: row.get::<_, i64>(5)? != 0,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            if columns.is_empty() {
                return Err(StoreError::MissingTable(self.table.clone()));
            }
            Ok(columns)
        })
    }

    fn find_loan(&self, id: i64) -> Result<Option<LoanRecord>, StoreError> {
        let names: Vec<&str> = RECORD_COLUMNS.iter().map(|c| c.as_str()).collect();
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1",
            names.join(", "),
            self.table,
            Column::Id.as_str()
        );

        self.with_connection(|conn| {
            conn.query_row(&sql, [id], read_loan)
                .optional()
                .map_err(|e| self.map_err(e))
        })
    }
}

fn validate_identifier(table: &str) -> Result<(), StoreError> {
    if IDENTIFIER.is_match(table) {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier(table.to_string()))
    }
}

fn segment_value(value: ValueRef<'_>) -> SegmentValue {
    match value {
        ValueRef::Null => SegmentValue::Null,
        ValueRef::Integer(i) => SegmentValue::Integer(i),
        ValueRef::Real(r) => SegmentValue::Real(r),
        ValueRef::Text(t) | ValueRef::Blob(t) => {
            SegmentValue::Text(String::from_utf8_lossy(t).into_owned())
        }
    }
}

fn numeric_value(value: ValueRef<'_>) -> Option<f64> {
    match value {
        ValueRef::Integer(i) => Some(i as f64),
        ValueRef::Real(r) => Some(r),
        ValueRef::Text(t) => std::str::from_utf8(t).ok().and_then(|s| s.trim().parse().ok()),
        ValueRef::Null | ValueRef::Blob(_) => None,
    }
}

fn real_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<f64> {
    Ok(numeric_value(row.get_ref(idx)?).unwrap_or(0.0))
}

fn int_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<i64> {
    Ok(real_at(row, idx)?.round() as i64)
}

fn text_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => String::new(),
        other => segment_value(other).to_string(),
    })
}

fn read_loan(row: &Row<'_>) -> rusqlite::Result<LoanRecord> {
    Ok(LoanRecord {
        id: int_at(row, 0)?,
        loan_amnt: real_at(row, 1)?,
        term: int_at(row, 2)?,
        int_rate: real_at(row, 3)?,
        installment: real_at(row, 4)?,
        grade: text_at(row, 5)?,
        sub_grade: text_at(row, 6)?,
        emp_length: real_at(row, 7)?,
        home_ownership: text_at(row, 8)?,
        annual_inc: real_at(row, 9)?,
        verification_status: text_at(row, 10)?,
        purpose: text_at(row, 11)?,
        dti: real_at(row, 12)?,
        initial_fico_score: int_at(row, 13)?,
        is_defaulted: int_at(row, 14)?,
    })
}
