//! Backend-neutral parameter and column values.

use crate::error::{DbError, DbResult};
use chrono::{DateTime, Utc};

/// A single bound parameter or returned column value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Text(String),
    Blob(Vec<u8>),
    Timestamp(DateTime<Utc>),
}

/// One result row, columns in `SELECT` order.
pub type Row = Vec<SqlValue>;

impl SqlValue {
    /// Read a text column; `NULL` becomes an empty string.
    pub fn into_text(self, column: &str) -> DbResult<String> {
        match self {
            SqlValue::Text(s) => Ok(s),
            SqlValue::Null => Ok(String::new()),
            other => Err(unexpected(column, "text", &other)),
        }
    }

    /// Read a blob column; `NULL` becomes an empty vector.
    pub fn into_blob(self, column: &str) -> DbResult<Vec<u8>> {
        match self {
            SqlValue::Blob(b) => Ok(b),
            SqlValue::Null => Ok(Vec::new()),
            other => Err(unexpected(column, "blob", &other)),
        }
    }

    /// Read a nullable timestamp column.
    pub fn into_timestamp(self, column: &str) -> DbResult<Option<DateTime<Utc>>> {
        match self {
            SqlValue::Timestamp(ts) => Ok(Some(ts)),
            SqlValue::Null => Ok(None),
            other => Err(unexpected(column, "timestamp", &other)),
        }
    }
}

fn unexpected(column: &str, expected: &str, found: &SqlValue) -> DbError {
    DbError::UnexpectedValue {
        column: column.to_string(),
        message: format!("expected {expected}, found {found:?}"),
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(b: Vec<u8>) -> Self {
        SqlValue::Blob(b)
    }
}

impl From<&[u8]> for SqlValue {
    fn from(b: &[u8]) -> Self {
        SqlValue::Blob(b.to_vec())
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(ts: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(ts)
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        SqlValue::Integer(n)
    }
}
