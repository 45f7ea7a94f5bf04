//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use crate::value::{Row, SqlValue};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duckdb::types::{TimeUnit, Value};
use duckdb::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Schema every DuckDB database starts with.
const DEFAULT_KEYSPACE: &str = "main";

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Open `endpoint` and make `keyspace` the session's default schema.
    ///
    /// The keyspace must already exist; a missing keyspace is a connection
    /// failure, not something to create on the fly.
    pub fn connect(endpoint: &str, keyspace: &str) -> DbResult<Self> {
        log::debug!("Connecting to {endpoint}/{keyspace}");
        let backend = Self::new(endpoint)?;
        backend.use_keyspace(keyspace)?;
        Ok(backend)
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn use_keyspace(&self, keyspace: &str) -> DbResult<()> {
        if keyspace == DEFAULT_KEYSPACE {
            return Ok(());
        }

        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.schemata \
             WHERE catalog_name = current_database() AND schema_name = ?",
            duckdb::params![keyspace],
            |row| row.get(0),
        )?;
        if count == 0 {
            return Err(DbError::KeyspaceNotFound(keyspace.to_string()));
        }

        conn.execute_batch(&format!("SET schema = '{}'", keyspace.replace('\'', "''")))
            .map_err(|e| DbError::ConnectionError(e.to_string()))
    }

    /// Execute SQL synchronously
    fn execute_sync(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
        let conn = self.lock()?;
        let values: Vec<Value> = params.iter().map(to_duckdb_value).collect();
        conn.execute(sql, duckdb::params_from_iter(values))
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))
    }

    /// Execute batch SQL synchronously
    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    /// Collect every row of a query synchronously.
    ///
    /// The column count is read from each row rather than the statement,
    /// since DuckDB only knows it after execution.
    fn query_rows_sync(&self, sql: &str) -> DbResult<Vec<Row>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map([], |row| {
                let col_count = row.as_ref().column_count();
                (0..col_count)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<Result<Vec<_>, _>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|values| values.into_iter().map(from_duckdb_value).collect())
            .collect()
    }

    /// Check if relation exists synchronously
    fn relation_exists_sync(&self, name: &str) -> DbResult<bool> {
        let conn = self.lock()?;

        let count: i64 = if let Some(pos) = name.rfind('.') {
            conn.query_row(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_catalog = current_database() AND table_schema = ? AND table_name = ?",
                duckdb::params![&name[..pos], &name[pos + 1..]],
                |row| row.get(0),
            )?
        } else {
            conn.query_row(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_catalog = current_database() AND table_schema = current_schema() AND table_name = ?",
                duckdb::params![name],
                |row| row.get(0),
            )?
        };

        Ok(count > 0)
    }
}

fn to_duckdb_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(n) => Value::BigInt(*n),
        SqlValue::Text(s) => Value::Text(s.clone()),
        SqlValue::Blob(b) => Value::Blob(b.clone()),
        SqlValue::Timestamp(ts) => Value::Timestamp(TimeUnit::Microsecond, ts.timestamp_micros()),
    }
}

fn from_duckdb_value(value: Value) -> DbResult<SqlValue> {
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::TinyInt(n) => SqlValue::Integer(n.into()),
        Value::SmallInt(n) => SqlValue::Integer(n.into()),
        Value::Int(n) => SqlValue::Integer(n.into()),
        Value::BigInt(n) => SqlValue::Integer(n),
        Value::Text(s) => SqlValue::Text(s),
        Value::Blob(b) => SqlValue::Blob(b),
        Value::Timestamp(unit, raw) => {
            let micros = match unit {
                TimeUnit::Second => raw * 1_000_000,
                TimeUnit::Millisecond => raw * 1_000,
                TimeUnit::Microsecond => raw,
                TimeUnit::Nanosecond => raw / 1_000,
            };
            let ts = DateTime::<Utc>::from_timestamp_micros(micros).ok_or_else(|| {
                DbError::UnexpectedValue {
                    column: "timestamp".to_string(),
                    message: format!("out of range: {micros}"),
                }
            })?;
            SqlValue::Timestamp(ts)
        }
        other => SqlValue::Text(format!("{other:?}")),
    })
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        self.execute_sync(sql, &[])
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.execute_batch_sync(sql)
    }

    async fn execute_with_params(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
        self.execute_sync(sql, params)
    }

    async fn query_rows(&self, sql: &str) -> DbResult<Vec<Row>> {
        self.query_rows_sync(sql)
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.relation_exists_sync(name)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
