//! Error types for cm-db

use thiserror::Error;

/// Store operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Statement execution error (D002)
    #[error("[D002] Statement execution failed: {0}")]
    ExecutionError(String),

    /// Keyspace missing on the store (D003)
    #[error("[D003] Keyspace not found: {0}")]
    KeyspaceNotFound(String),

    /// Query returned a value the caller could not interpret (D004)
    #[error("[D004] Unexpected value in column '{column}': {message}")]
    UnexpectedValue { column: String, message: String },

    /// Mutex poisoned (D006)
    #[error("[D006] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        DbError::ExecutionError(err.to_string())
    }
}
