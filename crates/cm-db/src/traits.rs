//! Database trait definition

use crate::error::DbResult;
use crate::value::{Row, SqlValue};
use async_trait::async_trait;

/// Store client used by the migration engine
///
/// Implementations must be Send + Sync for async operation. Calls are made
/// one at a time; implementations need not support concurrent statements.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute one statement, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute several `;`-separated statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Execute one statement with positional `?` parameters
    async fn execute_with_params(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize>;

    /// Run a query and collect every row
    async fn query_rows(&self, sql: &str) -> DbResult<Vec<Row>>;

    /// Check if a table or view exists in the session's keyspace
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
