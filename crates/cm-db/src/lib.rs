//! cm-db - Store abstraction layer for cqlmig
//!
//! This crate provides the `Database` trait the migration engine executes
//! statements through, and its DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod traits;
pub mod value;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::Database;
pub use value::{Row, SqlValue};
