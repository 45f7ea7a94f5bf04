//! cm-core - Core library for cqlmig
//!
//! This crate provides the pieces of the migration engine that do not touch
//! the store: migration identity and versioning, statement splitting, script
//! discovery, planning, configuration, and the per-run context.

pub mod checksum;
pub mod config;
pub mod context;
pub mod error;
pub mod lexer;
pub mod migration;
pub mod multi_error;
pub mod planner;
pub mod scanner;
pub mod version;

pub use checksum::{checksum_hex, compute_checksum};
pub use config::{Config, EnvironmentConfig};
pub use context::{current_user, RunContext};
pub use error::{CoreError, CoreResult};
pub use lexer::{split_statements, StatementSplitter};
pub use migration::{contains_migration, sanitize_name, Migration, ALL_ENVIRONMENTS};
pub use multi_error::MultiError;
pub use planner::{plan, sort_by_version, sorted_with, MigrationPlan, PlanStatus, PlannedMigration};
pub use scanner::{scan_directory, ScanReport};
pub use version::Version;
