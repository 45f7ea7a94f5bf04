//! cm-engine - Migration engine for cqlmig
//!
//! Reads and writes the applied ledger, applies single migrations, and runs
//! the `up` batch over any [`cm_db::Database`].

pub mod applier;
pub mod error;
pub mod ledger;
pub mod migrator;

pub use applier::{apply_migration, ApplyOutcome};
pub use error::{EngineError, EngineResult};
pub use ledger::{ensure_ledger, list_applied, list_entries, record, LedgerEntry, LEDGER_TABLE};
pub use migrator::{MigrateReport, Migrator, StatusReport};
