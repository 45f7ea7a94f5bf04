//! Error types for the migration engine.

use cm_core::{CoreError, MultiError};
use cm_db::DbError;
use thiserror::Error;

/// Migration engine errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The ledger table could not be created (G001).
    #[error("[G001] Failed to initialise the ledger: {0}")]
    LedgerInit(#[source] DbError),

    /// The ledger could not be read back (G002).
    #[error("[G002] Failed to read the ledger: {0}")]
    LedgerRead(#[source] DbError),

    /// Appending a ledger entry failed; the batch cannot continue (G003).
    ///
    /// `failed` holds the statements of the migration that failed before the
    /// write was attempted.
    #[error("[G003] Unable to save migration '{name}' to the ledger: {source}{}", failed_suffix(.failed))]
    LedgerWrite {
        name: String,
        source: DbError,
        failed: MultiError<DbError>,
    },

    /// A ledger row could not be turned back into a migration (G004).
    #[error("[G004] Corrupt ledger entry: {0}")]
    LedgerEntry(#[source] CoreError),

    /// A migration script could not be read (G005).
    #[error("[G005] Failed to read migration script '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// A migration has no script to read (G006).
    #[error("[G006] Migration '{name}' has no source file")]
    MissingSource { name: String },

    /// The script could not be split into statements (G007).
    #[error("[G007] Failed to split migration '{name}': {source}")]
    Split { name: String, source: CoreError },

    /// One or more statements failed; the migration was still recorded (G008).
    #[error("[G008] Migration '{name}' was recorded but {} statement(s) failed: {errors}", .errors.len())]
    Statements {
        name: String,
        errors: MultiError<DbError>,
    },

    /// Some scripts in the directory could not be parsed (G009).
    #[error("[G009] Failed to parse migration files: {0}")]
    Scan(MultiError<CoreError>),

    /// The applier was asked to run during a dry run (G010).
    #[error("[G010] Refusing to apply migration '{name}' during a dry run")]
    DryRun { name: String },

    /// Core error passthrough (G011).
    #[error("[G011] {0}")]
    Core(#[from] CoreError),

    /// Two scripts would share one `(name, version)` ledger key (G012).
    #[error("[G012] Migration '{name}' version {version} for environment '{environment}' conflicts with {existing}: the ledger keys entries by name and version")]
    LedgerKeyConflict {
        name: String,
        version: String,
        environment: String,
        existing: String,
    },
}

fn failed_suffix(failed: &MultiError<DbError>) -> String {
    if failed.is_empty() {
        String::new()
    } else {
        format!("\nStatements that failed before the write:\n{failed}")
    }
}

/// Result type alias for [`EngineError`].
pub type EngineResult<T> = Result<T, EngineError>;
