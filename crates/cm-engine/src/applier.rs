//! Applying a single migration: execute its statements, then record it.

use crate::error::{EngineError, EngineResult};
use crate::ledger;
use cm_core::{split_statements, Migration, MultiError, RunContext};
use cm_db::{Database, DbError};
use std::fs;

/// What happened when one migration was applied.
///
/// The migration is always recorded once statements have been attempted, so
/// `migration` carries the ledger metadata even when `errors` is non-empty.
#[derive(Debug)]
pub struct ApplyOutcome {
    /// The migration as recorded in the ledger
    pub migration: Migration,

    /// Statements that executed successfully
    pub executed: usize,

    /// Statements that failed, in script order
    pub errors: MultiError<DbError>,
}

impl ApplyOutcome {
    /// `true` when every statement succeeded.
    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }

    /// The recorded migration, or [`EngineError::Statements`] if any
    /// statement failed.
    pub fn into_result(self) -> EngineResult<Migration> {
        if self.errors.is_empty() {
            Ok(self.migration)
        } else {
            Err(EngineError::Statements {
                name: self.migration.name,
                errors: self.errors,
            })
        }
    }
}

/// Run every statement of `migration`'s script and append its ledger entry.
///
/// Statements run in order and a failing statement does not stop the ones
/// after it. Reading or splitting the script fails before anything runs, and
/// in that case nothing is recorded.
pub async fn apply_migration(
    db: &dyn Database,
    migration: &Migration,
    ctx: &RunContext,
) -> EngineResult<ApplyOutcome> {
    if ctx.dry_run {
        return Err(EngineError::DryRun {
            name: migration.name.clone(),
        });
    }

    let path = migration
        .source_path
        .as_deref()
        .ok_or_else(|| EngineError::MissingSource {
            name: migration.name.clone(),
        })?;
    let bytes = fs::read(path).map_err(|e| EngineError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    // Invalid UTF-8 (e.g. a Latin-1 comment) decodes to U+FFFD.
    let script = String::from_utf8_lossy(&bytes);
    let statements = split_statements(&script).map_err(|e| EngineError::Split {
        name: migration.name.clone(),
        source: e,
    })?;

    log::info!(
        "Applying '{}' ({}) to '{}'",
        migration.name,
        migration.version,
        ctx.environment
    );

    let mut executed = 0;
    let mut errors = MultiError::new();
    for statement in statements.iter().filter(|s| !s.is_empty()) {
        log::debug!("Executing: {statement}");
        match db.execute(statement).await {
            Ok(_) => executed += 1,
            Err(e) => {
                log::warn!("Statement failed in '{}': {e}", migration.name);
                errors.push(e);
            }
        }
    }

    let recorded = match ledger::record(db, migration, ctx).await {
        Ok(recorded) => recorded,
        Err(EngineError::LedgerWrite { name, source, .. }) => {
            return Err(EngineError::LedgerWrite {
                name,
                source,
                failed: errors,
            });
        }
        Err(e) => return Err(e),
    };
    if !errors.is_empty() {
        log::warn!(
            "Migration '{}' recorded as applied with {} failed statement(s)",
            migration.name,
            errors.len()
        );
    }

    Ok(ApplyOutcome {
        migration: recorded,
        executed,
        errors,
    })
}

#[cfg(test)]
#[path = "applier_test.rs"]
mod tests;
