//! The `up` batch: scan, plan, and apply pending migrations in order.

use crate::applier::apply_migration;
use crate::error::{EngineError, EngineResult};
use crate::ledger::{ensure_ledger, list_applied};
use cm_core::{
    plan, scan_directory, CoreError, Migration, MigrationPlan, MultiError, PlanStatus, RunContext,
};
use cm_db::Database;
use std::path::Path;

/// Result of [`Migrator::migrate`].
#[derive(Debug)]
pub struct MigrateReport {
    /// Classification of every candidate for the run's environment
    pub plan: MigrationPlan,

    /// Whether the run was a dry run
    pub dry_run: bool,

    /// Migrations recorded by this run, in application order
    pub applied: Vec<Migration>,

    /// The error that stopped the batch, if any
    pub halted: Option<EngineError>,
}

impl MigrateReport {
    /// Migrations a dry run would have applied.
    pub fn would_apply(&self) -> impl Iterator<Item = &Migration> {
        self.plan.pending()
    }

    /// `true` when the batch ran to completion.
    pub fn is_success(&self) -> bool {
        self.halted.is_none()
    }

    /// The report, or the error that halted the batch.
    pub fn into_result(mut self) -> EngineResult<Self> {
        match self.halted.take() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

/// Result of [`Migrator::status`].
#[derive(Debug)]
pub struct StatusReport {
    pub plan: MigrationPlan,

    /// Scripts that could not be parsed
    pub errors: MultiError<CoreError>,
}

/// Runs migration batches against one store under one [`RunContext`].
pub struct Migrator<'a> {
    db: &'a dyn Database,
    ctx: &'a RunContext,
}

impl<'a> Migrator<'a> {
    pub fn new(db: &'a dyn Database, ctx: &'a RunContext) -> Self {
        Self { db, ctx }
    }

    /// Classify the scripts in `scripts_dir` against the ledger.
    ///
    /// Never creates the ledger table. Unparseable scripts are returned
    /// alongside the plan rather than failing the call.
    pub async fn status(&self, scripts_dir: &Path) -> EngineResult<StatusReport> {
        let applied = list_applied(self.db).await?;
        let scan = scan_directory(scripts_dir)?;
        Ok(StatusReport {
            plan: plan(scan.migrations, &applied, &self.ctx.environment),
            errors: scan.errors,
        })
    }

    /// Apply every pending migration in `scripts_dir`, in version order.
    ///
    /// Any unparseable script, or two scripts sharing a ledger key, aborts the
    /// batch before anything runs. After that the batch stops at the first
    /// migration that fails; a migration whose statements failed is still
    /// recorded. In a dry run the ledger is
    /// neither created nor written and nothing is executed.
    pub async fn migrate(&self, scripts_dir: &Path) -> EngineResult<MigrateReport> {
        if !self.ctx.dry_run {
            ensure_ledger(self.db).await?;
        }
        let applied = list_applied(self.db).await?;

        let scan = scan_directory(scripts_dir)?;
        if scan.has_errors() {
            return Err(EngineError::Scan(scan.errors));
        }

        let plan = plan(scan.migrations, &applied, &self.ctx.environment);
        check_ledger_keys(&plan, &applied, &self.ctx.environment)?;
        log::info!(
            "{} pending, {} applied, {} skipped for environment '{}'",
            plan.count(PlanStatus::Pending),
            plan.count(PlanStatus::AlreadyApplied),
            plan.count(PlanStatus::SkippedEnvironment),
            self.ctx.environment
        );

        if self.ctx.dry_run {
            for m in plan.pending() {
                log::info!("Dry run: would apply '{}'", m.file_name());
            }
            return Ok(MigrateReport {
                plan,
                dry_run: true,
                applied: Vec::new(),
                halted: None,
            });
        }

        let mut recorded = Vec::new();
        let mut halted = None;
        for migration in plan.pending() {
            let result = apply_migration(self.db, migration, self.ctx)
                .await
                .and_then(|outcome| outcome.into_result());
            match result {
                Ok(m) => recorded.push(m),
                Err(e) => {
                    log::error!("Halting batch at '{}': {e}", migration.name);
                    halted = Some(e);
                    break;
                }
            }
        }

        Ok(MigrateReport {
            plan,
            dry_run: false,
            applied: recorded,
            halted,
        })
    }
}

/// Fail if a pending migration would reuse the `(name, version)` key of an
/// applied entry or of an earlier pending migration.
///
/// The ledger cannot hold both entries.
fn check_ledger_keys(
    plan: &MigrationPlan,
    applied: &[Migration],
    environment: &str,
) -> EngineResult<()> {
    let conflict = |m: &Migration, existing: String| EngineError::LedgerKeyConflict {
        name: m.name.clone(),
        version: m.version.to_string(),
        environment: m.environment.clone(),
        existing,
    };
    let same_key = |a: &Migration, b: &Migration| a.name == b.name && a.version == b.version;

    let mut seen: Vec<&Migration> = Vec::new();
    for m in plan.pending() {
        if let Some(entry) = applied.iter().find(|a| same_key(a, m)) {
            return Err(conflict(
                m,
                format!("the applied entry for environment '{}'", entry.environment),
            ));
        }
        if let Some(earlier) = seen.iter().find(|p| same_key(*p, m)) {
            return Err(conflict(
                m,
                format!("'{}', also pending in '{environment}'", earlier.file_name()),
            ));
        }
        seen.push(m);
    }
    Ok(())
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
