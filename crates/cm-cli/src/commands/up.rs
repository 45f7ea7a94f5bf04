//! Up command implementation

use anyhow::{Context, Result};
use cm_core::PlanStatus;
use cm_engine::Migrator;

use crate::cli::GlobalArgs;
use crate::context::RuntimeContext;

/// Execute the up command
///
/// Applies every pending migration for `--env` in version order, stopping at
/// the first failure. With `--dryrun` (the default) only reports what would
/// be applied.
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let scripts_dir = ctx.scripts_dir();

    let report = Migrator::new(ctx.db.as_ref(), &ctx.run)
        .migrate(&scripts_dir)
        .await
        .context("Failed to run migrations")?;

    let already = report.plan.count(PlanStatus::AlreadyApplied);
    let skipped = report.plan.count(PlanStatus::SkippedEnvironment);

    if report.dry_run {
        let pending: Vec<_> = report.would_apply().collect();
        if pending.is_empty() {
            println!("Nothing to apply to '{}'", global.env);
        } else {
            println!("Dry run: would apply to '{}':", global.env);
            for m in &pending {
                println!("  {}", m.file_name());
            }
            println!();
            println!("Re-run with --dryrun=false to apply.");
        }
        println!(
            "{} pending, {} already applied, {} skipped",
            pending.len(),
            already,
            skipped
        );
        return Ok(());
    }

    for m in &report.applied {
        println!("  Applied {}", m.file_name());
    }
    println!();
    println!(
        "{} applied, {} already applied, {} skipped",
        report.applied.len(),
        already,
        skipped
    );

    report
        .into_result()
        .map(|_| ())
        .context("Migration batch halted")
}
