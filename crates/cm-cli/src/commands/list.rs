//! List command implementation

use anyhow::{Context, Result};
use cm_core::PlannedMigration;
use cm_engine::Migrator;

use crate::cli::GlobalArgs;
use crate::commands::common::{column_width, ExitCode};
use crate::context::RuntimeContext;

/// Execute the list command
///
/// Prints every script with its status for `--env`, then any script that
/// could not be parsed. Never creates the ledger.
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let scripts_dir = ctx.scripts_dir();

    let status = Migrator::new(ctx.db.as_ref(), &ctx.run)
        .status(&scripts_dir)
        .await
        .context("Failed to list migrations")?;

    if status.plan.is_empty() {
        println!("No migrations found in {}", scripts_dir.display());
    } else {
        print_table(&status.plan.entries);
        println!();
        println!(
            "{} migrations for environment '{}'",
            status.plan.len(),
            status.plan.environment
        );
    }

    if !status.errors.is_empty() {
        eprintln!();
        for err in &status.errors {
            eprintln!("  {err}");
        }
        eprintln!("{} file(s) could not be parsed", status.errors.len());
        return Err(ExitCode(1).into());
    }

    Ok(())
}

fn print_table(entries: &[PlannedMigration]) {
    let name_width = column_width("NAME", entries.iter().map(|e| e.migration.name.as_str()));
    let env_width = column_width(
        "ENVIRONMENT",
        entries.iter().map(|e| e.migration.environment.as_str()),
    );

    println!(
        "{:<12}  {:<name_width$}  {:<env_width$}  STATUS",
        "VERSION", "NAME", "ENVIRONMENT",
    );
    println!(
        "{:-<12}  {:-<name_width$}  {:-<env_width$}  {}",
        "",
        "",
        "",
        "-".repeat(7),
    );

    for entry in entries {
        let m = &entry.migration;
        println!(
            "{:<12}  {:<name_width$}  {:<env_width$}  {}",
            m.version, m.name, m.environment, entry.status,
        );
    }
}
