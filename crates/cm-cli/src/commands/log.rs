//! Log command implementation

use anyhow::{Context, Result};
use cm_core::checksum_hex;
use cm_engine::{list_entries, LedgerEntry};

use crate::cli::GlobalArgs;
use crate::commands::common::{column_width, format_timestamp, or_dash};
use crate::context::RuntimeContext;

/// Hex digits of the checksum shown per entry.
const CHECKSUM_PREFIX_LEN: usize = 12;

/// Execute the log command
///
/// Prints every ledger entry in version order. A store without a ledger has
/// nothing to show.
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let entries = list_entries(ctx.db.as_ref())
        .await
        .context("Failed to read the ledger")?;

    if entries.is_empty() {
        println!("No migrations applied in environment '{}'", global.env);
        return Ok(());
    }

    print_table(&entries);
    println!();
    println!("{} migrations applied", entries.len());
    Ok(())
}

fn print_table(entries: &[LedgerEntry]) {
    let name_width = column_width("NAME", entries.iter().map(|e| e.name.as_str()));
    let env_width = column_width("ENVIRONMENT", entries.iter().map(|e| e.environment.as_str()));
    let user_width = column_width(
        "USER",
        entries.iter().map(|e| or_dash(Some(e.user.as_str()))),
    );
    let applied_width = "YYYY-MM-DD HH:MM:SS".len();

    println!(
        "{:<12}  {:<name_width$}  {:<env_width$}  {:<user_width$}  {:<applied_width$}  CHECKSUM",
        "VERSION", "NAME", "ENVIRONMENT", "USER", "APPLIED",
    );
    println!(
        "{:-<12}  {:-<name_width$}  {:-<env_width$}  {:-<user_width$}  {:-<applied_width$}  {}",
        "",
        "",
        "",
        "",
        "",
        "-".repeat(CHECKSUM_PREFIX_LEN),
    );

    for entry in entries {
        let mut checksum = checksum_hex(&entry.checksum);
        checksum.truncate(CHECKSUM_PREFIX_LEN);
        println!(
            "{:<12}  {:<name_width$}  {:<env_width$}  {:<user_width$}  {:<applied_width$}  {}",
            entry.version,
            entry.name,
            entry.environment,
            or_dash(Some(entry.user.as_str())),
            format_timestamp(entry.applied),
            or_dash(Some(checksum.as_str())),
        );
    }
}
