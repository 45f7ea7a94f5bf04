//! Create command implementation

use anyhow::{Context, Result};
use cm_core::Migration;
use std::fs;

use crate::cli::{CreateArgs, GlobalArgs};
use crate::context::load_config;

/// Execute the create command
///
/// Writes an empty script for a new migration into the scripts directory.
/// No store connection is made.
pub async fn execute(args: &CreateArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let scripts_dir = config.scripts_dir();
    fs::create_dir_all(&scripts_dir).with_context(|| {
        format!(
            "Failed to create scripts directory: {}",
            scripts_dir.display()
        )
    })?;

    let mut migration = Migration::create(&args.name, args.target_env.as_deref());
    let path = migration
        .create_file(&scripts_dir)
        .context("Failed to create migration")?;

    println!("Created {}", path.display());
    Ok(())
}
