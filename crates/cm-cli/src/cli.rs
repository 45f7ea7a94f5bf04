//! CLI argument definitions using clap derive API

use clap::{ArgAction, Args, Parser, Subcommand};

/// cqlmig - versioned schema migrations, one keyspace per environment
#[derive(Parser, Debug)]
#[command(name = "cqlmig")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Plan without executing anything; pass --dryrun=false to apply
    #[arg(
        long,
        global = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = true,
        default_missing_value = "true"
    )]
    pub dryrun: bool,

    /// Path to the configuration file
    #[arg(long, global = true, default_value = "./conf/migrate.yml")]
    pub conf: String,

    /// Environment to run against
    #[arg(long, global = true, default_value = "local")]
    pub env: String,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new, empty migration script
    Create(CreateArgs),

    /// List migration scripts and their status for --env
    List,

    /// Show the migrations recorded as applied
    Log,

    /// Apply pending migrations
    Up,
}

/// Arguments for the create command
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Migration name; anything outside [0-9A-Za-z_] becomes '_'
    pub name: String,

    /// Only apply this migration in the given environment (default: all)
    #[arg(long)]
    pub target_env: Option<String>,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
