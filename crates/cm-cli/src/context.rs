//! Runtime context for CLI commands

use anyhow::{Context, Result};
use cm_core::{Config, RunContext};
use cm_db::{Database, DuckDbBackend};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Load the configuration named by `--conf`.
pub fn load_config(global: &GlobalArgs) -> Result<Config> {
    Config::load(Path::new(&global.conf)).context("Failed to load configuration file")
}

/// Runtime context containing loaded configuration and store connection
pub struct RuntimeContext {
    /// The loaded configuration
    pub config: Config,

    /// Environment, dry-run flag and user for this invocation
    pub run: RunContext,

    /// Store connection for `--env`
    pub db: Arc<dyn Database>,
}

impl RuntimeContext {
    /// Load the configuration and connect to the environment's store
    pub fn new(global: &GlobalArgs) -> Result<Self> {
        let config = load_config(global)?;
        let env = config.environment(&global.env)?;

        log::debug!(
            "Environment '{}': endpoint {}, keyspace {}",
            global.env,
            env.endpoint,
            env.keyspace
        );
        let db: Arc<dyn Database> = Arc::new(
            DuckDbBackend::connect(&env.endpoint, &env.keyspace).with_context(|| {
                format!("Failed to connect to environment '{}'", global.env)
            })?,
        );

        Ok(Self {
            config,
            run: RunContext::new(global.env.as_str(), global.dryrun),
            db,
        })
    }

    /// Directory holding the migration scripts
    pub fn scripts_dir(&self) -> PathBuf {
        self.config.scripts_dir()
    }
}
