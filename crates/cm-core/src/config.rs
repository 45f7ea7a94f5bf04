//! Configuration types and parsing for the migration config file.
//!
//! ```yaml
//! scripts:
//!   path: migrations
//! environments:
//!   local:
//!     endpoint: "target/local.duckdb"
//!     keyspace: main
//! ```

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Endpoint value that selects an in-memory store.
pub const MEMORY_ENDPOINT: &str = ":memory:";

/// Main configuration loaded from the migration config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Where migration scripts live
    #[serde(default)]
    pub scripts: ScriptsConfig,

    /// Named environments (e.g. local, staging, prod)
    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentConfig>,

    /// Directory of the file this config was loaded from; relative paths
    /// resolve against it
    #[serde(skip)]
    base_dir: PathBuf,
}

/// Script directory settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptsConfig {
    /// Directory containing `*.cql` scripts
    #[serde(default = "default_scripts_path")]
    pub path: String,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            path: default_scripts_path(),
        }
    }
}

/// Connection settings for one environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentConfig {
    /// Store endpoint (a DuckDB file path or `:memory:`)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Default keyspace (schema) for the session
    #[serde(default = "default_keyspace")]
    pub keyspace: String,
}

fn default_scripts_path() -> String {
    "migrations".to_string()
}

fn default_endpoint() -> String {
    MEMORY_ENDPOINT.to_string()
}

fn default_keyspace() -> String {
    "main".to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut config = Self::parse(&content).map_err(|e| match e {
            CoreError::ConfigParseError { message, .. } => CoreError::ConfigParseError {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    /// Parse configuration from YAML text. Relative paths resolve against the
    /// current directory.
    pub fn parse(content: &str) -> CoreResult<Self> {
        let config: Config =
            serde_yaml::from_str(content).map_err(|e| CoreError::ConfigParseError {
                path: "<inline>".to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.scripts.path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "scripts.path cannot be empty".to_string(),
            });
        }

        for (name, env) in &self.environments {
            if env.endpoint.trim().is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: format!("environment '{name}' has an empty endpoint"),
                });
            }
            if env.keyspace.trim().is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: format!("environment '{name}' has an empty keyspace"),
                });
            }
        }

        Ok(())
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.base_dir.join(p)
        }
    }

    /// Absolute (or config-relative) path of the scripts directory
    pub fn scripts_dir(&self) -> PathBuf {
        self.resolve(&self.scripts.path)
    }

    /// Get the list of configured environment names
    pub fn available_environments(&self) -> Vec<&str> {
        self.environments.keys().map(String::as_str).collect()
    }

    /// Get connection settings for an environment, with a file endpoint
    /// resolved against the config directory.
    pub fn environment(&self, name: &str) -> CoreResult<EnvironmentConfig> {
        let env = self
            .environments
            .get(name)
            .ok_or_else(|| CoreError::UnknownEnvironment {
                name: name.to_string(),
                available: self.available_environments().join(", "),
            })?;

        let endpoint = if env.endpoint == MEMORY_ENDPOINT {
            env.endpoint.clone()
        } else {
            self.resolve(&env.endpoint).display().to_string()
        };

        Ok(EnvironmentConfig {
            endpoint,
            keyspace: env.keyspace.clone(),
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
