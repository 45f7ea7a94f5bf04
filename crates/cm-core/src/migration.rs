//! Migration identity: parsing script file names and creating new scripts.
//!
//! A script's identity comes entirely from its file name,
//! `<version>_<name>.<environment>.cql`. The file content only contributes the
//! checksum recorded in the ledger.

use crate::checksum::compute_checksum;
use crate::error::{CoreError, CoreResult};
use crate::version::Version;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

/// Environment sentinel meaning "apply in every environment".
pub const ALL_ENVIRONMENTS: &str = "all";

/// File extension of migration scripts.
pub const SCRIPT_EXTENSION: &str = "cql";

fn file_name_pattern() -> &'static Regex {
    static FILE_NAME_RE: OnceLock<Regex> = OnceLock::new();
    FILE_NAME_RE.get_or_init(|| {
        Regex::new(r"^([0-9]{12})_([A-Za-z0-9_-]+)\.([A-Za-z0-9_-]+)\.cql$")
            .expect("valid regex literal")
    })
}

fn non_word_pattern() -> &'static Regex {
    static NON_WORD_RE: OnceLock<Regex> = OnceLock::new();
    NON_WORD_RE.get_or_init(|| Regex::new(r"[^0-9A-Za-z_]+").expect("valid regex literal"))
}

/// One versioned, named, environment-scoped schema change.
///
/// Depending on where it came from, a `Migration` is a template (from
/// [`Migration::create`]), a candidate (from [`Migration::from_file`], with a
/// `source_path`), or an applied record read back from the ledger (with
/// `applied_at` and `applied_by`).
#[derive(Debug, Clone)]
pub struct Migration {
    /// Ordering key
    pub version: Version,

    /// Sanitized human identifier
    pub name: String,

    /// Target environment, or [`ALL_ENVIRONMENTS`]
    pub environment: String,

    /// SHA-256 of the script content at discovery time
    pub checksum: Vec<u8>,

    /// When the migration was recorded in the ledger
    pub applied_at: Option<DateTime<Utc>>,

    /// Who recorded the migration in the ledger
    pub applied_by: Option<String>,

    /// Script location, for candidates discovered on disk
    pub source_path: Option<PathBuf>,
}

impl Migration {
    /// Build a migration from its identity fields, with no checksum or
    /// ledger metadata.
    pub fn new(version: Version, name: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            version,
            name: name.into(),
            environment: environment.into(),
            checksum: Vec::new(),
            applied_at: None,
            applied_by: None,
            source_path: None,
        }
    }

    /// Create a template for a brand-new script stamped with the current time.
    ///
    /// The name is sanitized with [`sanitize_name`]; a missing or empty
    /// environment becomes [`ALL_ENVIRONMENTS`].
    pub fn create(name: &str, environment: Option<&str>) -> Self {
        let environment = environment
            .filter(|e| !e.is_empty())
            .unwrap_or(ALL_ENVIRONMENTS);
        Self::new(Version::now(), sanitize_name(name), environment)
    }

    /// Parse a candidate from a script on disk.
    ///
    /// Fails with [`CoreError::NamingConvention`] when the base name does not
    /// match `<version>_<name>.<environment>.cql`.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();

        let caps = file_name_pattern()
            .captures(file_name)
            .ok_or_else(|| CoreError::NamingConvention {
                path: path.display().to_string(),
            })?;

        let version = Version::parse(&caps[1])?;
        let name = caps[2].to_string();
        let environment = caps[3].to_string();

        let content = fs::read(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;

        Ok(Self {
            checksum: compute_checksum(&content),
            source_path: Some(path.to_path_buf()),
            ..Self::new(version, name, environment)
        })
    }

    /// The script file name this migration is (or would be) stored under.
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}.{}.{}",
            self.version, self.name, self.environment, SCRIPT_EXTENSION
        )
    }

    /// Write an empty script for this migration into `dir`.
    ///
    /// Refuses to overwrite an existing file. On success `source_path` points
    /// at the new file.
    pub fn create_file(&mut self, dir: &Path) -> CoreResult<PathBuf> {
        let path = dir.join(self.file_name());
        if path.exists() {
            return Err(CoreError::MigrationExists {
                path: path.display().to_string(),
            });
        }

        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| CoreError::IoWithPath {
                path: path.display().to_string(),
                source: e,
            })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o644))?;
        }
        #[cfg(not(unix))]
        drop(file);

        log::info!("Created migration '{}' in '{}'", self.name, path.display());
        self.source_path = Some(path.clone());
        Ok(path)
    }

    /// `(name, version, environment)`, the identity used for deduplication.
    pub fn identity(&self) -> (&str, &str, &str) {
        (&self.name, self.version.as_str(), &self.environment)
    }

    /// Two migrations are the same iff name, version and environment all match.
    /// The checksum is not compared.
    pub fn same_identity(&self, other: &Migration) -> bool {
        self.identity() == other.identity()
    }

    /// Whether this migration should run in `environment`.
    pub fn targets(&self, environment: &str) -> bool {
        self.environment == ALL_ENVIRONMENTS || self.environment == environment
    }
}

/// Whether `migrations` holds an entry with the same identity as `migration`.
pub fn contains_migration(migrations: &[Migration], migration: &Migration) -> bool {
    migrations.iter().any(|m| m.same_identity(migration))
}

/// Normalize a free-form name into lowercase ASCII word characters.
///
/// The input is NFKD-decomposed first, so accented letters split into a base
/// letter and a combining mark; every run of characters outside
/// `[0-9A-Za-z_]` then becomes a single `_`.
pub fn sanitize_name(name: &str) -> String {
    let decomposed: String = name.nfkd().collect();
    non_word_pattern()
        .replace_all(&decomposed, "_")
        .to_ascii_lowercase()
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
