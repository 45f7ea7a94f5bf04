//! Discovery of migration scripts on disk.

use crate::error::{CoreError, CoreResult};
use crate::migration::{Migration, SCRIPT_EXTENSION};
use crate::multi_error::MultiError;
use std::fs;
use std::path::Path;

/// Result of scanning a scripts directory.
///
/// Every file that parsed is in `migrations`, in file-name order; every file
/// that did not is in `errors`. One bad file never hides the others.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Successfully parsed candidates
    pub migrations: Vec<Migration>,

    /// Per-file failures
    pub errors: MultiError<CoreError>,
}

impl ScanReport {
    /// `true` when at least one file failed to parse.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parse every `*.cql` regular file directly inside `dir`.
///
/// Failing to read the directory itself is fatal. Failing to parse an
/// individual file is recorded in [`ScanReport::errors`] and the scan carries
/// on. Files with other extensions, directories and symlinks are ignored.
pub fn scan_directory(dir: &Path) -> CoreResult<ScanReport> {
    let dir_err = |e| CoreError::ScriptsDir {
        path: dir.display().to_string(),
        source: e,
    };

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(dir_err)? {
        let entry = entry.map_err(dir_err)?;
        entries.push(entry);
    }
    entries.sort_by_key(|e| e.file_name());

    let mut report = ScanReport::default();
    for entry in entries {
        let path = entry.path();
        let is_script = path
            .extension()
            .is_some_and(|ext| ext == SCRIPT_EXTENSION);
        if !is_script {
            continue;
        }

        match entry.file_type() {
            Ok(ft) if ft.is_file() => {}
            Ok(_) => continue,
            Err(e) => {
                report.errors.push(CoreError::IoWithPath {
                    path: path.display().to_string(),
                    source: e,
                });
                continue;
            }
        }

        match Migration::from_file(&path) {
            Ok(m) => {
                log::debug!("Discovered migration {}", m.file_name());
                report.migrations.push(m);
            }
            Err(e) => {
                log::debug!("Skipping {}: {e}", path.display());
                report.errors.push(e);
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
#[path = "scanner_test.rs"]
mod tests;
