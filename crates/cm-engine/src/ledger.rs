//! The applied ledger: the persisted, append-only record of which migrations
//! have run, where, by whom and when.
//!
//! Entries live in the `schema_version` table keyed by `(name, version)`.
//! The table is created on demand before the first application and is never
//! created by a read.

use crate::error::{EngineError, EngineResult};
use chrono::{DateTime, Utc};
use cm_core::{Migration, MultiError, RunContext, Version};
use cm_db::{Database, Row, SqlValue};

/// Table holding the ledger entries.
pub const LEDGER_TABLE: &str = "schema_version";

const CREATE_LEDGER_SQL: &str = "CREATE TABLE IF NOT EXISTS schema_version (
    applied TIMESTAMP,
    environment VARCHAR,
    checksum BLOB,
    \"user\" VARCHAR,
    version VARCHAR NOT NULL,
    name VARCHAR NOT NULL,
    PRIMARY KEY (name, version)
)";

const SELECT_LEDGER_SQL: &str = "SELECT applied, environment, checksum, name, \"user\", version \
     FROM schema_version ORDER BY version, name";

const INSERT_LEDGER_SQL: &str = "INSERT INTO schema_version \
     (applied, environment, checksum, name, \"user\", version) VALUES (?, ?, ?, ?, ?, ?)";

/// One persisted ledger row.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub name: String,
    pub version: Version,
    pub environment: String,
    pub checksum: Vec<u8>,
    pub user: String,
    pub applied: Option<DateTime<Utc>>,
}

impl LedgerEntry {
    /// The entry recorded when `migration` is applied under `ctx` at `applied`.
    pub fn new(migration: &Migration, ctx: &RunContext, applied: DateTime<Utc>) -> Self {
        Self {
            name: migration.name.clone(),
            version: migration.version.clone(),
            environment: migration.environment.clone(),
            checksum: migration.checksum.clone(),
            user: ctx.user.clone(),
            applied: Some(applied),
        }
    }

    fn from_row(row: Row) -> EngineResult<Self> {
        let mut columns = row.into_iter();
        let mut next = || columns.next().unwrap_or(SqlValue::Null);

        let applied = next().into_timestamp("applied").map_err(EngineError::LedgerRead)?;
        let environment = next().into_text("environment").map_err(EngineError::LedgerRead)?;
        let checksum = next().into_blob("checksum").map_err(EngineError::LedgerRead)?;
        let name = next().into_text("name").map_err(EngineError::LedgerRead)?;
        let user = next().into_text("user").map_err(EngineError::LedgerRead)?;
        let version = next().into_text("version").map_err(EngineError::LedgerRead)?;
        let version = Version::parse(version).map_err(EngineError::LedgerEntry)?;

        Ok(Self {
            name,
            version,
            environment,
            checksum,
            user,
            applied,
        })
    }

    fn params(&self) -> Vec<SqlValue> {
        vec![
            self.applied.map_or(SqlValue::Null, SqlValue::Timestamp),
            SqlValue::from(self.environment.as_str()),
            SqlValue::from(self.checksum.as_slice()),
            SqlValue::from(self.name.as_str()),
            SqlValue::from(self.user.as_str()),
            SqlValue::from(self.version.as_str()),
        ]
    }

    /// Reconstruct the applied migration this entry records.
    pub fn into_migration(self) -> Migration {
        Migration {
            checksum: self.checksum,
            applied_at: self.applied,
            applied_by: Some(self.user),
            ..Migration::new(self.version, self.name, self.environment)
        }
    }
}

/// Create the ledger table if it does not exist yet.
pub async fn ensure_ledger(db: &dyn Database) -> EngineResult<()> {
    log::debug!("Ensuring ledger table '{LEDGER_TABLE}' exists");
    db.execute_batch(CREATE_LEDGER_SQL)
        .await
        .map_err(EngineError::LedgerInit)
}

/// Read every ledger entry, ordered by version.
///
/// A store without the ledger table has applied nothing.
pub async fn list_entries(db: &dyn Database) -> EngineResult<Vec<LedgerEntry>> {
    let exists = db
        .relation_exists(LEDGER_TABLE)
        .await
        .map_err(EngineError::LedgerRead)?;
    if !exists {
        log::debug!("Ledger table '{LEDGER_TABLE}' not found; nothing applied yet");
        return Ok(Vec::new());
    }

    let rows = db
        .query_rows(SELECT_LEDGER_SQL)
        .await
        .map_err(EngineError::LedgerRead)?;
    rows.into_iter().map(LedgerEntry::from_row).collect()
}

/// Every applied migration, ordered by version.
pub async fn list_applied(db: &dyn Database) -> EngineResult<Vec<Migration>> {
    let entries = list_entries(db).await?;
    log::debug!("Ledger holds {} applied migration(s)", entries.len());
    Ok(entries.into_iter().map(LedgerEntry::into_migration).collect())
}

/// Append a ledger entry for `migration`, stamped now and with `ctx.user`.
///
/// Returns the migration as recorded, with `applied_at` and `applied_by` set.
pub async fn record(
    db: &dyn Database,
    migration: &Migration,
    ctx: &RunContext,
) -> EngineResult<Migration> {
    let entry = LedgerEntry::new(migration, ctx, Utc::now());
    db.execute_with_params(INSERT_LEDGER_SQL, &entry.params())
        .await
        .map_err(|e| EngineError::LedgerWrite {
            name: migration.name.clone(),
            source: e,
            failed: MultiError::new(),
        })?;

    log::debug!("Recorded '{}' ({}) in the ledger", entry.name, entry.version);
    Ok(Migration {
        source_path: migration.source_path.clone(),
        ..entry.into_migration()
    })
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
