//! Ordering and classification of candidate migrations.

use crate::migration::{contains_migration, Migration};
use std::cmp::Ordering;
use std::fmt;

/// What a run should do with one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanStatus {
    /// Identity already present in the ledger
    AlreadyApplied,
    /// Scoped to a different environment than the run
    SkippedEnvironment,
    /// Will be applied by this run
    Pending,
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanStatus::AlreadyApplied => write!(f, "applied"),
            PlanStatus::SkippedEnvironment => write!(f, "skipped"),
            PlanStatus::Pending => write!(f, "pending"),
        }
    }
}

/// A candidate and its classification.
#[derive(Debug, Clone)]
pub struct PlannedMigration {
    pub migration: Migration,
    pub status: PlanStatus,
}

/// Every candidate, in application order, with its classification.
#[derive(Debug, Clone, Default)]
pub struct MigrationPlan {
    pub environment: String,
    pub entries: Vec<PlannedMigration>,
}

impl MigrationPlan {
    /// Candidates that this run will apply, in order.
    pub fn pending(&self) -> impl Iterator<Item = &Migration> {
        self.with_status(PlanStatus::Pending)
    }

    /// Candidates with the given classification, in order.
    pub fn with_status(&self, status: PlanStatus) -> impl Iterator<Item = &Migration> {
        self.entries
            .iter()
            .filter(move |e| e.status == status)
            .map(|e| &e.migration)
    }

    /// Number of candidates with the given classification.
    pub fn count(&self, status: PlanStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Return `migrations` stably sorted by `compare`.
pub fn sorted_with<I, F>(migrations: I, compare: F) -> Vec<Migration>
where
    I: IntoIterator<Item = Migration>,
    F: FnMut(&Migration, &Migration) -> Ordering,
{
    let mut sorted: Vec<Migration> = migrations.into_iter().collect();
    sorted.sort_by(compare);
    sorted
}

/// Return `migrations` in ascending version order. Equal versions keep their
/// input order.
pub fn sort_by_version<I>(migrations: I) -> Vec<Migration>
where
    I: IntoIterator<Item = Migration>,
{
    sorted_with(migrations, |a, b| a.version.cmp(&b.version))
}

/// Classify every candidate for a run against `environment`.
///
/// Candidates are ordered by version first, so pending migrations always run
/// in creation order and environment scoping never reorders them. A candidate
/// whose `(name, version, environment)` is in `applied` is
/// [`PlanStatus::AlreadyApplied`]; otherwise one scoped to another environment
/// is [`PlanStatus::SkippedEnvironment`]; everything else is
/// [`PlanStatus::Pending`].
pub fn plan<I>(candidates: I, applied: &[Migration], environment: &str) -> MigrationPlan
where
    I: IntoIterator<Item = Migration>,
{
    let entries = sort_by_version(candidates)
        .into_iter()
        .map(|migration| {
            let status = if contains_migration(applied, &migration) {
                PlanStatus::AlreadyApplied
            } else if !migration.targets(environment) {
                PlanStatus::SkippedEnvironment
            } else {
                PlanStatus::Pending
            };
            PlannedMigration { migration, status }
        })
        .collect();

    MigrationPlan {
        environment: environment.to_string(),
        entries,
    }
}

#[cfg(test)]
#[path = "planner_test.rs"]
mod tests;
