//! Per-invocation run settings.

/// Settings that shape a single run, passed explicitly to the planner,
/// applier and migrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Environment the run targets
    pub environment: String,

    /// When set, nothing is executed and the ledger is neither created nor written
    pub dry_run: bool,

    /// Stamped into each ledger entry as `user`
    pub user: String,
}

impl RunContext {
    /// Build a context for `environment`, stamping entries with [`current_user`].
    pub fn new(environment: impl Into<String>, dry_run: bool) -> Self {
        Self {
            environment: environment.into(),
            dry_run,
            user: current_user(),
        }
    }

    /// Override the user recorded in ledger entries.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }
}

/// Name of the operator running the tool, or an empty string when unknown.
pub fn current_user() -> String {
    ["USER", "USERNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|v| !v.is_empty())
        .unwrap_or_default()
}
