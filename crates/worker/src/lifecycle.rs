//! Worker lifecycle states.
//!
//! A worker version moves through `installing -> installed -> activating ->
//! activated`; `redundant` is terminal and entered when install or activate
//! fails (or when a newer version supersedes this one). Only one version is
//! ever activated at a time; the host runtime enforces mutual exclusion of
//! the install and activate phases.

/// Lifecycle state of a cache manager instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Pre-caching the app shell (install event in flight).
    Installing,
    /// Shell cached; eligible for immediate activation (skip-waiting).
    Installed,
    /// Pruning stale stores and claiming clients.
    Activating,
    /// Controlling pages and intercepting fetches.
    Activated,
    /// Failed or superseded; never leaves this state.
    Redundant,
}

impl WorkerState {
    /// Whether fetches are intercepted in this state.
    pub fn can_intercept_fetch(&self) -> bool {
        matches!(self, WorkerState::Activated)
    }

    /// Whether this is the terminal failure state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkerState::Redundant)
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerState::Installing => write!(f, "installing"),
            WorkerState::Installed => write!(f, "installed"),
            WorkerState::Activating => write!(f, "activating"),
            WorkerState::Activated => write!(f, "activated"),
            WorkerState::Redundant => write!(f, "redundant"),
        }
    }
}
