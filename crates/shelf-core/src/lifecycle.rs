//! Worker lifecycle tracking.

use std::fmt;

/// Lifecycle states of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Created, not yet installing.
    Parsed,
    /// Install event dispatched.
    Installing,
    /// Installed and waiting for the current worker to let go.
    Installed,
    /// Activate event dispatched.
    Activating,
    /// Active and controlling pages.
    Activated,
    /// Replaced, or failed to install.
    Redundant,
}

impl WorkerState {
    /// Check if this state allows fetch interception.
    pub fn can_intercept_fetch(&self) -> bool {
        matches!(self, Self::Activated)
    }

    /// Check if the worker is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Redundant)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parsed => write!(f, "parsed"),
            Self::Installing => write!(f, "installing"),
            Self::Installed => write!(f, "installed"),
            Self::Activating => write!(f, "activating"),
            Self::Activated => write!(f, "activated"),
            Self::Redundant => write!(f, "redundant"),
        }
    }
}

/// Observer trait for worker state changes.
///
/// The foreground app uses this to notice an installed worker waiting behind
/// the active one and offer the user an update.
pub trait LifecycleObserver: Send + Sync {
    /// Called after the worker for `version` enters `state`.
    fn on_state_change(&self, version: &str, state: WorkerState);
}
