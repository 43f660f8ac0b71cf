//! Worker lifecycle states.

use std::fmt;

/// Lifecycle of the worker.
///
/// Install always completes (or fails) before activation begins. Fetch
/// interception requires `Activated`; anything earlier passes requests
/// through untouched. A failed install returns the worker to `Parsed`
/// so the host can retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Constructed, not yet installed.
    Parsed,
    /// Install event in progress (precache population).
    Installing,
    /// Precache complete; eligible to activate immediately.
    Installed,
    /// Activate event in progress (stale namespace purge).
    Activating,
    /// Controlling clients and intercepting fetches.
    Activated,
}

impl WorkerState {
    pub fn can_intercept_fetch(self) -> bool {
        matches!(self, Self::Activated)
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
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_activated_state_intercepts() {
        assert!(!WorkerState::Parsed.can_intercept_fetch());
        assert!(!WorkerState::Installing.can_intercept_fetch());
        assert!(!WorkerState::Installed.can_intercept_fetch());
        assert!(!WorkerState::Activating.can_intercept_fetch());
        assert!(WorkerState::Activated.can_intercept_fetch());
    }

    #[test]
    fn states_render_lowercase() {
        assert_eq!(WorkerState::Installed.to_string(), "installed");
        assert_eq!(WorkerState::Activated.to_string(), "activated");
    }
}
