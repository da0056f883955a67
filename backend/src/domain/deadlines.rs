//! Per-operation deadlines bounding collaborator calls.

use std::time::Duration;

/// Upper bounds on how long a flow waits for its collaborators.
///
/// No operation in this core may block indefinitely: every credential store
/// access is bounded by `store` and every hashing call by `crypto`. An
/// elapsed deadline surfaces as a retriable infrastructure error, never as a
/// hung caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDeadlines {
    /// Bound on a single credential store call.
    pub store: Duration,
    /// Bound on a single hashing or verification call.
    pub crypto: Duration,
}

impl Default for OperationDeadlines {
    fn default() -> Self {
        Self {
            store: Duration::from_secs(5),
            crypto: Duration::from_secs(2),
        }
    }
}
