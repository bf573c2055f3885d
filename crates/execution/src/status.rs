//! Closed status sets for executions and node executions.
//!
//! These are deliberately small, spec-closed enums rather than an open
//! string: every transition between them is validated by
//! [`crate::transition`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// The status of a workflow execution as a whole.
///
/// State machine: `New -> Running -> {Success | Error | Canceled}`;
/// `Running -> Waiting` when a human-in-the-loop node suspends the
/// execution; `Waiting -> Running` on resume; `Waiting -> Canceled` on
/// timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Created but not yet started.
    New,
    /// Actively scheduling and running nodes.
    Running,
    /// Suspended pending a human-in-the-loop callback or a `wait` node.
    Waiting,
    /// All nodes reached a terminal state without failure.
    Success,
    /// A node failed under an error policy of `stop`.
    Error,
    /// Cancelled by request or by a `waiting` timeout.
    Canceled,
}

impl ExecutionStatus {
    /// Returns `true` if no further transitions are possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Error | Self::Canceled)
    }

    /// Returns `true` if the execution is doing (or about to resume) work.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Waiting)
    }

    /// Returns `true` if the execution finished successfully.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns `true` if the execution finished with a failure.
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::New => "new",
            Self::Running => "running",
            Self::Waiting => "waiting",
            Self::Success => "success",
            Self::Error => "error",
            Self::Canceled => "canceled",
        };
        f.write_str(s)
    }
}

/// The status of a single node execution attempt series.
///
/// State machine: `Pending -> Running -> {Success | Error | Skipped |
/// Canceled}`; `Running -> Running` is a retry, preserving the node id
/// and incrementing `attempt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    /// Scheduled but not yet started.
    Pending,
    /// Currently executing (or between retries).
    Running,
    /// Completed successfully.
    Success,
    /// Failed after exhausting retries under an error policy of `stop`
    /// or `continue_error`.
    Error,
    /// Failed after exhausting retries under an error policy of
    /// `continue_regular`, or never reached because an upstream
    /// dependency was skipped/errored.
    Skipped,
    /// Cancelled because the owning execution was cancelled.
    Canceled,
}

impl NodeStatus {
    /// Returns `true` if no further transitions are possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Success | Self::Error | Self::Skipped | Self::Canceled
        )
    }

    /// Returns `true` if the node is currently executing.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns `true` if the node completed successfully.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns `true` if the node failed.
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Success => "success",
            Self::Error => "error",
            Self::Skipped => "skipped",
            Self::Canceled => "canceled",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_status_terminal() {
        assert!(ExecutionStatus::Success.is_terminal());
        assert!(ExecutionStatus::Error.is_terminal());
        assert!(ExecutionStatus::Canceled.is_terminal());
        assert!(!ExecutionStatus::New.is_terminal());
        assert!(!ExecutionStatus::Running.is_terminal());
        assert!(!ExecutionStatus::Waiting.is_terminal());
    }

    #[test]
    fn execution_status_active() {
        assert!(ExecutionStatus::Running.is_active());
        assert!(ExecutionStatus::Waiting.is_active());
        assert!(!ExecutionStatus::New.is_active());
        assert!(!ExecutionStatus::Success.is_active());
    }

    #[test]
    fn execution_status_display() {
        assert_eq!(ExecutionStatus::New.to_string(), "new");
        assert_eq!(ExecutionStatus::Waiting.to_string(), "waiting");
        assert_eq!(ExecutionStatus::Canceled.to_string(), "canceled");
    }

    #[test]
    fn execution_status_serde_snake_case() {
        let json = serde_json::to_string(&ExecutionStatus::Waiting).unwrap();
        assert_eq!(json, "\"waiting\"");
        let back: ExecutionStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ExecutionStatus::Waiting);
    }

    #[test]
    fn node_status_terminal() {
        assert!(NodeStatus::Success.is_terminal());
        assert!(NodeStatus::Skipped.is_terminal());
        assert!(!NodeStatus::Pending.is_terminal());
        assert!(!NodeStatus::Running.is_terminal());
    }

    #[test]
    fn node_status_display() {
        assert_eq!(NodeStatus::Pending.to_string(), "pending");
        assert_eq!(NodeStatus::Skipped.to_string(), "skipped");
    }

    #[test]
    fn node_status_serde_roundtrip() {
        for status in [
            NodeStatus::Pending,
            NodeStatus::Running,
            NodeStatus::Success,
            NodeStatus::Error,
            NodeStatus::Skipped,
            NodeStatus::Canceled,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            let back: NodeStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }
}
