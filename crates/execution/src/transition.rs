//! State machine transition validation for execution and node statuses.

use crate::error::ExecutionError;
use crate::status::{ExecutionStatus, NodeStatus};

/// Returns `true` if the execution-level transition from `from` to `to` is valid.
#[must_use]
pub fn can_transition_execution(from: ExecutionStatus, to: ExecutionStatus) -> bool {
    matches!(
        (from, to),
        (ExecutionStatus::New, ExecutionStatus::Running)
            | (ExecutionStatus::Running, ExecutionStatus::Success)
            | (ExecutionStatus::Running, ExecutionStatus::Error)
            | (ExecutionStatus::Running, ExecutionStatus::Canceled)
            | (ExecutionStatus::Running, ExecutionStatus::Waiting)
            | (ExecutionStatus::Waiting, ExecutionStatus::Running)
            | (ExecutionStatus::Waiting, ExecutionStatus::Canceled)
    )
}

/// Validate an execution-level transition, returning an error if invalid.
pub fn validate_execution_transition(
    from: ExecutionStatus,
    to: ExecutionStatus,
) -> Result<(), ExecutionError> {
    if can_transition_execution(from, to) {
        Ok(())
    } else {
        Err(ExecutionError::invalid_execution_transition(from, to))
    }
}

/// Returns `true` if the node-level transition from `from` to `to` is valid.
#[must_use]
pub fn can_transition_node(from: NodeStatus, to: NodeStatus) -> bool {
    matches!(
        (from, to),
        (NodeStatus::Pending, NodeStatus::Running)
            | (NodeStatus::Pending, NodeStatus::Skipped)
            | (NodeStatus::Pending, NodeStatus::Canceled)
            | (NodeStatus::Running, NodeStatus::Running)
            | (NodeStatus::Running, NodeStatus::Success)
            | (NodeStatus::Running, NodeStatus::Error)
            | (NodeStatus::Running, NodeStatus::Skipped)
            | (NodeStatus::Running, NodeStatus::Canceled)
    )
}

/// Validate a node-level transition, returning an error if invalid.
pub fn validate_node_transition(from: NodeStatus, to: NodeStatus) -> Result<(), ExecutionError> {
    if can_transition_node(from, to) {
        Ok(())
    } else {
        Err(ExecutionError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_execution_transitions() {
        assert!(can_transition_execution(
            ExecutionStatus::New,
            ExecutionStatus::Running
        ));
        assert!(can_transition_execution(
            ExecutionStatus::Running,
            ExecutionStatus::Success
        ));
        assert!(can_transition_execution(
            ExecutionStatus::Running,
            ExecutionStatus::Error
        ));
        assert!(can_transition_execution(
            ExecutionStatus::Running,
            ExecutionStatus::Waiting
        ));
        assert!(can_transition_execution(
            ExecutionStatus::Waiting,
            ExecutionStatus::Running
        ));
        assert!(can_transition_execution(
            ExecutionStatus::Waiting,
            ExecutionStatus::Canceled
        ));
    }

    #[test]
    fn invalid_execution_transitions() {
        assert!(!can_transition_execution(
            ExecutionStatus::New,
            ExecutionStatus::Success
        ));
        assert!(!can_transition_execution(
            ExecutionStatus::Success,
            ExecutionStatus::Running
        ));
        assert!(!can_transition_execution(
            ExecutionStatus::Canceled,
            ExecutionStatus::Running
        ));
        assert!(!can_transition_execution(
            ExecutionStatus::New,
            ExecutionStatus::New
        ));
        assert!(!can_transition_execution(
            ExecutionStatus::New,
            ExecutionStatus::Waiting
        ));
    }

    #[test]
    fn validate_execution_transition_ok() {
        assert!(
            validate_execution_transition(ExecutionStatus::New, ExecutionStatus::Running).is_ok()
        );
    }

    #[test]
    fn validate_execution_transition_err() {
        let err = validate_execution_transition(ExecutionStatus::Success, ExecutionStatus::Running)
            .unwrap_err();
        assert!(err.to_string().contains("invalid transition"));
    }

    #[test]
    fn valid_node_transitions() {
        assert!(can_transition_node(NodeStatus::Pending, NodeStatus::Running));
        assert!(can_transition_node(NodeStatus::Running, NodeStatus::Success));
        assert!(can_transition_node(NodeStatus::Running, NodeStatus::Error));
        assert!(can_transition_node(NodeStatus::Running, NodeStatus::Running));
        assert!(can_transition_node(NodeStatus::Running, NodeStatus::Skipped));
        assert!(can_transition_node(NodeStatus::Pending, NodeStatus::Canceled));
        assert!(can_transition_node(NodeStatus::Pending, NodeStatus::Skipped));
    }

    #[test]
    fn invalid_node_transitions() {
        assert!(!can_transition_node(NodeStatus::Pending, NodeStatus::Success));
        assert!(!can_transition_node(NodeStatus::Success, NodeStatus::Running));
        assert!(!can_transition_node(NodeStatus::Skipped, NodeStatus::Running));
        assert!(!can_transition_node(NodeStatus::Canceled, NodeStatus::Running));
    }

    #[test]
    fn retry_is_a_valid_self_transition() {
        assert!(can_transition_node(NodeStatus::Running, NodeStatus::Running));
    }
}
