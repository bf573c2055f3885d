//! Engine-level error types.

use nebula_core::NodeId;
use nebula_execution::ExecutionError;
use nebula_runtime::RuntimeError;
use nebula_workflow::WorkflowError;
use thiserror::Error;

/// Errors that can arise while scheduling or running a workflow.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A node referenced by the plan has no corresponding definition.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// Planning the execution (graph construction, level computation)
    /// failed.
    #[error("planning failed: {0}")]
    PlanningFailed(String),

    /// A node failed under an error policy of `stop`.
    #[error("node {node_id} failed: {error}")]
    NodeFailed {
        /// The node that failed.
        node_id: NodeId,
        /// The error it failed with.
        error: String,
    },

    /// The execution was cancelled.
    #[error("execution cancelled")]
    Cancelled,

    /// The execution exceeded its wall-clock or node budget.
    #[error("budget exceeded: {0}")]
    BudgetExceeded(String),

    /// A node task panicked.
    #[error("node task panicked: {0}")]
    TaskPanicked(String),

    /// A structural or definitional problem with the workflow itself.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// An error from the execution-state/planning crate.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// An error from the action runtime (action/adapter dispatch).
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl From<EngineError> for nebula_error::NebulaError {
    fn from(err: EngineError) -> Self {
        match &err {
            EngineError::Cancelled => nebula_error::NebulaError::canceled(err.to_string()),
            EngineError::BudgetExceeded(_) => nebula_error::NebulaError::invalid_state(err.to_string()),
            EngineError::NodeNotFound(_) => nebula_error::NebulaError::not_found(err.to_string()),
            EngineError::PlanningFailed(_) => nebula_error::NebulaError::invalid_workflow(err.to_string()),
            EngineError::NodeFailed { .. } | EngineError::TaskPanicked(_) => nebula_error::NebulaError::internal(err.to_string()),
            EngineError::Workflow(e) => e.clone().into(),
            EngineError::Execution(_) | EngineError::Runtime(_) => nebula_error::NebulaError::internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_failed_display() {
        let err = EngineError::NodeFailed { node_id: NodeId::nil(), error: "boom".into() };
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn cancelled_converts_to_canceled_kind() {
        let err: nebula_error::NebulaError = EngineError::Cancelled.into();
        assert_eq!(err.kind(), nebula_error::ErrorKind::Canceled);
    }
}
