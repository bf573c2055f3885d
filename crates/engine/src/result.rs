//! The outcome of a single `execute_workflow` call.

use std::collections::HashMap;
use std::time::Duration;

use nebula_core::{ExecutionId, NodeId};
use nebula_execution::ExecutionStatus;
use serde_json::Value;

/// The final state of one workflow execution.
///
/// A workflow that fails (`status` is `Error` or `Canceled`) is still a
/// normal `Ok` return from `execute_workflow` — only pre-flight problems
/// (a structurally invalid workflow, a plan that can't be built) surface
/// as `Err(EngineError)`. Once an execution starts running, whatever it
/// does is a fact about that execution, not a call failure.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// The execution this result belongs to.
    pub execution_id: ExecutionId,
    /// Final execution status.
    pub status: ExecutionStatus,
    /// Materialized output values, by node, for every node that produced
    /// one (skipped nodes are absent).
    pub node_outputs: HashMap<NodeId, Value>,
    /// Wall-clock time the execution took.
    pub duration: Duration,
    /// The node whose failure under a `stop` error policy ended the
    /// execution, if that's how it ended.
    pub failed_node: Option<NodeId>,
    /// A human-readable reason the execution ended in `Error` or
    /// `Canceled`, if any.
    pub error: Option<String>,
}

impl ExecutionResult {
    /// `true` if the execution finished successfully.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// `true` if the execution finished with a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }

    /// A node's materialized output, if it produced one.
    #[must_use]
    pub fn node_output(&self, node_id: NodeId) -> Option<&Value> {
        self.node_outputs.get(&node_id)
    }
}
