//! Engine-wide tunables, independent of any one workflow.

use std::time::Duration;

use nebula_core::constants::{
    DEFAULT_CANCELLATION_GRACE_SECONDS, DEFAULT_MAX_CONCURRENT_EXECUTIONS,
    DEFAULT_MAX_CONCURRENT_NODE_TASKS, DEFAULT_NODE_TIMEOUT_SECONDS,
    DEFAULT_WORKFLOW_TIMEOUT_SECONDS,
};

/// Process-wide limits and defaults for the engine.
///
/// Per-workflow timeout/retry defaults live on [`nebula_workflow::WorkflowConfig`]
/// instead — these are the caps the engine applies across every
/// execution it runs concurrently.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum workflow executions running concurrently across the
    /// engine.
    pub max_concurrent_executions: usize,
    /// Maximum node tasks running concurrently across the engine, summed
    /// over all executions (independent of each execution's own
    /// `max_concurrent_nodes` budget).
    pub max_concurrent_node_tasks: usize,
    /// Fallback workflow-level timeout when a workflow doesn't set its
    /// own `config.timeout_secs`.
    pub default_workflow_timeout: Duration,
    /// Fallback per-node timeout when neither the node nor the workflow
    /// overrides it.
    pub default_node_timeout: Duration,
    /// How long a cancelled node task is given to observe cancellation
    /// and return before the engine treats it as unresponsive.
    pub cancellation_grace: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_executions: DEFAULT_MAX_CONCURRENT_EXECUTIONS,
            max_concurrent_node_tasks: DEFAULT_MAX_CONCURRENT_NODE_TASKS,
            default_workflow_timeout: Duration::from_secs(DEFAULT_WORKFLOW_TIMEOUT_SECONDS),
            default_node_timeout: Duration::from_secs(DEFAULT_NODE_TIMEOUT_SECONDS),
            cancellation_grace: Duration::from_secs(DEFAULT_CANCELLATION_GRACE_SECONDS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_caps() {
        let config = EngineConfig::default();
        assert_eq!(config.max_concurrent_executions, 100);
        assert_eq!(config.max_concurrent_node_tasks, 1000);
        assert_eq!(config.cancellation_grace, Duration::from_secs(2));
    }
}
