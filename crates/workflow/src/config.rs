//! Workflow-level settings.

use nebula_core::constants::{DEFAULT_NODE_TIMEOUT_SECONDS, DEFAULT_WORKFLOW_TIMEOUT_SECONDS};
use serde::{Deserialize, Serialize};

use crate::node::RetryPolicy;

/// Workflow-level configuration applied when a node doesn't override it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Overall execution timeout, in seconds.
    #[serde(default = "default_workflow_timeout")]
    pub timeout_secs: u64,
    /// Retry policy applied to nodes that don't set their own.
    #[serde(default)]
    pub default_retry_policy: RetryPolicy,
    /// Default per-node timeout, in seconds, for nodes without an
    /// override.
    #[serde(default = "default_node_timeout")]
    pub default_node_timeout_secs: u64,
    /// IANA timezone used to interpret cron/schedule triggers.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_workflow_timeout() -> u64 {
    DEFAULT_WORKFLOW_TIMEOUT_SECONDS
}

fn default_node_timeout() -> u64 {
    DEFAULT_NODE_TIMEOUT_SECONDS
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_workflow_timeout(),
            default_retry_policy: RetryPolicy::default(),
            default_node_timeout_secs: default_node_timeout(),
            timezone: default_timezone(),
        }
    }
}
