//! Node definitions: kind, subtype, parameters, and per-node policy.

use std::collections::HashMap;

use nebula_core::{CredentialKey, NodeId, NodeKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The coarse category of a node. The `subtype` on [`NodeDefinition`]
/// selects the concrete behavior within a kind (e.g. `external_action`
/// + subtype `github`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Ingress into the workflow (`manual`, `webhook`, `cron`, ...).
    Trigger,
    /// Invokes a model with attached tools/memory.
    AiAgent,
    /// Calls an external provider through a tool adapter.
    ExternalAction,
    /// A generic in-process action (HTTP, data transform, code run, ...).
    Action,
    /// Branching/looping/merging control flow.
    Flow,
    /// Suspends the execution pending an external callback.
    Human,
    /// A tool invoked synchronously by an `AiAgent`, never scheduled on
    /// its own.
    Tool,
    /// A memory store invoked synchronously by an `AiAgent`, never
    /// scheduled on its own.
    Memory,
}

impl NodeKind {
    /// Whether nodes of this kind may be scheduled directly by the
    /// engine's graph traversal, as opposed to only being invoked as an
    /// attachment of an `ai_agent` node.
    #[must_use]
    pub fn is_schedulable(self) -> bool {
        !matches!(self, Self::Tool | Self::Memory)
    }
}

/// What happens when a node fails all of its retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Fail the whole execution and cancel running siblings.
    #[default]
    Stop,
    /// Mark the node `skipped`; downstream nodes receive an empty
    /// mapping for its outputs.
    ContinueRegular,
    /// Mark the node `error` but let downstream nodes run, receiving
    /// `{error: {...}}` under the node's output key.
    ContinueError,
}

/// Per-node retry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first), minimum 1.
    pub max_tries: u32,
    /// Seconds to sleep between attempts, interpreted literally with no
    /// jitter at the node level.
    pub wait_between_tries_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_tries: 1,
            wait_between_tries_secs: 0,
        }
    }
}

/// A credential reference attached to a node: who owns the credential
/// and which provider/integration it targets. Resolved against the
/// credential store at execution time, never embedded in the workflow
/// definition itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRef {
    /// The provider the credential must match.
    pub provider: String,
    /// Disambiguates multiple installs of the same provider.
    #[serde(default = "default_integration_id")]
    pub integration_id: String,
}

fn default_integration_id() -> String {
    "default".to_string()
}

impl CredentialRef {
    /// Resolve this reference into a full [`CredentialKey`] for a given
    /// user.
    #[must_use]
    pub fn resolve(&self, user_id: nebula_core::UserId) -> CredentialKey {
        CredentialKey::new(user_id, self.provider.as_str(), self.integration_id.clone())
    }
}

/// A single node within a [`crate::WorkflowDefinition`].
///
/// `configurations`/`input_params`/`output_params` are kept as raw JSON
/// maps here; `nebula-parameter` owns the typed merge rule and
/// placeholder-emptiness semantics over them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDefinition {
    /// Stable identity within the workflow.
    pub id: NodeId,
    /// Human-readable display name.
    pub name: String,
    /// The node's kind + subtype selector.
    pub key: NodeKey,
    /// UI position; opaque to the engine.
    #[serde(default)]
    pub position: (f64, f64),
    /// Authoritative parameter map, set by the user in the editor.
    #[serde(default)]
    pub configurations: HashMap<String, Value>,
    /// Runtime input parameter overrides.
    #[serde(default)]
    pub input_params: HashMap<String, Value>,
    /// Runtime output parameter overrides (rarely used; mirrors
    /// `input_params` for symmetry with the template system).
    #[serde(default)]
    pub output_params: HashMap<String, Value>,
    /// Which stored credential this node uses, if any.
    #[serde(default)]
    pub credential: Option<CredentialRef>,
    /// Retry policy on failure.
    #[serde(default)]
    pub retry_policy: RetryPolicy,
    /// Error policy after retries are exhausted.
    #[serde(default)]
    pub error_policy: ErrorPolicy,
    /// Skips scheduling without deleting the node from the definition.
    #[serde(default)]
    pub disabled: bool,
    /// Per-node timeout override, in seconds.
    pub timeout_secs: Option<u64>,
    /// Tool/memory nodes bound to this node, invoked synchronously by an
    /// `ai_agent` executor rather than scheduled independently.
    #[serde(default)]
    pub attached_nodes: Vec<NodeId>,
}

impl NodeDefinition {
    /// Construct a minimal node with default policy/parameters, useful
    /// for tests and programmatic workflow construction.
    #[must_use]
    pub fn new(id: NodeId, name: impl Into<String>, key: NodeKey) -> Self {
        Self {
            id,
            name: name.into(),
            key,
            position: (0.0, 0.0),
            configurations: HashMap::new(),
            input_params: HashMap::new(),
            output_params: HashMap::new(),
            credential: None,
            retry_policy: RetryPolicy::default(),
            error_policy: ErrorPolicy::default(),
            disabled: false,
            timeout_secs: None,
            attached_nodes: Vec::new(),
        }
    }

    /// The node's [`NodeKind`] derived from its key.
    ///
    /// Stored separately as metadata in the node registry normally, but
    /// for graph construction we fold `kind` out of the workflow-level
    /// `kind` field carried alongside `key`. This accessor exists so call
    /// sites never need to hand-parse `key.kind()`.
    #[must_use]
    pub fn kind_str(&self) -> &str {
        self.key.kind()
    }

    /// Whether this is a trigger node.
    #[must_use]
    pub fn is_trigger(&self) -> bool {
        self.kind_str() == "trigger"
    }

    /// Whether this is a loop flow node (the one permitted cycle source).
    #[must_use]
    pub fn is_loop(&self) -> bool {
        self.kind_str() == "flow" && self.key.subtype() == "loop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_and_memory_are_not_schedulable() {
        assert!(!NodeKind::Tool.is_schedulable());
        assert!(!NodeKind::Memory.is_schedulable());
        assert!(NodeKind::Trigger.is_schedulable());
    }

    #[test]
    fn credential_ref_resolves_with_default_integration() {
        let user = nebula_core::UserId::v4();
        let cred_ref = CredentialRef {
            provider: "slack".into(),
            integration_id: default_integration_id(),
        };
        let key = cred_ref.resolve(user);
        assert_eq!(key.integration_id, "default");
    }
}
