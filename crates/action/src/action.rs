//! The base `Action` trait: the "Action" node subtype's HTTP and data
//! transformation operations (spec §4.5 — "MVP requires HTTP and data
//! transformation only").
//!
//! Tool adapters (Google Calendar, GitHub, Slack, generic HTTP with
//! OAuth2) are a separate, narrower contract — see
//! [`crate::adapter::ToolAdapter`] — for the "External action / Tool"
//! node subtype, which always goes through credential resolution.

use std::sync::Arc;

use async_trait::async_trait;
use nebula_core::{NodeId, NodeKey};
use nebula_parameter::collection::ParameterCollection;
use serde_json::Value;

use crate::output::NodeOutputData;

/// An `ai_agent` node's attached tool/memory nodes, callable mid-execution.
///
/// The agent's own model-calling implementation is not part of this
/// crate; this trait is the seam an `ai_agent` action uses to resolve a
/// tool call against whichever nodes the workflow attached to it,
/// without needing to know how the engine resolved their credentials.
#[async_trait]
pub trait ToolCaller: Send + Sync {
    /// Invoke one operation on an attached tool or memory node.
    ///
    /// `node_id` must be one of the agent's `attached_nodes`; callers
    /// outside that set get an error rather than a silent no-op.
    async fn call_tool(&self, node_id: NodeId, operation: &str, params: Value) -> Result<Value, nebula_error::NebulaError>;
}

/// Static metadata describing an action type, used for registry lookup
/// and the workflow editor's parameter form.
#[derive(Debug, Clone)]
pub struct ActionMetadata {
    /// Node key this action implements (e.g. `action.http_request`).
    pub key: NodeKey,
    /// Human-readable display name.
    pub name: String,
    /// Short description shown in the editor.
    pub description: String,
    /// User-facing configuration parameters.
    pub parameters: Option<ParameterCollection>,
}

impl ActionMetadata {
    /// Build metadata from its required fields.
    pub fn new(key: NodeKey, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self { key, name: name.into(), description: description.into(), parameters: None }
    }

    /// Attach the editor's parameter form, chained.
    pub fn with_parameters(mut self, parameters: ParameterCollection) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

/// Everything one action invocation needs: the merged input, and the
/// means to observe cancellation. Credential resolution and the tool
/// adapter registry are not part of this context — actions in this
/// hierarchy (HTTP passthrough, data transformation) do not carry a
/// credential reference; that is the tool adapter's contract. `ai_agent`
/// invocations are the one exception, carrying a [`ToolCaller`] instead.
#[derive(Clone)]
pub struct ActionContext {
    /// Effective input for this invocation (merged parameters + upstream
    /// node outputs).
    pub input: Value,
    /// Cooperative cancellation signal; actions should check this at
    /// I/O boundaries and abort promptly.
    pub cancellation: tokio_util::sync::CancellationToken,
    /// Set for `ai_agent` invocations: lets the action resolve a tool
    /// call against the node's attached tool/memory nodes. `None` for
    /// every other action kind.
    pub tools: Option<Arc<dyn ToolCaller>>,
}

impl std::fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionContext").field("input", &self.input).field("has_tools", &self.tools.is_some()).finish()
    }
}

impl ActionContext {
    /// Build a context from an input value with a fresh (never-fired)
    /// cancellation token and no attached tools.
    pub fn new(input: Value) -> Self {
        Self { input, cancellation: tokio_util::sync::CancellationToken::new(), tools: None }
    }

    /// Attach a tool caller, chained.
    #[must_use]
    pub fn with_tools(mut self, tools: Arc<dyn ToolCaller>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// `true` if cancellation has been requested.
    pub fn is_canceled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// Outcome of one action invocation.
#[derive(Debug, Clone)]
pub struct ActionResult {
    /// The produced output, or the failure that ended the attempt.
    pub output: Result<NodeOutputData, nebula_error::NebulaError>,
    /// Wall-clock time spent executing.
    pub execution_time_ms: u64,
}

impl ActionResult {
    /// Build a success result from an inline JSON value.
    pub fn success(value: Value, execution_time_ms: u64) -> Self {
        Self { output: Ok(NodeOutputData::inline(value)), execution_time_ms }
    }

    /// Build a failure result.
    pub fn failure(error: nebula_error::NebulaError, execution_time_ms: u64) -> Self {
        Self { output: Err(error), execution_time_ms }
    }

    /// `true` if this result represents success.
    pub fn is_success(&self) -> bool {
        self.output.is_ok()
    }
}

/// An executable action type: the "Action" node subtype's dispatch
/// target. The engine stores actions as `Arc<dyn Action>` in
/// [`crate::registry::ActionRegistry`].
#[async_trait]
pub trait Action: Send + Sync + 'static {
    /// Static metadata describing this action.
    fn metadata(&self) -> &ActionMetadata;

    /// Execute one invocation.
    async fn execute(&self, ctx: &ActionContext) -> ActionResult;
}
