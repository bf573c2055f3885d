//! Per-[`NodeKind`] dispatch: routes a node's resolved input to the
//! action runtime, the tool adapter layer, or the flow-subtype
//! evaluators in [`crate::flow`].

use std::sync::Arc;

use async_trait::async_trait;
use nebula_action::{NodeOutputData, ToolCaller};
use nebula_core::{ExecutionId, NodeId, ProviderId, UserId};
use nebula_error::NebulaError;
use nebula_expression::ExpressionEngine;
use nebula_runtime::ActionRuntime;
use nebula_workflow::{NodeDefinition, NodeKind, WorkflowDefinition};

use crate::flow::dispatch_flow;

/// Everything a node dispatch can hand back to the scheduler besides the
/// bare success/failure of the attempt.
pub struct DispatchOutcome {
    /// The node's materialized output.
    pub output: NodeOutputData,
    /// For `flow` nodes with branching subtypes, which outgoing output
    /// keys stay live.
    pub taken_branches: Option<Vec<String>>,
    /// Set for `human` nodes: this attempt only emitted the external
    /// prompt and did not run to true completion. There is no persisted
    /// resume path in this crate (a single `execute_workflow` call is
    /// fully synchronous); the caller treats the node as complete with
    /// this flag surfaced in its output for a higher layer to act on.
    pub suspended: bool,
}

impl DispatchOutcome {
    fn done(output: NodeOutputData) -> Self {
        Self { output, taken_branches: None, suspended: false }
    }
}

/// The identity a node's tool-adapter call is made as.
pub struct DispatchIdentity {
    /// The execution this dispatch belongs to.
    pub execution_id: ExecutionId,
    /// The node being dispatched.
    pub node_id: NodeId,
    /// The workflow owner, used to resolve the node's credential.
    pub user_id: UserId,
}

/// Resolve the coarse [`NodeKind`] a node's `key.kind()` string names.
///
/// `nebula-workflow`'s own `validate.rs` keeps this mapping private since
/// it only needs it transiently; the engine needs it on every dispatch,
/// so it keeps its own copy rather than depending on a private helper.
pub fn node_kind(node: &NodeDefinition) -> Option<NodeKind> {
    match node.kind_str() {
        "trigger" => Some(NodeKind::Trigger),
        "ai_agent" => Some(NodeKind::AiAgent),
        "external_action" => Some(NodeKind::ExternalAction),
        "action" => Some(NodeKind::Action),
        "flow" => Some(NodeKind::Flow),
        "human" => Some(NodeKind::Human),
        "tool" => Some(NodeKind::Tool),
        "memory" => Some(NodeKind::Memory),
        _ => None,
    }
}

/// Dispatch one schedulable node to its executor.
pub async fn dispatch_node(
    runtime: &Arc<ActionRuntime>,
    expressions: &ExpressionEngine,
    workflow: &Arc<WorkflowDefinition>,
    node: &NodeDefinition,
    input: serde_json::Value,
    identity: &DispatchIdentity,
) -> Result<DispatchOutcome, NebulaError> {
    let kind = node_kind(node).ok_or_else(|| NebulaError::invalid_workflow(format!("unknown node kind for key `{}`", node.key)))?;

    match kind {
        NodeKind::Trigger => Ok(DispatchOutcome::done(NodeOutputData::inline(input))),

        NodeKind::Action => {
            let result = runtime.execute_action(&node.key.to_string(), input, identity.execution_id, identity.node_id).await?;
            let output = result.output?;
            Ok(DispatchOutcome::done(output))
        }

        NodeKind::AiAgent => dispatch_ai_agent(runtime, workflow, node, input, identity).await,

        NodeKind::ExternalAction => dispatch_external_action(runtime, node, input, identity).await,

        NodeKind::Flow => {
            let outcome = dispatch_flow(expressions, node, input)?;
            Ok(DispatchOutcome { output: NodeOutputData::inline(outcome.output), taken_branches: outcome.taken_branches, suspended: false })
        }

        NodeKind::Human => dispatch_human(runtime, node, input, identity).await,

        NodeKind::Tool | NodeKind::Memory => {
            Err(NebulaError::invalid_state(format!("node `{}` is a {:?} node and cannot be scheduled directly", node.id, kind)))
        }
    }
}

/// Dispatch an `ai_agent` node: validate its `attached_nodes` actually
/// resolve to tool/memory nodes, then run the agent's own registered
/// action with a [`ToolCaller`] that can call those attachments under
/// their own credentials. The model-calling logic itself lives in
/// whatever action is registered under the node's key; only the
/// callable-tool contract is this crate's concern.
async fn dispatch_ai_agent(runtime: &Arc<ActionRuntime>, workflow: &Arc<WorkflowDefinition>, node: &NodeDefinition, input: serde_json::Value, identity: &DispatchIdentity) -> Result<DispatchOutcome, NebulaError> {
    for attached_id in &node.attached_nodes {
        let attached = workflow.node(*attached_id).ok_or_else(|| NebulaError::invalid_workflow(format!("node `{}` attaches unknown node `{attached_id}`", node.id)))?;
        match node_kind(attached) {
            Some(NodeKind::Tool) | Some(NodeKind::Memory) => {}
            _ => return Err(NebulaError::invalid_workflow(format!("node `{}` attaches `{attached_id}`, which is neither a tool nor a memory node", node.id))),
        }
    }

    let tools: Arc<dyn ToolCaller> = Arc::new(AttachedToolCaller {
        runtime: Arc::clone(runtime),
        workflow: Arc::clone(workflow),
        attached: node.attached_nodes.clone(),
        execution_id: identity.execution_id,
        user_id: identity.user_id,
    });

    let result = runtime.execute_agent_action(&node.key.to_string(), input, tools, identity.execution_id, identity.node_id).await?;
    let output = result.output?;
    Ok(DispatchOutcome::done(output))
}

/// Resolves an `ai_agent` node's attachments into real tool/memory calls.
struct AttachedToolCaller {
    runtime: Arc<ActionRuntime>,
    workflow: Arc<WorkflowDefinition>,
    attached: Vec<NodeId>,
    execution_id: ExecutionId,
    user_id: UserId,
}

#[async_trait]
impl ToolCaller for AttachedToolCaller {
    async fn call_tool(&self, node_id: NodeId, operation: &str, params: serde_json::Value) -> Result<serde_json::Value, NebulaError> {
        if !self.attached.contains(&node_id) {
            return Err(NebulaError::invalid_state(format!("node `{node_id}` is not attached to this agent")));
        }
        let node = self.workflow.node(node_id).ok_or_else(|| NebulaError::invalid_workflow(format!("attached node `{node_id}` not found")))?;

        match node_kind(node) {
            Some(NodeKind::Tool) => {
                let provider = ProviderId::from(node.key.subtype());
                let credential_ref = node.credential.as_ref().ok_or_else(|| NebulaError::credential_missing(format!("tool node `{node_id}` has no credential reference")))?;
                let credential = credential_ref.resolve(self.user_id);
                let result = self.runtime.call_tool(&provider, operation, params, &credential, self.user_id, self.execution_id, node_id).await?;
                if result.success {
                    Ok(result.data.unwrap_or(serde_json::Value::Null))
                } else {
                    Err(result.error.unwrap_or_else(|| NebulaError::internal("tool call failed with no error detail")))
                }
            }
            Some(NodeKind::Memory) => dispatch_memory_op(&self.runtime, self.execution_id, node, operation, params),
            _ => Err(NebulaError::invalid_state(format!("attached node `{node_id}` is neither a tool nor a memory node"))),
        }
    }
}

/// Run one memory operation against an attached `memory` node.
///
/// Only the `key_value` subtype is implemented (get/set). `buffer`,
/// `vector`, `document`, and `embedding` are documented attachments in
/// the workflow schema but have no backing store here; callers get an
/// `invalid_input` error rather than a silent no-op.
fn dispatch_memory_op(runtime: &Arc<ActionRuntime>, execution_id: ExecutionId, node: &NodeDefinition, operation: &str, params: serde_json::Value) -> Result<serde_json::Value, NebulaError> {
    if node.key.subtype() != "key_value" {
        return Err(NebulaError::invalid_input(format!("memory subtype `{}` is not implemented; only `key_value` is supported", node.key.subtype())));
    }

    match operation {
        "get" => {
            let key = params.get("key").and_then(serde_json::Value::as_str).ok_or_else(|| NebulaError::invalid_input("memory `get` requires a `key` string"))?;
            Ok(runtime.memory().get(execution_id, node.id, key))
        }
        "set" => {
            let key = params.get("key").and_then(serde_json::Value::as_str).ok_or_else(|| NebulaError::invalid_input("memory `set` requires a `key` string"))?.to_string();
            let value = params.get("value").cloned().unwrap_or(serde_json::Value::Null);
            runtime.memory().set(execution_id, node.id, key, value.clone());
            Ok(value)
        }
        _ => Err(NebulaError::invalid_input(format!("unsupported key_value memory operation `{operation}`"))),
    }
}

async fn dispatch_external_action(runtime: &Arc<ActionRuntime>, node: &NodeDefinition, input: serde_json::Value, identity: &DispatchIdentity) -> Result<DispatchOutcome, NebulaError> {
    let provider = ProviderId::from(node.key.subtype());
    let operation = node
        .configurations
        .get("operation")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| NebulaError::invalid_workflow(format!("node `{}` has no `operation` configured", node.id)))?;
    let credential_ref = node.credential.as_ref().ok_or_else(|| NebulaError::credential_missing(format!("node `{}` has no credential reference", node.id)))?;
    let credential = credential_ref.resolve(identity.user_id);

    let result = runtime.call_tool(&provider, operation, input, &credential, identity.user_id, identity.execution_id, identity.node_id).await?;

    if result.success {
        Ok(DispatchOutcome::done(NodeOutputData::inline(result.data.unwrap_or(serde_json::Value::Null))))
    } else {
        Err(result.error.unwrap_or_else(|| NebulaError::internal("tool call failed with no error detail")))
    }
}

/// `human` nodes emit a prompt through the same tool-adapter path as an
/// `external_action` node (the provider is the notification channel —
/// Slack, email, etc.) and are reported as suspended rather than
/// retried/failed on the adapter's own success.
async fn dispatch_human(runtime: &Arc<ActionRuntime>, node: &NodeDefinition, input: serde_json::Value, identity: &DispatchIdentity) -> Result<DispatchOutcome, NebulaError> {
    let outcome = dispatch_external_action(runtime, node, input, identity).await?;
    Ok(DispatchOutcome { output: outcome.output, taken_branches: None, suspended: true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use nebula_action::{Action, ActionMetadata, ActionRegistry, ActionResult, ToolAdapter, ToolCallResult};
    use nebula_core::{CredentialKey, NodeKey, UserId, Version, WorkflowId};
    use nebula_resource::ConcurrencyLimiter;
    use nebula_runtime::ToolAdapterRegistry;
    use nebula_telemetry::NoopTelemetry;
    use nebula_workflow::CredentialRef;
    use std::collections::HashMap;

    fn node(kind: &str, subtype: &str) -> NodeDefinition {
        NodeDefinition::new(NodeId::v4(), "n", NodeKey::new(kind, subtype))
    }

    #[test]
    fn node_kind_maps_every_known_kind() {
        assert_eq!(node_kind(&node("trigger", "manual")), Some(NodeKind::Trigger));
        assert_eq!(node_kind(&node("ai_agent", "chat")), Some(NodeKind::AiAgent));
        assert_eq!(node_kind(&node("external_action", "github")), Some(NodeKind::ExternalAction));
        assert_eq!(node_kind(&node("action", "http_request")), Some(NodeKind::Action));
        assert_eq!(node_kind(&node("flow", "if")), Some(NodeKind::Flow));
        assert_eq!(node_kind(&node("human", "approval")), Some(NodeKind::Human));
        assert_eq!(node_kind(&node("tool", "calendar")), Some(NodeKind::Tool));
        assert_eq!(node_kind(&node("memory", "kv")), Some(NodeKind::Memory));
    }

    #[test]
    fn node_kind_rejects_unknown_strings() {
        assert_eq!(node_kind(&node("bogus", "x")), None);
    }

    struct StubAdapter {
        provider: ProviderId,
    }

    #[async_trait]
    impl ToolAdapter for StubAdapter {
        fn provider(&self) -> ProviderId {
            self.provider.clone()
        }

        async fn call(&self, operation: &str, params: serde_json::Value, _credential: &CredentialKey) -> ToolCallResult {
            ToolCallResult::success(serde_json::json!({"operation": operation, "params": params}), 1)
        }
    }

    /// Calls whichever attached node `ctx.input.tool_node` names, with
    /// `ctx.input.operation`/`ctx.input.params`, and returns the result.
    struct AgentCallsAttachedNode {
        metadata: ActionMetadata,
    }

    #[async_trait]
    impl Action for AgentCallsAttachedNode {
        fn metadata(&self) -> &ActionMetadata {
            &self.metadata
        }

        async fn execute(&self, ctx: &nebula_action::ActionContext) -> ActionResult {
            let tools = ctx.tools.clone().expect("ai_agent dispatch should attach a ToolCaller");
            let node_id: NodeId = serde_json::from_value(ctx.input["tool_node"].clone()).expect("tool_node");
            let operation = ctx.input["operation"].as_str().unwrap_or_default();
            let params = ctx.input["params"].clone();
            match tools.call_tool(node_id, operation, params).await {
                Ok(value) => ActionResult::success(value, 1),
                Err(err) => ActionResult::failure(err, 1),
            }
        }
    }

    fn agent_key() -> NodeKey {
        NodeKey::new("ai_agent", "chat")
    }

    fn runtime_with_agent() -> Arc<ActionRuntime> {
        let mut actions = ActionRegistry::new();
        actions.register(Arc::new(AgentCallsAttachedNode { metadata: ActionMetadata::new(agent_key(), "Agent", "calls an attached node") }));

        let adapters = ToolAdapterRegistry::new();
        adapters.register(Arc::new(StubAdapter { provider: "slack".into() }));

        Arc::new(ActionRuntime::new(
            Arc::new(actions),
            Arc::new(adapters),
            Arc::new(ConcurrencyLimiter::new(10)),
            NoopTelemetry::arc(64),
            nebula_action::DataPassingPolicy::default(),
        ))
    }

    fn test_workflow(nodes: Vec<NodeDefinition>) -> Arc<WorkflowDefinition> {
        let now = Utc::now();
        Arc::new(WorkflowDefinition {
            id: WorkflowId::v4(),
            owner_id: UserId::v4(),
            team_id: None,
            name: "test".into(),
            description: None,
            version: Version::new(0, 1, 0),
            nodes,
            connections: Vec::new(),
            variables: HashMap::new(),
            config: Default::default(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    #[tokio::test]
    async fn ai_agent_calls_an_attached_tool_node_via_the_adapter_registry() {
        let runtime = runtime_with_agent();
        let expressions = ExpressionEngine::new();

        let mut tool_node = node("tool", "slack");
        tool_node.credential = Some(CredentialRef { provider: "slack".into(), integration_id: "default".into() });
        let tool_id = tool_node.id;

        let mut agent = NodeDefinition::new(NodeId::v4(), "agent", agent_key());
        agent.attached_nodes.push(tool_id);
        let user_id = UserId::v4();
        let workflow = test_workflow(vec![agent.clone(), tool_node]);

        let identity = DispatchIdentity { execution_id: ExecutionId::v4(), node_id: agent.id, user_id };
        let input = serde_json::json!({"tool_node": tool_id, "operation": "post_message", "params": {"channel": "#general"}});

        let outcome = dispatch_node(&runtime, &expressions, &workflow, &agent, input, &identity).await.unwrap();
        let NodeOutputData::Inline(value) = outcome.output else { panic!("expected inline output") };
        assert_eq!(value["operation"], serde_json::json!("post_message"));
    }

    #[tokio::test]
    async fn ai_agent_rejects_calls_to_nodes_not_in_its_attachment_list() {
        let runtime = runtime_with_agent();
        let expressions = ExpressionEngine::new();

        let mut tool_node = node("tool", "slack");
        tool_node.credential = Some(CredentialRef { provider: "slack".into(), integration_id: "default".into() });
        let not_attached_id = NodeId::v4();

        let agent = NodeDefinition::new(NodeId::v4(), "agent", agent_key());
        let user_id = UserId::v4();
        let workflow = test_workflow(vec![agent.clone(), tool_node]);

        let identity = DispatchIdentity { execution_id: ExecutionId::v4(), node_id: agent.id, user_id };
        let input = serde_json::json!({"tool_node": not_attached_id, "operation": "post_message", "params": {}});

        let result = dispatch_node(&runtime, &expressions, &workflow, &agent, input, &identity).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn ai_agent_calls_an_attached_key_value_memory_node() {
        let runtime = runtime_with_agent();
        let expressions = ExpressionEngine::new();

        let memory_node = node("memory", "key_value");
        let memory_id = memory_node.id;

        let mut agent = NodeDefinition::new(NodeId::v4(), "agent", agent_key());
        agent.attached_nodes.push(memory_id);
        let user_id = UserId::v4();
        let workflow = test_workflow(vec![agent.clone(), memory_node]);
        let execution_id = ExecutionId::v4();

        let identity = DispatchIdentity { execution_id, node_id: agent.id, user_id };
        let set_input = serde_json::json!({"tool_node": memory_id, "operation": "set", "params": {"key": "count", "value": 1}});
        dispatch_node(&runtime, &expressions, &workflow, &agent, set_input, &identity).await.unwrap();

        let get_input = serde_json::json!({"tool_node": memory_id, "operation": "get", "params": {"key": "count"}});
        let outcome = dispatch_node(&runtime, &expressions, &workflow, &agent, get_input, &identity).await.unwrap();
        let NodeOutputData::Inline(value) = outcome.output else { panic!("expected inline output") };
        assert_eq!(value, serde_json::json!(1));
    }

    #[tokio::test]
    async fn ai_agent_rejects_unimplemented_memory_subtypes() {
        let runtime = runtime_with_agent();
        let expressions = ExpressionEngine::new();

        let memory_node = node("memory", "vector");
        let memory_id = memory_node.id;

        let mut agent = NodeDefinition::new(NodeId::v4(), "agent", agent_key());
        agent.attached_nodes.push(memory_id);
        let user_id = UserId::v4();
        let workflow = test_workflow(vec![agent.clone(), memory_node]);

        let identity = DispatchIdentity { execution_id: ExecutionId::v4(), node_id: agent.id, user_id };
        let input = serde_json::json!({"tool_node": memory_id, "operation": "get", "params": {"key": "x"}});

        let result = dispatch_node(&runtime, &expressions, &workflow, &agent, input, &identity).await;
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), NebulaError::invalid_input("x").kind());
    }
}
