//! The action runtime -- the main execution orchestrator.
//!
//! Ties the action registry, the tool adapter registry, the
//! per-`(user, provider)` concurrency limiter, and telemetry together
//! for node executors. Credential resolution and refresh already live
//! inside each adapter (via [`nebula_action::CredentialProvider`]); this
//! crate supplies the concrete implementation over `nebula-credential`
//! (see [`crate::credential_provider::StoreCredentialProvider`]).

use std::sync::Arc;
use std::time::Instant;

use nebula_action::{ActionContext, ActionRegistry, ActionResult, DataPassingPolicy, LargeDataStrategy, NodeOutputData, ToolCallResult};
use nebula_core::{CredentialKey, ExecutionId, NodeId, NodeKey, ProviderId, UserId};
use nebula_resource::ConcurrencyLimiter;
use nebula_telemetry::event::ExecutionEventBuilder;
use nebula_telemetry::{ExecutionEventType, TelemetryService};
use serde_json::Value;

use crate::adapter_registry::ToolAdapterRegistry;
use crate::error::RuntimeError;
use crate::memory::KeyValueMemoryStore;

/// Orchestrates action execution and tool adapter calls for one engine
/// instance.
pub struct ActionRuntime {
    actions: Arc<ActionRegistry>,
    adapters: Arc<ToolAdapterRegistry>,
    limiter: Arc<ConcurrencyLimiter>,
    telemetry: Arc<dyn TelemetryService>,
    data_policy: DataPassingPolicy,
    memory: Arc<KeyValueMemoryStore>,
}

/// Bytes a materialized output occupies, for data passing policy checks.
fn output_size(output: &NodeOutputData) -> u64 {
    match output {
        NodeOutputData::Inline(value) => serde_json::to_vec(value).map(|bytes| bytes.len() as u64).unwrap_or(0),
        NodeOutputData::BlobRef { size, .. } => *size,
    }
}

impl ActionRuntime {
    /// Assemble a runtime from its components.
    pub fn new(actions: Arc<ActionRegistry>, adapters: Arc<ToolAdapterRegistry>, limiter: Arc<ConcurrencyLimiter>, telemetry: Arc<dyn TelemetryService>, data_policy: DataPassingPolicy) -> Self {
        Self { actions, adapters, limiter, telemetry, data_policy, memory: Arc::new(KeyValueMemoryStore::new()) }
    }

    /// Access the action registry.
    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    /// Access the tool adapter registry.
    pub fn adapters(&self) -> &ToolAdapterRegistry {
        &self.adapters
    }

    /// Access the key-value memory store backing `memory` node
    /// attachments.
    pub fn memory(&self) -> &KeyValueMemoryStore {
        &self.memory
    }

    /// Execute a plain action (no credential resolution) by node key,
    /// enforcing the data passing policy on its output.
    pub async fn execute_action(&self, key: &str, input: Value, execution_id: ExecutionId, node_id: NodeId) -> Result<ActionResult, RuntimeError> {
        self.execute_action_with_context(key, ActionContext::new(input), execution_id, node_id).await
    }

    /// Execute an `ai_agent` node's registered action with a
    /// [`nebula_action::ToolCaller`] attached, so it can call the
    /// node's attached tool/memory nodes mid-execution.
    pub async fn execute_agent_action(&self, key: &str, input: Value, tools: Arc<dyn nebula_action::ToolCaller>, execution_id: ExecutionId, node_id: NodeId) -> Result<ActionResult, RuntimeError> {
        self.execute_action_with_context(key, ActionContext::new(input).with_tools(tools), execution_id, node_id).await
    }

    async fn execute_action_with_context(&self, key: &str, ctx: ActionContext, execution_id: ExecutionId, node_id: NodeId) -> Result<ActionResult, RuntimeError> {
        let node_key = NodeKey::parse(key).map_err(|_| RuntimeError::ActionNotFound { key: key.to_owned() })?;
        let action = self.actions.get(&node_key).map_err(|_| RuntimeError::ActionNotFound { key: key.to_owned() })?.clone();

        self.telemetry.event_bus().emit(ExecutionEventBuilder::new(ExecutionEventType::NodeRunning, execution_id).node(node_id)).await;

        let started = Instant::now();
        let mut result = action.execute(&ctx).await;
        let _ = started.elapsed();

        self.enforce_data_limit(&mut result)?;

        match &result.output {
            Ok(_) => {
                self.telemetry.event_bus().emit(ExecutionEventBuilder::new(ExecutionEventType::NodeSuccess, execution_id).node(node_id).status("success")).await;
            }
            Err(err) => {
                self.telemetry
                    .event_bus()
                    .emit(ExecutionEventBuilder::new(ExecutionEventType::NodeError, execution_id).node(node_id).status("error").data(serde_json::json!({ "message": err.message() })))
                    .await;
            }
        }
        self.telemetry.metrics().counter(nebula_metrics::names::ACTIONS_EXECUTED_TOTAL).inc();
        self.telemetry.metrics().histogram(nebula_metrics::names::ACTION_DURATION_SECONDS).observe(result.execution_time_ms as f64 / 1000.0);
        if result.output.is_err() {
            self.telemetry.metrics().counter(nebula_metrics::names::ACTIONS_FAILED_TOTAL).inc();
        }

        Ok(result)
    }

    /// Call a tool adapter operation on behalf of `user`, acquiring a
    /// per-`(user, provider)` concurrency permit before dispatching and
    /// enforcing the data passing policy on the response payload.
    pub async fn call_tool(&self, provider: &ProviderId, operation: &str, params: Value, credential: &CredentialKey, user: UserId, execution_id: ExecutionId, node_id: NodeId) -> Result<ToolCallResult, RuntimeError> {
        let adapter = self.adapters.get(provider)?;

        self.telemetry.event_bus().emit(ExecutionEventBuilder::new(ExecutionEventType::NodeRunning, execution_id).node(node_id)).await;

        let _permit = self.limiter.acquire(user, provider).await;
        let mut result = adapter.call(operation, params, credential).await;

        if let Some(data) = &result.data {
            let actual = serde_json::to_vec(data).map(|b| b.len() as u64).unwrap_or(0);
            if actual > self.data_policy.max_node_output_bytes {
                self.telemetry.metrics().counter(nebula_metrics::names::ACTIONS_FAILED_TOTAL).inc();
                match self.data_policy.large_data_strategy {
                    LargeDataStrategy::Reject => return Err(RuntimeError::DataLimitExceeded { limit_bytes: self.data_policy.max_node_output_bytes, actual_bytes: actual }),
                    LargeDataStrategy::SpillToBlob => {
                        tracing::warn!(%provider, actual, limit = self.data_policy.max_node_output_bytes, "tool call output exceeds limit, spill to blob not yet implemented");
                    }
                }
            }
        }

        if result.success {
            self.telemetry.event_bus().emit(ExecutionEventBuilder::new(ExecutionEventType::NodeSuccess, execution_id).node(node_id).status("success")).await;
        } else {
            let message = result.error.as_ref().map(|e| e.message().to_owned()).unwrap_or_default();
            self.telemetry.event_bus().emit(ExecutionEventBuilder::new(ExecutionEventType::NodeError, execution_id).node(node_id).status("error").data(serde_json::json!({ "message": message }))).await;
        }
        self.telemetry.metrics().counter(nebula_metrics::names::ACTIONS_EXECUTED_TOTAL).inc();
        self.telemetry.metrics().histogram(nebula_metrics::names::ACTION_DURATION_SECONDS).observe(result.execution_time_ms as f64 / 1000.0);
        if !result.success {
            self.telemetry.metrics().counter(nebula_metrics::names::ACTIONS_FAILED_TOTAL).inc();
        }

        result.metadata.insert("node_id".into(), Value::String(node_id.to_string()));
        Ok(result)
    }

    fn enforce_data_limit(&self, result: &mut ActionResult) -> Result<(), RuntimeError> {
        let Ok(output) = &result.output else { return Ok(()) };
        let actual = output_size(output);
        if actual <= self.data_policy.max_node_output_bytes {
            return Ok(());
        }

        match self.data_policy.large_data_strategy {
            LargeDataStrategy::Reject => Err(RuntimeError::DataLimitExceeded { limit_bytes: self.data_policy.max_node_output_bytes, actual_bytes: actual }),
            LargeDataStrategy::SpillToBlob => {
                tracing::warn!(actual, limit = self.data_policy.max_node_output_bytes, "action output exceeds limit, spill to blob not yet implemented");
                Ok(())
            }
        }
    }
}
