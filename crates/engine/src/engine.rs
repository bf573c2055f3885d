//! The scheduler: turns a [`WorkflowDefinition`] and a set of inputs into
//! a completed [`ExecutionResult`] by walking the plan's parallel levels,
//! dispatching each live node, and propagating skips/failures along the
//! way.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use nebula_action::{ExecutionBudget, NodeOutputData};
use nebula_core::{ExecutionId, NodeId, UserId};
use nebula_error::NebulaError;
use nebula_execution::{
    ExecutionPlan, ExecutionState, ExecutionStatus, IdempotencyKey, NodeAttempt, NodeOutput,
    NodeStatus,
};
use nebula_expression::ExpressionEngine;
use nebula_runtime::ActionRuntime;
use nebula_telemetry::event::ExecutionEventBuilder;
use nebula_telemetry::{ExecutionEventType, TelemetryService};
use nebula_workflow::{
    has_trigger, validate_structure, DependencyGraph, ErrorPolicy, NodeDefinition,
    WorkflowDefinition, WorkflowError,
};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::EngineConfig;
use crate::convert::{
    apply_conversion, continue_error_payload, continue_regular_payload, extract_output_slot,
    InputAccumulator,
};
use crate::dispatch::{dispatch_node, node_kind, DispatchIdentity, DispatchOutcome};
use crate::error::EngineError;
use crate::result::ExecutionResult;

/// The arguments for a single `execute_workflow` call.
#[derive(Debug, Clone)]
pub struct ExecuteRequest {
    /// The payload the trigger node (or `start_from_node`) receives.
    pub inputs: Value,
    /// Run as if only the subgraph reachable from this node exists;
    /// every node not reachable from it (and not the node itself) is
    /// pre-marked `skipped`. The node receives `inputs` directly,
    /// ignoring any upstream connections it would normally have.
    pub start_from_node: Option<NodeId>,
    /// Bypass the "workflow must have a trigger node" check. Set
    /// automatically when `start_from_node` is used to re-run a subgraph
    /// that legitimately has no reachable trigger.
    pub skip_trigger_validation: bool,
    /// Resource limits for this one execution.
    pub budget: ExecutionBudget,
    /// The workflow owner, used to resolve node credentials.
    pub user_id: UserId,
    /// Caller-assigned execution id, used in place of a freshly generated
    /// one. Lets a caller that needs to know the id before the execution
    /// finishes (e.g. to hand it back in an HTTP response and subscribe
    /// to its event stream) pre-generate it.
    pub execution_id: Option<ExecutionId>,
}

impl ExecuteRequest {
    /// A request with default budget and no `start_from_node`.
    #[must_use]
    pub fn new(inputs: Value, user_id: UserId) -> Self {
        Self {
            inputs,
            start_from_node: None,
            skip_trigger_validation: false,
            budget: ExecutionBudget::default(),
            user_id,
            execution_id: None,
        }
    }

    /// Use a pre-generated execution id instead of letting the engine
    /// generate one.
    #[must_use]
    pub fn with_execution_id(mut self, execution_id: ExecutionId) -> Self {
        self.execution_id = Some(execution_id);
        self
    }

    /// Start from a specific node instead of the workflow's triggers.
    #[must_use]
    pub fn with_start_from_node(mut self, node_id: NodeId) -> Self {
        self.start_from_node = Some(node_id);
        self.skip_trigger_validation = true;
        self
    }

    /// Override the resource budget.
    #[must_use]
    pub fn with_budget(mut self, budget: ExecutionBudget) -> Self {
        self.budget = budget;
        self
    }
}

/// Schedules and runs workflow executions.
///
/// Holds two independent concurrency caps: `execution_slots` bounds how
/// many `execute_workflow` calls run at once across the whole engine,
/// `node_task_slots` bounds how many node tasks run at once summed over
/// every one of those executions. Each execution additionally gets its
/// own per-execution cap from `request.budget.max_concurrent_nodes`.
pub struct WorkflowEngine {
    runtime: Arc<ActionRuntime>,
    expressions: Arc<ExpressionEngine>,
    telemetry: Arc<dyn TelemetryService>,
    config: EngineConfig,
    execution_slots: Arc<Semaphore>,
    node_task_slots: Arc<Semaphore>,
}

impl WorkflowEngine {
    /// Assemble an engine from its components.
    #[must_use]
    pub fn new(
        runtime: Arc<ActionRuntime>,
        expressions: Arc<ExpressionEngine>,
        telemetry: Arc<dyn TelemetryService>,
        config: EngineConfig,
    ) -> Self {
        let execution_slots = Arc::new(Semaphore::new(config.max_concurrent_executions));
        let node_task_slots = Arc::new(Semaphore::new(config.max_concurrent_node_tasks));
        Self { runtime, expressions, telemetry, config, execution_slots, node_task_slots }
    }

    /// Run one workflow to completion (or to the point where it
    /// suspends, is stopped by a failing node, or exceeds its wall-clock
    /// budget).
    ///
    /// Returns `Err` only for problems discovered before the execution
    /// starts running (an invalid workflow graph, a plan that can't be
    /// built, a missing trigger). Once the execution transitions to
    /// `Running`, every subsequent outcome — including `stop`-policy
    /// node failure and timeout — is reported as `Ok(ExecutionResult)`
    /// with the corresponding terminal status.
    pub async fn execute_workflow(
        &self,
        workflow: Arc<WorkflowDefinition>,
        request: ExecuteRequest,
    ) -> Result<ExecutionResult, EngineError> {
        let _execution_permit =
            self.execution_slots.clone().acquire_owned().await.expect("execution semaphore is never closed");

        let start = Instant::now();
        let execution_id = request.execution_id.unwrap_or_else(ExecutionId::v4);

        let graph = validate_structure(&workflow)?;

        if !request.skip_trigger_validation && !has_trigger(&workflow) {
            return Err(WorkflowError::MissingTrigger.into());
        }
        if let Some(start_node) = request.start_from_node {
            if workflow.node(start_node).is_none() {
                return Err(WorkflowError::UnknownStartNode(start_node).into());
            }
        }

        let plan = ExecutionPlan::from_workflow(execution_id, &workflow, request.budget.clone())?;
        let graph = Arc::new(graph);

        let all_node_ids: Vec<NodeId> = workflow.nodes.iter().map(|n| n.id).collect();
        let state = Arc::new(Mutex::new(ExecutionState::new(execution_id, workflow.id, &all_node_ids)));
        state.lock().transition_status(ExecutionStatus::Running)?;

        self.telemetry
            .event_bus()
            .emit(ExecutionEventBuilder::new(ExecutionEventType::ExecutionStarted, execution_id))
            .await;
        self.telemetry.metrics().counter(nebula_metrics::names::EXECUTIONS_STARTED_TOTAL).inc();

        let mut preskipped = Vec::new();
        if let Some(start_node) = request.start_from_node {
            let reachable = graph.reachable_from(start_node);
            for &id in &all_node_ids {
                if id != start_node && !reachable.contains(&id) && mark_skipped(&state, id) {
                    preskipped.push(id);
                }
            }
        }
        for node in &workflow.nodes {
            if node.disabled && mark_skipped(&state, node.id) {
                preskipped.push(node.id);
            }
        }
        for node_id in preskipped {
            self.emit_skipped(execution_id, node_id).await;
        }

        let node_map: HashMap<NodeId, &NodeDefinition> = workflow.nodes.iter().map(|n| (n.id, n)).collect();
        let cancel_token = CancellationToken::new();
        let level_slots = Arc::new(Semaphore::new(request.budget.max_concurrent_nodes.max(1)));
        let total_retries = Arc::new(AtomicU32::new(0));
        let workflow_timeout = Duration::from_secs(workflow.config.timeout_secs).min(request.budget.max_wall_time);

        let mut stop: Option<(Option<NodeId>, String)> = None;
        let mut waiting = false;
        let mut node_error: Option<String> = None;

        'levels: for level in &plan.parallel_groups {
            if start.elapsed() > workflow_timeout {
                stop = Some((None, "workflow exceeded its wall-clock timeout".to_string()));
                break;
            }
            if cancel_token.is_cancelled() {
                break;
            }

            let live: Vec<&NodeDefinition> = level
                .iter()
                .filter_map(|id| node_map.get(id).copied())
                .filter(|n| matches!(node_kind(n), Some(k) if k.is_schedulable()))
                .filter(|n| state.lock().node_state(n.id).map(|s| s.status) == Some(NodeStatus::Pending))
                .collect();

            let mut join_set: JoinSet<Result<NodeRunOutcome, EngineError>> = JoinSet::new();
            for node in live {
                let input = resolve_input(&self.expressions, &workflow, &state, node, &request);

                let node = node.clone();
                let runtime = Arc::clone(&self.runtime);
                let expressions = Arc::clone(&self.expressions);
                let telemetry = Arc::clone(&self.telemetry);
                let workflow = Arc::clone(&workflow);
                let graph = Arc::clone(&graph);
                let state = Arc::clone(&state);
                let node_task_slots = Arc::clone(&self.node_task_slots);
                let level_slots = Arc::clone(&level_slots);
                let cancel_token = cancel_token.clone();
                let total_retries = Arc::clone(&total_retries);
                let budget = request.budget.clone();
                let user_id = request.user_id;

                join_set.spawn(async move {
                    let _global_permit = node_task_slots.acquire_owned().await.ok();
                    let _level_permit = level_slots.acquire_owned().await.ok();
                    run_node(
                        &runtime, &expressions, &telemetry, &workflow, &graph, &state, &node, input,
                        execution_id, user_id, &cancel_token, &total_retries, &budget,
                    )
                    .await
                });
            }

            let mut grace_deadline: Option<Instant> = None;
            loop {
                let joined = match grace_deadline {
                    None => match join_set.join_next().await {
                        Some(joined) => joined,
                        None => break,
                    },
                    Some(deadline) => {
                        let remaining = deadline.saturating_duration_since(Instant::now());
                        tokio::select! {
                            biased;
                            _ = tokio::time::sleep(remaining) => {
                                force_cancel_running(&state, execution_id, &self.telemetry).await;
                                join_set.abort_all();
                                break;
                            }
                            joined = join_set.join_next() => match joined {
                                Some(joined) => joined,
                                None => break,
                            },
                        }
                    }
                };

                match joined {
                    Ok(Ok(NodeRunOutcome::Continued)) => {}
                    Ok(Ok(NodeRunOutcome::ContinuedWithError(message))) => {
                        if node_error.is_none() {
                            node_error = Some(message);
                        }
                    }
                    Ok(Ok(NodeRunOutcome::Waiting)) => waiting = true,
                    Ok(Ok(NodeRunOutcome::Stopped(node_id, message))) => {
                        stop = Some((Some(node_id), message));
                        cancel_token.cancel();
                        grace_deadline.get_or_insert_with(|| Instant::now() + self.config.cancellation_grace);
                    }
                    Ok(Err(err)) => {
                        stop = Some((None, err.to_string()));
                        cancel_token.cancel();
                        grace_deadline.get_or_insert_with(|| Instant::now() + self.config.cancellation_grace);
                    }
                    Err(join_err) => {
                        stop = Some((None, format!("node task panicked: {join_err}")));
                        cancel_token.cancel();
                        grace_deadline.get_or_insert_with(|| Instant::now() + self.config.cancellation_grace);
                    }
                }
            }

            if state.lock().total_output_bytes > request.budget.max_payload_bytes {
                stop = Some((None, "execution exceeded its total payload budget".to_string()));
                cancel_token.cancel();
            }

            if waiting || stop.is_some() {
                break 'levels;
            }
        }

        self.telemetry.event_bus().forget(execution_id);

        let node_outputs = materialize_outputs(&state);
        let duration = start.elapsed();

        if waiting {
            return Ok(ExecutionResult {
                execution_id,
                status: ExecutionStatus::Waiting,
                node_outputs,
                duration,
                failed_node: None,
                error: None,
            });
        }

        if let Some((failed_node, message)) = stop {
            let final_status = if failed_node.is_none() && cancel_token.is_cancelled() {
                ExecutionStatus::Canceled
            } else {
                ExecutionStatus::Error
            };
            state.lock().transition_status(final_status).ok();
            let event_type = match final_status {
                ExecutionStatus::Canceled => ExecutionEventType::ExecutionCanceled,
                _ => ExecutionEventType::ExecutionFailed,
            };
            self.telemetry
                .event_bus()
                .emit(ExecutionEventBuilder::new(event_type, execution_id).data(serde_json::json!({ "message": message })))
                .await;
            self.telemetry.metrics().counter(nebula_metrics::names::EXECUTIONS_FAILED_TOTAL).inc();

            return Ok(ExecutionResult {
                execution_id,
                status: final_status,
                node_outputs,
                duration,
                failed_node,
                error: Some(message),
            });
        }

        if let Some(message) = node_error {
            // A node failed under `continue_regular`/`continue_error` rather
            // than `stop`, so traversal ran to completion rather than
            // breaking out of the level loop early. Per spec, any node
            // error still fails the whole execution.
            state.lock().transition_status(ExecutionStatus::Error).ok();
            self.telemetry
                .event_bus()
                .emit(ExecutionEventBuilder::new(ExecutionEventType::ExecutionFailed, execution_id).data(serde_json::json!({ "message": message })))
                .await;
            self.telemetry.metrics().counter(nebula_metrics::names::EXECUTIONS_FAILED_TOTAL).inc();

            return Ok(ExecutionResult {
                execution_id,
                status: ExecutionStatus::Error,
                node_outputs,
                duration,
                failed_node: None,
                error: Some(message),
            });
        }

        state.lock().transition_status(ExecutionStatus::Success)?;
        self.telemetry
            .event_bus()
            .emit(ExecutionEventBuilder::new(ExecutionEventType::ExecutionCompleted, execution_id))
            .await;
        self.telemetry.metrics().counter(nebula_metrics::names::EXECUTIONS_SUCCEEDED_TOTAL).inc();

        Ok(ExecutionResult {
            execution_id,
            status: ExecutionStatus::Success,
            node_outputs,
            duration,
            failed_node: None,
            error: None,
        })
    }

    async fn emit_skipped(&self, execution_id: ExecutionId, node_id: NodeId) {
        self.telemetry
            .event_bus()
            .emit(ExecutionEventBuilder::new(ExecutionEventType::NodeSkipped, execution_id).node(node_id))
            .await;
    }
}

/// What one node task resolved to.
enum NodeRunOutcome {
    /// Ran to success, or was already skipped, and the rest of the
    /// execution should proceed with no effect on final status.
    Continued,
    /// Failed under `continue_regular`/`continue_error` rather than
    /// `stop`: traversal proceeds, but the execution's final status
    /// must still be `error` once the run finishes.
    ContinuedWithError(String),
    /// A `human` node suspended the execution.
    Waiting,
    /// A `stop`-policy node exhausted its retries; the execution ends.
    Stopped(NodeId, String),
}

/// Force every node still `Running` to `Canceled` once the cancellation
/// grace period has elapsed without the spawned task returning. The
/// caller aborts the underlying `JoinSet` tasks separately; this only
/// reconciles the execution's own bookkeeping so it doesn't report those
/// nodes as stuck `Running` forever.
async fn force_cancel_running(state: &Arc<Mutex<ExecutionState>>, execution_id: ExecutionId, telemetry: &Arc<dyn TelemetryService>) {
    let stuck: Vec<NodeId> = {
        let mut guard = state.lock();
        let mut ids = Vec::new();
        for (id, ns) in guard.node_states.iter_mut() {
            if ns.status == NodeStatus::Running && ns.transition_to(NodeStatus::Canceled).is_ok() {
                ids.push(*id);
            }
        }
        ids
    };
    for node_id in stuck {
        telemetry
            .event_bus()
            .emit(ExecutionEventBuilder::new(ExecutionEventType::NodeError, execution_id).node(node_id).status("canceled"))
            .await;
    }
}

fn mark_skipped(state: &Mutex<ExecutionState>, node_id: NodeId) -> bool {
    let mut guard = state.lock();
    let Some(ns) = guard.node_states.get_mut(&node_id) else { return false };
    if ns.status == NodeStatus::Pending {
        ns.transition_to(NodeStatus::Skipped).is_ok()
    } else {
        false
    }
}

fn materialize(data: &NodeOutputData) -> Value {
    match data {
        NodeOutputData::Inline(value) => value.clone(),
        NodeOutputData::BlobRef { key, size, mime } => {
            serde_json::json!({ "blob_ref": { "key": key, "size": size, "mime": mime } })
        }
    }
}

fn output_bytes(value: &Value) -> u64 {
    serde_json::to_vec(value).map(|bytes| bytes.len() as u64).unwrap_or(0)
}

fn materialize_outputs(state: &Mutex<ExecutionState>) -> HashMap<NodeId, Value> {
    state
        .lock()
        .node_states
        .iter()
        .filter_map(|(&id, ns)| ns.current_output.as_ref().and_then(NodeOutput::as_value).map(|v| (id, v.clone())))
        .collect()
}

/// Build a downstream node's input from its resolved predecessors'
/// outputs, or from `request.inputs` directly for a graph entry point
/// or the designated `start_from_node`.
fn resolve_input(
    expressions: &ExpressionEngine,
    workflow: &WorkflowDefinition,
    state: &Mutex<ExecutionState>,
    node: &NodeDefinition,
    request: &ExecuteRequest,
) -> Value {
    if Some(node.id) == request.start_from_node {
        return request.inputs.clone();
    }

    let predecessors: Vec<_> = workflow.incoming(node.id).collect();
    if predecessors.is_empty() {
        return request.inputs.clone();
    }

    let mut accumulator = InputAccumulator::new();
    {
        let guard = state.lock();
        for connection in &predecessors {
            let Some(output) = guard.node_state(connection.from_node).and_then(|ns| ns.current_output.as_ref()).and_then(NodeOutput::as_value) else {
                continue;
            };
            let slot = extract_output_slot(output, &connection.output_key);
            let converted = apply_conversion(expressions, &connection.conversion_function, slot, connection.from_node);
            accumulator.merge(&connection.output_key, converted);
        }
    }

    if accumulator.is_empty() { Value::Object(serde_json::Map::new()) } else { accumulator.into_value() }
}

/// Mark the nodes reachable only through `node`'s non-chosen outgoing
/// branches as `skipped`, leaving anything also reachable through a
/// chosen branch untouched.
async fn propagate_branch_skips(
    workflow: &WorkflowDefinition,
    state: &Mutex<ExecutionState>,
    graph: &DependencyGraph,
    telemetry: &Arc<dyn TelemetryService>,
    execution_id: ExecutionId,
    node: &NodeDefinition,
    taken: &[String],
) {
    let mut dead_roots = Vec::new();
    let mut alive_roots = Vec::new();
    for connection in workflow.outgoing(node.id) {
        if taken.iter().any(|key| key == &connection.output_key) {
            alive_roots.push(connection.to_node);
        } else {
            dead_roots.push(connection.to_node);
        }
    }
    if dead_roots.is_empty() {
        return;
    }

    let mut dead: HashSet<NodeId> = HashSet::new();
    for root in dead_roots {
        dead.insert(root);
        dead.extend(graph.reachable_from(root));
    }
    let mut alive: HashSet<NodeId> = HashSet::new();
    for root in alive_roots {
        alive.insert(root);
        alive.extend(graph.reachable_from(root));
    }

    for &id in dead.difference(&alive) {
        if mark_skipped(state, id) {
            telemetry
                .event_bus()
                .emit(ExecutionEventBuilder::new(ExecutionEventType::NodeSkipped, execution_id).node(id))
                .await;
        }
    }
}

/// Run one node to completion: attempt loop with per-attempt timeout and
/// configured backoff, then apply the node's error policy on exhausted
/// failure.
#[allow(clippy::too_many_arguments)]
async fn run_node(
    runtime: &Arc<ActionRuntime>,
    expressions: &Arc<ExpressionEngine>,
    telemetry: &Arc<dyn TelemetryService>,
    workflow: &Arc<WorkflowDefinition>,
    graph: &Arc<DependencyGraph>,
    state: &Arc<Mutex<ExecutionState>>,
    node: &NodeDefinition,
    input: Value,
    execution_id: ExecutionId,
    user_id: UserId,
    cancel_token: &CancellationToken,
    total_retries: &Arc<AtomicU32>,
    budget: &ExecutionBudget,
) -> Result<NodeRunOutcome, EngineError> {
    {
        let mut guard = state.lock();
        let Some(ns) = guard.node_states.get_mut(&node.id) else { return Ok(NodeRunOutcome::Continued) };
        if ns.status != NodeStatus::Pending {
            return Ok(NodeRunOutcome::Continued);
        }
        ns.transition_to(NodeStatus::Running)?;
    }
    telemetry
        .event_bus()
        .emit(ExecutionEventBuilder::new(ExecutionEventType::NodeRunning, execution_id).node(node.id))
        .await;

    let node_timeout = Duration::from_secs(node.timeout_secs.unwrap_or(workflow.config.default_node_timeout_secs));
    let identity = DispatchIdentity { execution_id, node_id: node.id, user_id };
    let max_tries = node.retry_policy.max_tries.max(1);

    let mut succeeded: Option<DispatchOutcome> = None;
    let mut last_error: Option<NebulaError> = None;

    for attempt in 0..max_tries {
        if cancel_token.is_cancelled() {
            last_error = Some(NebulaError::canceled("execution cancelled"));
            break;
        }

        let idempotency_key = IdempotencyKey::generate(execution_id, node.id, attempt);
        let mut node_attempt = NodeAttempt::new(attempt, idempotency_key);

        let attempt_result = tokio::time::timeout(node_timeout, dispatch_node(runtime, expressions, workflow, node, input.clone(), &identity)).await;

        let outcome = match attempt_result {
            Ok(Ok(outcome)) => {
                let bytes = output_bytes(&materialize(&outcome.output));
                node_attempt.complete_success(outcome.output.clone(), bytes);
                Ok(outcome)
            }
            Ok(Err(err)) => {
                node_attempt.complete_failure(err.message());
                Err(err)
            }
            Err(_elapsed) => {
                let err = NebulaError::timeout(format!("node `{}` exceeded its {:?} timeout", node.id, node_timeout));
                node_attempt.complete_failure(err.message());
                Err(err)
            }
        };

        if let Some(ns) = state.lock().node_states.get_mut(&node.id) {
            ns.attempts.push(node_attempt);
        }

        match outcome {
            Ok(outcome) => {
                succeeded = Some(outcome);
                last_error = None;
                break;
            }
            Err(err) => {
                last_error = Some(err);
                let is_last_attempt = attempt + 1 == max_tries;
                if !is_last_attempt {
                    let seen = total_retries.fetch_add(1, Ordering::SeqCst) + 1;
                    if seen > budget.max_total_retries {
                        break;
                    }
                    if node.retry_policy.wait_between_tries_secs > 0 {
                        tokio::time::sleep(Duration::from_secs(node.retry_policy.wait_between_tries_secs)).await;
                    }
                }
            }
        }
    }

    if let Some(outcome) = succeeded {
        let value = materialize(&outcome.output);
        let bytes = output_bytes(&value);
        {
            let mut guard = state.lock();
            guard.total_output_bytes += bytes;
            if let Some(ns) = guard.node_states.get_mut(&node.id) {
                ns.current_output = Some(NodeOutput::inline(value, NodeStatus::Success, bytes));
                ns.transition_to(NodeStatus::Success)?;
            }
        }
        telemetry
            .event_bus()
            .emit(ExecutionEventBuilder::new(ExecutionEventType::NodeSuccess, execution_id).node(node.id).status("success"))
            .await;
        telemetry.metrics().counter(nebula_metrics::names::NODES_SUCCEEDED_TOTAL).inc();

        if let Some(taken) = &outcome.taken_branches {
            propagate_branch_skips(workflow, state, graph, telemetry, execution_id, node, taken).await;
        }

        if outcome.suspended {
            state.lock().transition_status(ExecutionStatus::Waiting)?;
            telemetry
                .event_bus()
                .emit(ExecutionEventBuilder::new(ExecutionEventType::Waiting, execution_id).node(node.id))
                .await;
            return Ok(NodeRunOutcome::Waiting);
        }
        return Ok(NodeRunOutcome::Continued);
    }

    let error = last_error.unwrap_or_else(|| NebulaError::internal("node exhausted retries with no recorded error"));
    match node.error_policy {
        ErrorPolicy::Stop => {
            let mut guard = state.lock();
            if let Some(ns) = guard.node_states.get_mut(&node.id) {
                ns.error_message = Some(error.message().to_string());
                ns.transition_to(NodeStatus::Error)?;
            }
            drop(guard);
            telemetry
                .event_bus()
                .emit(ExecutionEventBuilder::new(ExecutionEventType::NodeError, execution_id).node(node.id).status("error").data(serde_json::json!({ "message": error.message() })))
                .await;
            telemetry.metrics().counter(nebula_metrics::names::NODES_FAILED_TOTAL).inc();
            Ok(NodeRunOutcome::Stopped(node.id, error.message().to_string()))
        }
        ErrorPolicy::ContinueRegular => {
            {
                let mut guard = state.lock();
                if let Some(ns) = guard.node_states.get_mut(&node.id) {
                    ns.current_output = Some(NodeOutput::inline(continue_regular_payload(), NodeStatus::Skipped, 0));
                    ns.transition_to(NodeStatus::Skipped)?;
                }
            }
            telemetry
                .event_bus()
                .emit(ExecutionEventBuilder::new(ExecutionEventType::NodeSkipped, execution_id).node(node.id))
                .await;
            // `continue_regular` lets traversal proceed past this node, but
            // per spec any node error still fails the execution overall.
            Ok(NodeRunOutcome::ContinuedWithError(error.message().to_string()))
        }
        ErrorPolicy::ContinueError => {
            let message = error.message().to_string();
            {
                let mut guard = state.lock();
                if let Some(ns) = guard.node_states.get_mut(&node.id) {
                    ns.error_message = Some(message.clone());
                    ns.current_output = Some(NodeOutput::inline(continue_error_payload(&message), NodeStatus::Error, 0));
                    ns.transition_to(NodeStatus::Error)?;
                }
            }
            telemetry
                .event_bus()
                .emit(ExecutionEventBuilder::new(ExecutionEventType::NodeError, execution_id).node(node.id).status("error").data(serde_json::json!({ "message": message })))
                .await;
            telemetry.metrics().counter(nebula_metrics::names::NODES_FAILED_TOTAL).inc();
            Ok(NodeRunOutcome::ContinuedWithError(message))
        }
    }
}
