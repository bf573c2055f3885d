//! The workflow execution event stream (spec §6: "Gateway → Engine
//! (events)").
//!
//! Events are projections for the SSE gateway, not the source of truth
//! — the `workflow_executions` row (owned by `nebula-engine`) is.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use nebula_core::{ExecutionId, NodeId};
use nebula_eventbus::EventBus as RawEventBus;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_stream::wrappers::ReceiverStream;

/// One of the eleven event kinds the gateway's SSE stream carries
/// (spec §6's literal enumeration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionEventType {
    /// A workflow execution has begun.
    ExecutionStarted,
    /// A node has started running.
    NodeRunning,
    /// A node completed successfully.
    NodeSuccess,
    /// A node failed.
    NodeError,
    /// A node was skipped (e.g. the non-chosen branch of an `if`).
    NodeSkipped,
    /// The execution completed successfully.
    ExecutionCompleted,
    /// The execution failed.
    ExecutionFailed,
    /// The execution was canceled.
    ExecutionCanceled,
    /// The execution is suspended, waiting on a timer or signal.
    Waiting,
    /// A suspended execution resumed.
    Resumed,
    /// A free-form log line attached to the execution.
    Log,
}

/// One event in a per-execution, totally-ordered stream (spec §5:
/// "per-execution event stream is totally ordered by sequence number").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionEvent {
    /// The event's kind.
    #[serde(rename = "type")]
    pub event_type: ExecutionEventType,
    /// The execution this event belongs to.
    pub execution_id: ExecutionId,
    /// Monotonically increasing per-execution sequence number, starting
    /// at 1. Assigned by [`EventBus::emit`]; never supplied by the
    /// caller.
    pub sequence: u64,
    /// The node this event concerns, for node-scoped event types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    /// A short status string (e.g. a node's terminal status).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Event-specific payload (node output, error details, log line).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Wall-clock time the event was emitted.
    pub timestamp: DateTime<Utc>,
}

/// A not-yet-sequenced event, as built by the engine before it is
/// handed to [`EventBus::emit`].
#[derive(Debug, Clone)]
pub struct ExecutionEventBuilder {
    event_type: ExecutionEventType,
    execution_id: ExecutionId,
    node_id: Option<NodeId>,
    status: Option<String>,
    data: Option<Value>,
}

impl ExecutionEventBuilder {
    /// Start building an event of `event_type` for `execution_id`.
    pub fn new(event_type: ExecutionEventType, execution_id: ExecutionId) -> Self {
        Self { event_type, execution_id, node_id: None, status: None, data: None }
    }

    /// Attach the node this event concerns.
    pub fn node(mut self, node_id: NodeId) -> Self {
        self.node_id = Some(node_id);
        self
    }

    /// Attach a status string.
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Attach a JSON payload.
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Per-execution sequence numbering and SSE fan-out over
/// [`nebula_eventbus::EventBus`].
///
/// Wraps the generic, backpressured bus with the one piece of
/// execution-specific bookkeeping the gateway contract needs: each
/// execution's events are numbered from 1, independent of how many
/// other executions are emitting concurrently.
pub struct EventBus {
    bus: RawEventBus<ExecutionEvent>,
    sequences: DashMap<ExecutionId, AtomicU64>,
}

impl EventBus {
    /// Create a bus whose subscriber channels hold up to `capacity`
    /// unconsumed events before backpressuring the publisher.
    pub fn new(capacity: usize) -> Self {
        Self { bus: RawEventBus::new(capacity), sequences: DashMap::new() }
    }

    /// Stamp `event` with the next sequence number for its execution and
    /// fan it out to every subscriber, waiting on slow subscribers
    /// rather than dropping the event.
    pub async fn emit(&self, event: ExecutionEventBuilder) {
        let sequence = self.sequences.entry(event.execution_id).or_insert_with(|| AtomicU64::new(0)).fetch_add(1, Ordering::SeqCst) + 1;
        let stamped = ExecutionEvent {
            event_type: event.event_type,
            execution_id: event.execution_id,
            sequence,
            node_id: event.node_id,
            status: event.status,
            data: event.data,
            timestamp: Utc::now(),
        };
        self.bus.publish(stamped).await;
    }

    /// Subscribe to the full event stream (all executions).
    ///
    /// `nebula-api`'s SSE handler is expected to filter by
    /// `execution_id` itself rather than this bus maintaining a
    /// per-execution topic set, since in practice exactly one gateway
    /// subscribes per execution and teardown (dropping the stream)
    /// already yields an efficient per-execution filter.
    pub fn subscribe(&self) -> ReceiverStream<ExecutionEvent> {
        self.bus.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count()
    }

    /// Forget the sequence counter for a completed execution. Call this
    /// once an execution reaches a terminal state to bound memory use
    /// for long-running engines.
    pub fn forget(&self, execution_id: ExecutionId) {
        self.sequences.remove(&execution_id);
    }
}

#[cfg(test)]
mod tests {
    use tokio_stream::StreamExt;

    use super::*;

    #[tokio::test]
    async fn sequence_numbers_start_at_one_and_increment() {
        let bus = EventBus::new(8);
        let execution_id = ExecutionId::v4();
        let mut sub = bus.subscribe();

        bus.emit(ExecutionEventBuilder::new(ExecutionEventType::ExecutionStarted, execution_id)).await;
        bus.emit(ExecutionEventBuilder::new(ExecutionEventType::ExecutionCompleted, execution_id)).await;

        assert_eq!(sub.next().await.unwrap().sequence, 1);
        assert_eq!(sub.next().await.unwrap().sequence, 2);
    }

    #[tokio::test]
    async fn distinct_executions_have_independent_sequences() {
        let bus = EventBus::new(8);
        let a = ExecutionId::v4();
        let b = ExecutionId::v4();
        let mut sub = bus.subscribe();

        bus.emit(ExecutionEventBuilder::new(ExecutionEventType::ExecutionStarted, a)).await;
        bus.emit(ExecutionEventBuilder::new(ExecutionEventType::ExecutionStarted, b)).await;

        assert_eq!(sub.next().await.unwrap().sequence, 1);
        assert_eq!(sub.next().await.unwrap().sequence, 1);
    }

    #[tokio::test]
    async fn forget_resets_the_sequence_counter() {
        let bus = EventBus::new(8);
        let execution_id = ExecutionId::v4();
        let mut sub = bus.subscribe();

        bus.emit(ExecutionEventBuilder::new(ExecutionEventType::ExecutionStarted, execution_id)).await;
        bus.forget(execution_id);
        bus.emit(ExecutionEventBuilder::new(ExecutionEventType::ExecutionStarted, execution_id)).await;

        assert_eq!(sub.next().await.unwrap().sequence, 1);
        assert_eq!(sub.next().await.unwrap().sequence, 1);
    }

    #[test]
    fn event_type_serializes_to_the_gateway_contract_s_snake_case() {
        let json = serde_json::to_string(&ExecutionEventType::NodeSkipped).unwrap();
        assert_eq!(json, "\"node_skipped\"");
    }
}
