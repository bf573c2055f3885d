//! The telemetry facade handed to the engine and adapters.

use std::sync::Arc;

use crate::event::EventBus;
use crate::metrics::MetricsRegistry;

/// Accessor for an execution's event bus and the process-wide metrics
/// registry. The engine, adapters, and gateway all hold one of these
/// rather than wiring `EventBus`/`MetricsRegistry` through individually.
pub trait TelemetryService: Send + Sync {
    /// The event bus events are emitted to and subscribed from.
    fn event_bus(&self) -> &EventBus;
    /// The process-wide metrics registry.
    fn metrics(&self) -> &MetricsRegistry;
}

/// A [`TelemetryService`] with a real in-process event bus and metrics
/// registry but no external collector wired up — "noop" refers to the
/// absence of an APM/metrics-exporter sink, not to the bus or registry
/// themselves, both of which are fully functional.
pub struct NoopTelemetry {
    event_bus: EventBus,
    metrics: MetricsRegistry,
}

impl NoopTelemetry {
    /// Create a telemetry service whose event bus holds up to `capacity`
    /// unconsumed events per subscriber before backpressuring.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { event_bus: EventBus::new(capacity), metrics: MetricsRegistry::new() }
    }

    /// Wrap in an `Arc<dyn TelemetryService>` for sharing across the
    /// engine, adapters, and gateway.
    #[must_use]
    pub fn arc(capacity: usize) -> Arc<dyn TelemetryService> {
        Arc::new(Self::new(capacity))
    }
}

impl Default for NoopTelemetry {
    fn default() -> Self {
        Self::new(128)
    }
}

impl TelemetryService for NoopTelemetry {
    fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use nebula_core::ExecutionId;
    use tokio_stream::StreamExt;

    use super::*;
    use crate::event::{ExecutionEventBuilder, ExecutionEventType};

    #[tokio::test]
    async fn emits_through_the_service_s_event_bus() {
        let telemetry = NoopTelemetry::new(8);
        let execution_id = ExecutionId::v4();
        let mut sub = telemetry.event_bus().subscribe();

        telemetry.event_bus().emit(ExecutionEventBuilder::new(ExecutionEventType::ExecutionStarted, execution_id)).await;

        assert_eq!(sub.next().await.unwrap().execution_id, execution_id);
    }

    #[test]
    fn metrics_are_shared_across_calls() {
        let telemetry = NoopTelemetry::new(8);
        telemetry.metrics().counter("runs").inc();
        assert_eq!(telemetry.metrics().counter("runs").get(), 1);
    }

    #[test]
    fn arc_constructor_produces_a_usable_trait_object() {
        let telemetry = NoopTelemetry::arc(8);
        telemetry.metrics().counter("x").inc();
        assert_eq!(telemetry.metrics().counter("x").get(), 1);
    }
}
