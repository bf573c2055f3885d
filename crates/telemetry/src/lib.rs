#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Nebula Telemetry
//!
//! The per-execution event stream the gateway's SSE endpoint subscribes
//! to, plus a process-wide metrics registry.
//!
//! Event fan-out is backpressured, not drop-on-lag: a slow gateway
//! subscriber stalls the publishing execution rather than missing
//! events, per the engine's event-delivery contract.

pub mod event;
pub mod metrics;
pub mod service;

pub use event::{EventBus, ExecutionEvent, ExecutionEventBuilder, ExecutionEventType};
pub use metrics::{Counter, Gauge, Histogram, MetricsRegistry, NoopMetricsRegistry};
pub use service::{NoopTelemetry, TelemetryService};
