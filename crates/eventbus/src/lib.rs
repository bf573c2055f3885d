#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Nebula Event Bus
//!
//! A generic, bounded, backpressured broadcast primitive: one publisher,
//! many subscribers, each subscriber's own bounded channel. Unlike
//! [`tokio::sync::broadcast`], a slow subscriber is never dropped from
//! behind a ring buffer — the publisher backpressures instead, which is
//! the semantics the workflow engine's per-execution event stream needs
//! (a slow SSE consumer must never cause the engine to lose an event).
//!
//! This crate knows nothing about workflow execution; `nebula-telemetry`
//! layers the domain-specific `ExecutionEvent` type and per-execution
//! sequence numbers on top of [`EventBus`].

mod bus;

pub use bus::EventBus;
