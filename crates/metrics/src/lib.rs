//! Unified metric naming, shared by every crate that instruments the
//! workflow engine, plus an optional Prometheus export adapter over
//! [`nebula_telemetry`]'s in-memory registry.

pub mod names;

#[cfg(feature = "prometheus")]
pub mod export;
