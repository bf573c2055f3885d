#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Nebula Log
//!
//! Structured logging setup built on [`tracing`]. Every other crate logs
//! through the `tracing` macros re-exported here rather than depending on
//! `tracing` directly, so the subscriber setup (format, filtering) stays
//! centralized.

mod builder;
mod config;
mod error;

pub use builder::{LoggerBuilder, LoggerGuard, init};
pub use config::{Config, Format};
pub use error::{LogError, LogResult};

pub use tracing::{debug, error, info, instrument, trace, warn};
