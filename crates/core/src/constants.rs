//! Default values for the closed configuration set (spec §6).
//!
//! Centralized here so every crate that needs a default (rather than a
//! full [`EngineConfig`](../../engine/src/config.rs)) agrees on the same
//! numbers without depending on `nebula-engine`.

/// Default OAuth2 state record TTL, in seconds.
pub const DEFAULT_OAUTH2_STATE_TTL_SECONDS: u64 = 1800;
/// Default workflow-level execution timeout, in seconds.
pub const DEFAULT_WORKFLOW_TIMEOUT_SECONDS: u64 = 300;
/// Default per-node execution timeout, in seconds.
pub const DEFAULT_NODE_TIMEOUT_SECONDS: u64 = 30;
/// Default cap on concurrent executions process-wide.
pub const DEFAULT_MAX_CONCURRENT_EXECUTIONS: usize = 100;
/// Default cap on concurrent node tasks process-wide.
pub const DEFAULT_MAX_CONCURRENT_NODE_TASKS: usize = 1000;
/// Default cap on in-flight adapter calls per (user, provider).
pub const DEFAULT_PER_USER_ADAPTER_CONCURRENCY: usize = 10;
/// Default maximum retry attempts for a transient adapter error.
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;
/// Default exponential backoff schedule, in seconds.
pub const DEFAULT_RETRY_BACKOFF_SECONDS: [u64; 3] = [2, 4, 8];
/// Default HTTP connect timeout, in seconds.
pub const DEFAULT_HTTP_CONNECT_TIMEOUT_SECONDS: u64 = 5;
/// Default HTTP read timeout, in seconds.
pub const DEFAULT_HTTP_READ_TIMEOUT_SECONDS: u64 = 30;
/// Default cap on a single HTTP response body, in bytes (10 MiB).
pub const DEFAULT_HTTP_MAX_RESPONSE_BYTES: u64 = 10 * 1024 * 1024;
/// Default cancellation grace period, in seconds.
pub const DEFAULT_CANCELLATION_GRACE_SECONDS: u64 = 2;
/// Default output key used when a connection does not specify one.
pub const DEFAULT_OUTPUT_KEY: &str = "result";
