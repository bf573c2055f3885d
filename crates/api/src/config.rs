//! The gateway's closed configuration set.
//!
//! Every option here corresponds to one of the named settings the
//! external interface contract recognizes. Nothing here is an open
//! extension point — a new setting means a new field, not a free-form
//! map.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use nebula_core::constants::{
    DEFAULT_HTTP_CONNECT_TIMEOUT_SECONDS, DEFAULT_HTTP_MAX_RESPONSE_BYTES,
    DEFAULT_HTTP_READ_TIMEOUT_SECONDS, DEFAULT_MAX_CONCURRENT_EXECUTIONS,
    DEFAULT_MAX_CONCURRENT_NODE_TASKS, DEFAULT_NODE_TIMEOUT_SECONDS,
    DEFAULT_OAUTH2_STATE_TTL_SECONDS, DEFAULT_PER_USER_ADAPTER_CONCURRENCY,
    DEFAULT_RETRY_BACKOFF_SECONDS, DEFAULT_RETRY_MAX_ATTEMPTS, DEFAULT_WORKFLOW_TIMEOUT_SECONDS,
};
use nebula_credential_builtin::RawProviderConfig;
use nebula_schema::SecretString;

/// Process-wide gateway configuration, assembled once at startup from
/// environment/config-file values and held for the life of the process.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// KDF input for the credential store's encryption key.
    pub credential_encryption_secret: SecretString,
    /// How long an OAuth2 CSRF state token stays valid.
    pub oauth2_state_ttl: Duration,
    /// Upper bound on a workflow's own `config.timeout_secs`.
    pub max_workflow_timeout_seconds: u64,
    /// Fallback per-node timeout.
    pub default_node_timeout_seconds: u64,
    /// Cap on executions running concurrently across the engine.
    pub max_concurrent_executions: usize,
    /// Cap on node tasks running concurrently across the engine.
    pub max_concurrent_node_tasks: usize,
    /// Cap on in-flight adapter calls per `(user, provider)`.
    pub per_user_adapter_concurrency: usize,
    /// Maximum attempts for a transient adapter error.
    pub retry_max_attempts: u32,
    /// Exponential backoff schedule, in seconds.
    pub retry_backoff_seconds: Vec<u64>,
    /// HTTP client connect timeout.
    pub http_connect_timeout: Duration,
    /// HTTP client read timeout.
    pub http_read_timeout: Duration,
    /// Cap on a single HTTP adapter response body, in bytes.
    pub http_max_response_bytes: u64,
    /// `tracing` env-filter directive string.
    pub log_level: String,
    /// Per-provider OAuth2 endpoint configuration (`provider_*_client_id/
    /// secret/authorize_url/token_url/default_scopes`), keyed by the
    /// provider's canonical name.
    pub providers: HashMap<String, RawProviderConfig>,
}

impl ApiConfig {
    /// Defaults for every option except the two that have no safe
    /// default: the bind address and the encryption secret.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, credential_encryption_secret: SecretString) -> Self {
        Self {
            bind_addr,
            credential_encryption_secret,
            oauth2_state_ttl: Duration::from_secs(DEFAULT_OAUTH2_STATE_TTL_SECONDS),
            max_workflow_timeout_seconds: DEFAULT_WORKFLOW_TIMEOUT_SECONDS,
            default_node_timeout_seconds: DEFAULT_NODE_TIMEOUT_SECONDS,
            max_concurrent_executions: DEFAULT_MAX_CONCURRENT_EXECUTIONS,
            max_concurrent_node_tasks: DEFAULT_MAX_CONCURRENT_NODE_TASKS,
            per_user_adapter_concurrency: DEFAULT_PER_USER_ADAPTER_CONCURRENCY,
            retry_max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            retry_backoff_seconds: DEFAULT_RETRY_BACKOFF_SECONDS.to_vec(),
            http_connect_timeout: Duration::from_secs(DEFAULT_HTTP_CONNECT_TIMEOUT_SECONDS),
            http_read_timeout: Duration::from_secs(DEFAULT_HTTP_READ_TIMEOUT_SECONDS),
            http_max_response_bytes: DEFAULT_HTTP_MAX_RESPONSE_BYTES,
            log_level: "info".to_string(),
            providers: HashMap::new(),
        }
    }

    /// Register a provider's OAuth2 endpoint configuration.
    #[must_use]
    pub fn with_provider(mut self, name: impl Into<String>, config: RawProviderConfig) -> Self {
        self.providers.insert(name.into(), config);
        self
    }
}
