//! Process-wide shared state: the engine, the credential/OAuth2 stack, and
//! the in-memory workflow and execution stores.
//!
//! Persistence here is deliberately a `DashMap`, not a database — this
//! gateway exists to exercise the engine end-to-end, not to be a durable
//! workflow store. A real deployment would swap [`WorkflowStore`] and
//! [`ExecutionStore`] for a crate backed by a real database without
//! touching the handlers built on top of them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use nebula_action::adapter::generic_http::GenericHttpAdapter;
use nebula_action::adapter::github::GitHubAdapter;
use nebula_action::adapter::google_calendar::GoogleCalendarAdapter;
use nebula_action::adapter::slack::SlackAdapter;
use nebula_action::budget::DataPassingPolicy;
use nebula_action::http::client::HttpClient;
use nebula_action::registry::ActionRegistry;
use nebula_core::id::{ExecutionId, UserId, WorkflowId};
use nebula_core::types::ProviderId;
use nebula_credential::oauth2::flow::OAuth2Flow;
use nebula_credential::oauth2::http::HttpOAuth2Client;
use nebula_credential::oauth2::provider::ProviderOAuth2Config;
use nebula_credential::oauth2::state::OAuth2StateStore;
use nebula_credential::store::{CredentialStore, InMemoryCredentialStore};
use nebula_credential_builtin::ProviderRegistry;
use nebula_engine::{EngineConfig, EngineError, ExecutionResult, WorkflowEngine};
use nebula_error::{ErrorKind, NebulaError};
use nebula_expression::ExpressionEngine;
use nebula_resilience::retry::RetryPolicy;
use nebula_resource::limiter::ConcurrencyLimiter;
use nebula_runtime::adapter_registry::ToolAdapterRegistry;
use nebula_runtime::credential_provider::StoreCredentialProvider;
use nebula_runtime::runtime::ActionRuntime;
use nebula_telemetry::service::{NoopTelemetry, TelemetryService};
use nebula_workflow::WorkflowDefinition;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::config::ApiConfig;

/// One past execution's outcome, kept for `GET /v1/executions/{id}` and
/// `GET /v1/workflows/{id}/history` after the run has finished.
#[derive(Debug, Clone)]
pub struct ExecutionRecord {
    pub execution_id: ExecutionId,
    pub workflow_id: WorkflowId,
    pub owner_id: UserId,
    pub result: Result<ExecutionResult, String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// In-memory `WorkflowId -> WorkflowDefinition` table.
#[derive(Debug, Default)]
pub struct WorkflowStore {
    rows: DashMap<WorkflowId, WorkflowDefinition>,
}

impl WorkflowStore {
    pub fn insert(&self, workflow: WorkflowDefinition) {
        self.rows.insert(workflow.id, workflow);
    }

    pub fn get(&self, id: WorkflowId) -> Option<WorkflowDefinition> {
        self.rows.get(&id).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, id: WorkflowId) -> Option<WorkflowDefinition> {
        self.rows.remove(&id).map(|(_, workflow)| workflow)
    }

    pub fn list_for_owner(&self, owner_id: UserId) -> Vec<WorkflowDefinition> {
        self.rows
            .iter()
            .filter(|entry| entry.value().owner_id == owner_id)
            .map(|entry| entry.value().clone())
            .collect()
    }
}

/// In-memory `ExecutionId -> ExecutionRecord` table, plus a secondary index
/// from workflow to its executions for the history endpoint.
#[derive(Debug, Default)]
pub struct ExecutionStore {
    records: DashMap<ExecutionId, ExecutionRecord>,
    by_workflow: DashMap<WorkflowId, Vec<ExecutionId>>,
}

impl ExecutionStore {
    pub fn insert(&self, record: ExecutionRecord) {
        self.by_workflow
            .entry(record.workflow_id)
            .or_default()
            .push(record.execution_id);
        self.records.insert(record.execution_id, record);
    }

    pub fn get(&self, id: ExecutionId) -> Option<ExecutionRecord> {
        self.records.get(&id).map(|entry| entry.value().clone())
    }

    pub fn history_for_workflow(&self, workflow_id: WorkflowId) -> Vec<ExecutionRecord> {
        let Some(ids) = self.by_workflow.get(&workflow_id) else {
            return Vec::new();
        };
        ids.iter().filter_map(|id| self.get(*id)).collect()
    }
}

/// A spawned `execute_workflow` task the gateway can still cancel, plus
/// the context needed to record its outcome once it finishes.
pub struct RunningExecution {
    pub handle: JoinHandle<Result<ExecutionResult, EngineError>>,
    pub workflow_id: WorkflowId,
    pub owner_id: UserId,
}

/// Everything a handler needs, assembled once at startup and shared behind
/// `Arc<AppState>` via axum's `State` extractor.
pub struct AppState {
    pub engine: Arc<WorkflowEngine>,
    pub telemetry: Arc<dyn TelemetryService>,
    pub credentials: Arc<dyn CredentialStore>,
    pub oauth: Arc<OAuth2Flow>,
    /// Executions currently running. `nebula-engine` has no cancellation
    /// registry of its own — the gateway drives cancellation by aborting
    /// the tokio task `execute_workflow` was spawned on.
    pub running: RwLock<HashMap<ExecutionId, RunningExecution>>,
    pub workflows: WorkflowStore,
    pub executions: ExecutionStore,
    pub config: ApiConfig,
}

impl AppState {
    /// Build every component from configuration: the tool adapter registry,
    /// the action runtime, the workflow engine, and the OAuth2 subsystem.
    pub fn build(config: ApiConfig) -> Result<Arc<Self>, NebulaError> {
        let telemetry: Arc<dyn TelemetryService> = NoopTelemetry::arc(1024);

        let credentials: Arc<dyn CredentialStore> = Arc::new(
            InMemoryCredentialStore::new(config.credential_encryption_secret.expose())
                .map_err(|err| NebulaError::new(ErrorKind::Internal, err.to_string()))?,
        );

        let retry = RetryPolicy {
            max_attempts: config.retry_max_attempts,
            backoff: config
                .retry_backoff_seconds
                .iter()
                .map(|secs| Duration::from_secs(*secs))
                .collect(),
            ..RetryPolicy::default()
        };

        let provider_registry = ProviderRegistry::from_raw(config.providers.clone())
            .map_err(|err| NebulaError::new(ErrorKind::InvalidInput, err.to_string()))?;
        let mut oauth_providers: HashMap<ProviderId, ProviderOAuth2Config> = HashMap::new();
        for provider in provider_registry.configured_providers() {
            let cfg = provider_registry
                .get(provider)
                .map_err(|err| NebulaError::new(ErrorKind::InvalidInput, err.to_string()))?;
            oauth_providers.insert(provider.clone(), cfg.clone());
        }

        let http_oauth = Arc::new(HttpOAuth2Client::new(oauth_providers.clone()));

        let oauth_state_store = Arc::new(OAuth2StateStore::new(config.oauth2_state_ttl));
        let oauth = Arc::new(OAuth2Flow::new(
            oauth_state_store,
            credentials.clone(),
            http_oauth.clone(),
            oauth_providers,
        ));

        let credential_provider = Arc::new(StoreCredentialProvider::new(
            credentials.clone(),
            http_oauth,
        ));

        let adapters = Arc::new(ToolAdapterRegistry::new());
        let http_client = HttpClient::with_connect_timeout(config.http_connect_timeout)
            .map_err(|err| NebulaError::new(ErrorKind::Internal, err.to_string()))?;
        adapters.register(Arc::new(GoogleCalendarAdapter::new(
            http_client.clone(),
            retry.clone(),
            credential_provider.clone(),
        )));
        adapters.register(Arc::new(GitHubAdapter::new(
            http_client.clone(),
            retry.clone(),
            credential_provider.clone(),
        )));
        adapters.register(Arc::new(SlackAdapter::new(
            http_client.clone(),
            retry.clone(),
            credential_provider.clone(),
        )));
        adapters.register(Arc::new(GenericHttpAdapter::new(
            http_client,
            retry,
            credential_provider,
            ProviderId::from("generic_http"),
        )));

        let limiter = Arc::new(ConcurrencyLimiter::new(config.per_user_adapter_concurrency));
        let runtime = Arc::new(ActionRuntime::new(
            Arc::new(ActionRegistry::new()),
            adapters,
            limiter,
            telemetry.clone(),
            DataPassingPolicy::default(),
        ));

        let engine_config = EngineConfig {
            max_concurrent_executions: config.max_concurrent_executions,
            max_concurrent_node_tasks: config.max_concurrent_node_tasks,
            default_node_timeout: Duration::from_secs(config.default_node_timeout_seconds),
            ..EngineConfig::default()
        };
        let engine = Arc::new(WorkflowEngine::new(
            runtime,
            Arc::new(ExpressionEngine::new()),
            telemetry.clone(),
            engine_config,
        ));

        Ok(Arc::new(Self {
            engine,
            telemetry,
            credentials,
            oauth,
            running: RwLock::new(HashMap::new()),
            workflows: WorkflowStore::default(),
            executions: ExecutionStore::default(),
            config,
        }))
    }
}
