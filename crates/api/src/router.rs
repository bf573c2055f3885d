//! Route table and shared middleware stack.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::state::AppState;
use crate::{events, executions, oauth, workflows};

const MAX_REQUEST_BODY_BYTES: usize = 10 * 1024 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[must_use]
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/workflows", post(workflows::create_workflow).get(workflows::list_workflows))
        .route(
            "/v1/workflows/:id",
            get(workflows::get_workflow).put(workflows::update_workflow).delete(workflows::delete_workflow),
        )
        .route("/v1/workflows/:id/execute", post(executions::execute_workflow))
        .route("/v1/workflows/:id/history", get(executions::workflow_history))
        .route("/v1/executions/:id", get(executions::get_execution))
        .route("/v1/executions/:id/cancel", post(executions::cancel_execution))
        .route("/v1/executions/:id/events", get(events::execution_events))
        .route("/v1/oauth2/authorize", get(oauth::begin_authorization))
        .route("/v1/oauth2/callback/:provider", get(oauth::oauth_callback))
        .route("/v1/credentials", get(oauth::list_credentials))
        .route("/v1/credentials/:provider/:integration_id", delete(oauth::revoke_credential))
        .route("/healthz", get(health))
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
