//! Execute a workflow, check on it, cancel it, and look up its history.
//!
//! A run is spawned on its own tokio task immediately so the caller gets
//! `execution_id` back before the workflow finishes; the task is tracked
//! in [`AppState::running`] so `cancel` can abort it, and its outcome is
//! recorded into [`AppState::executions`] when it completes either way.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use nebula_core::{ExecutionId, NodeId, WorkflowId};
use nebula_engine::ExecuteRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::state::{AppState, ExecutionRecord, RunningExecution};
use crate::user::AuthenticatedUser;
use crate::workflows::owned_or_not_found;

#[derive(Debug, Deserialize)]
pub struct ExecuteWorkflowRequest {
    #[serde(default)]
    pub inputs: Value,
    #[serde(default)]
    pub start_from_node: Option<NodeId>,
}

#[derive(Debug, Serialize)]
pub struct ExecuteWorkflowResponse {
    pub execution_id: ExecutionId,
}

pub async fn execute_workflow(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(workflow_id): Path<WorkflowId>,
    Json(request): Json<ExecuteWorkflowRequest>,
) -> Result<Json<ExecuteWorkflowResponse>, ApiError> {
    let workflow = Arc::new(owned_or_not_found(&state, workflow_id, user_id)?);

    let execution_id = ExecutionId::v4();
    let mut engine_request = ExecuteRequest::new(request.inputs, user_id).with_execution_id(execution_id);
    if let Some(node_id) = request.start_from_node {
        engine_request = engine_request.with_start_from_node(node_id);
    }

    let engine = state.engine.clone();
    let started_at = Utc::now();
    let handle = tokio::spawn(async move { engine.execute_workflow(workflow.clone(), engine_request).await });

    {
        let mut running = state.running.write().await;
        running.insert(
            execution_id,
            RunningExecution { handle, workflow_id, owner_id: user_id },
        );
    }

    let app_state = state.clone();
    tokio::spawn(async move {
        let outcome = {
            let mut running = app_state.running.write().await;
            running.remove(&execution_id)
        };
        let Some(running) = outcome else { return };
        let joined = running.handle.await;
        let result = match joined {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(engine_error)) => Err(engine_error.to_string()),
            Err(join_error) if join_error.is_cancelled() => return,
            Err(join_error) => Err(join_error.to_string()),
        };
        app_state.executions.insert(ExecutionRecord {
            execution_id,
            workflow_id: running.workflow_id,
            owner_id: running.owner_id,
            result,
            started_at,
            finished_at: Utc::now(),
        });
    });

    Ok(Json(ExecuteWorkflowResponse { execution_id }))
}

#[derive(Debug, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ExecutionStatusResponse {
    Running,
    Completed {
        status: nebula_execution::ExecutionStatus,
        node_outputs: std::collections::HashMap<NodeId, Value>,
        duration_ms: u128,
        failed_node: Option<NodeId>,
        error: Option<String>,
    },
    Failed {
        error: String,
    },
}

pub async fn get_execution(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(execution_id): Path<ExecutionId>,
) -> Result<Json<ExecutionStatusResponse>, ApiError> {
    if let Some(record) = state.executions.get(execution_id) {
        if record.owner_id != user_id {
            return Err(not_found(execution_id));
        }
        return Ok(Json(record_to_response(&record)));
    }
    if state.running.read().await.contains_key(&execution_id) {
        return Ok(Json(ExecutionStatusResponse::Running));
    }
    Err(not_found(execution_id))
}

pub async fn cancel_execution(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(execution_id): Path<ExecutionId>,
) -> Result<(), ApiError> {
    let running = state.running.write().await.remove(&execution_id);
    let Some(running) = running else {
        if state.executions.get(execution_id).is_some() {
            return Ok(());
        }
        return Err(not_found(execution_id));
    };
    if running.owner_id != user_id {
        return Err(not_found(execution_id));
    }
    running.handle.abort();
    state.executions.insert(ExecutionRecord {
        execution_id,
        workflow_id: running.workflow_id,
        owner_id: running.owner_id,
        result: Err("cancelled by caller".to_string()),
        started_at: Utc::now(),
        finished_at: Utc::now(),
    });
    Ok(())
}

pub async fn workflow_history(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(workflow_id): Path<WorkflowId>,
) -> Result<Json<Vec<ExecutionStatusResponse>>, ApiError> {
    owned_or_not_found(&state, workflow_id, user_id)?;
    let history = state
        .executions
        .history_for_workflow(workflow_id)
        .iter()
        .map(record_to_response)
        .collect();
    Ok(Json(history))
}

fn record_to_response(record: &ExecutionRecord) -> ExecutionStatusResponse {
    match &record.result {
        Ok(result) => ExecutionStatusResponse::Completed {
            status: result.status,
            node_outputs: result.node_outputs.clone(),
            duration_ms: result.duration.as_millis(),
            failed_node: result.failed_node,
            error: result.error.clone(),
        },
        Err(error) => ExecutionStatusResponse::Failed { error: error.clone() },
    }
}

pub(crate) fn not_found(execution_id: ExecutionId) -> ApiError {
    ApiError::from(nebula_error::NebulaError::new(
        nebula_error::ErrorKind::NotFound,
        format!("execution `{execution_id}` not found"),
    ))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use nebula_core::NodeKey;
    use nebula_credential::audit::AuditContext;
    use nebula_credential::store::{CredentialStore, NewOAuth2Credential};
    use nebula_schema::SecretString;
    use nebula_workflow::{Connection, CredentialRef, NodeDefinition};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::ApiConfig;

    fn test_config() -> ApiConfig {
        ApiConfig::new("127.0.0.1:0".parse().unwrap(), SecretString::new("test-secret"))
    }

    /// A trigger wired straight into a `generic_http` external action,
    /// matching the only tool adapter the gateway can exercise without a
    /// real provider's OAuth2 setup.
    fn http_workflow(user_id: nebula_core::UserId) -> (nebula_workflow::WorkflowDefinition, nebula_core::NodeId, nebula_core::NodeId) {
        let trigger_id = nebula_core::NodeId::v4();
        let action_id = nebula_core::NodeId::v4();

        let trigger = NodeDefinition::new(trigger_id, "start", NodeKey::new("trigger", "manual"));
        let mut action = NodeDefinition::new(action_id, "call", NodeKey::new("external_action", "generic_http"));
        action.configurations.insert("operation".to_string(), json!("request"));
        action.credential = Some(CredentialRef {
            provider: "generic_http".to_string(),
            integration_id: "default".to_string(),
        });

        let now = chrono::Utc::now();
        let workflow = nebula_workflow::WorkflowDefinition {
            id: WorkflowId::v4(),
            owner_id: user_id,
            team_id: None,
            name: "http-call".to_string(),
            description: None,
            version: nebula_core::Version::new(1, 0, 0),
            nodes: vec![trigger, action],
            connections: vec![Connection::new(trigger_id, action_id)],
            variables: Default::default(),
            config: Default::default(),
            tags: vec![],
            created_at: now,
            updated_at: now,
        };
        (workflow, trigger_id, action_id)
    }

    async fn store_generic_http_credential(state: &AppState, user_id: nebula_core::UserId) {
        let key = nebula_core::CredentialKey::new(user_id, "generic_http", "default");
        let ctx = AuditContext::new(user_id);
        state
            .credentials
            .store(
                &key,
                NewOAuth2Credential {
                    access_token: SecretString::new("test-token"),
                    refresh_token: None,
                    token_type: "Bearer".to_string(),
                    expires_at: None,
                    scopes: vec![],
                },
                &ctx,
            )
            .await
            .unwrap();
    }

    async fn poll_until_settled(router: &axum::Router, user_header: &str, execution_id: ExecutionId) -> Value {
        for _ in 0..200 {
            let response = router
                .clone()
                .oneshot(
                    Request::get(format!("/v1/executions/{execution_id}"))
                        .header("x-nebula-user-id", user_header)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let parsed: Value = serde_json::from_slice(&body).unwrap();
            if parsed["state"] != "running" {
                return parsed;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("execution `{execution_id}` never settled");
    }

    #[tokio::test]
    async fn linear_workflow_completes_against_a_live_http_upstream() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&mock)
            .await;

        let state = AppState::build(test_config()).unwrap();
        let user_id = nebula_core::UserId::v4();
        store_generic_http_credential(&state, user_id).await;

        let (workflow, _trigger_id, action_id) = http_workflow(user_id);
        state.workflows.insert(workflow.clone());
        let router = crate::router::build_router(state);

        let inputs = json!({"url": mock.uri(), "method": "GET", "auth": {"mode": "bearer"}});
        let response = router
            .clone()
            .oneshot(
                Request::post(format!("/v1/workflows/{}/execute", workflow.id))
                    .header("x-nebula-user-id", user_id.to_string())
                    .header("content-type", "application/json")
                    .body(Body::from(json!({"inputs": inputs}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: Value = serde_json::from_slice(&body).unwrap();
        let execution_id: ExecutionId = serde_json::from_value(parsed["execution_id"].clone()).unwrap();

        let settled = poll_until_settled(&router, &user_id.to_string(), execution_id).await;
        assert_eq!(settled["state"], "completed");
        assert_eq!(settled["status"], "success");
        assert_eq!(settled["node_outputs"][action_id.to_string()], json!({"ok": true}));
    }

    #[tokio::test]
    async fn cancel_mid_flight_marks_the_execution_canceled() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})).set_delay(Duration::from_secs(5)))
            .mount(&mock)
            .await;

        let state = AppState::build(test_config()).unwrap();
        let user_id = nebula_core::UserId::v4();
        store_generic_http_credential(&state, user_id).await;

        let (workflow, _trigger_id, _action_id) = http_workflow(user_id);
        state.workflows.insert(workflow.clone());
        let router = crate::router::build_router(state);

        let inputs = json!({"url": mock.uri(), "method": "GET", "auth": {"mode": "bearer"}});
        let response = router
            .clone()
            .oneshot(
                Request::post(format!("/v1/workflows/{}/execute", workflow.id))
                    .header("x-nebula-user-id", user_id.to_string())
                    .header("content-type", "application/json")
                    .body(Body::from(json!({"inputs": inputs}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: Value = serde_json::from_slice(&body).unwrap();
        let execution_id: ExecutionId = serde_json::from_value(parsed["execution_id"].clone()).unwrap();

        // Give the spawned task a moment to actually start the slow call
        // before cancelling it.
        tokio::time::sleep(Duration::from_millis(20)).await;

        let cancel_response = router
            .clone()
            .oneshot(
                Request::post(format!("/v1/executions/{execution_id}/cancel"))
                    .header("x-nebula-user-id", user_id.to_string())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(cancel_response.status(), StatusCode::OK);

        let response = router
            .oneshot(
                Request::get(format!("/v1/executions/{execution_id}"))
                    .header("x-nebula-user-id", user_id.to_string())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["state"], "failed");
        assert_eq!(parsed["error"], "cancelled by caller");
    }
}
