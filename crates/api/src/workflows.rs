//! Workflow definition CRUD.
//!
//! Ownership is enforced at every read/write: a workflow not owned by
//! the caller is reported as `NotFound` rather than `Forbidden`, so a
//! caller can't distinguish "doesn't exist" from "exists, not yours".

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use nebula_core::{Version, WorkflowId};
use nebula_workflow::{Connection, NodeDefinition, WorkflowConfig, WorkflowDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;
use crate::user::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct WorkflowRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `major.minor.patch`. Defaults to `1.0.0` on create, and to the
    /// existing version on update.
    #[serde(default)]
    pub version: Option<Version>,
    pub nodes: Vec<NodeDefinition>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub variables: HashMap<String, Value>,
    #[serde(default)]
    pub config: WorkflowConfig,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct WorkflowResponse {
    #[serde(flatten)]
    pub workflow: WorkflowDefinition,
}

pub(crate) fn owned_or_not_found(
    state: &AppState,
    id: WorkflowId,
    owner: nebula_core::UserId,
) -> Result<WorkflowDefinition, ApiError> {
    let workflow = state.workflows.get(id).ok_or_else(|| {
        ApiError::from(nebula_error::NebulaError::new(
            nebula_error::ErrorKind::NotFound,
            format!("workflow `{id}` not found"),
        ))
    })?;
    if workflow.owner_id != owner {
        return Err(ApiError::from(nebula_error::NebulaError::new(
            nebula_error::ErrorKind::NotFound,
            format!("workflow `{id}` not found"),
        )));
    }
    Ok(workflow)
}

pub async fn create_workflow(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(request): Json<WorkflowRequest>,
) -> Result<Json<WorkflowResponse>, ApiError> {
    let now = Utc::now();
    let workflow = WorkflowDefinition {
        id: WorkflowId::v4(),
        owner_id: user_id,
        team_id: None,
        name: request.name,
        description: request.description,
        version: request.version.unwrap_or_else(|| Version::new(1, 0, 0)),
        nodes: request.nodes,
        connections: request.connections,
        variables: request.variables,
        config: request.config,
        tags: request.tags,
        created_at: now,
        updated_at: now,
    };
    nebula_workflow::validate_structure(&workflow)?;
    state.workflows.insert(workflow.clone());
    Ok(Json(WorkflowResponse { workflow }))
}

pub async fn get_workflow(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(id): Path<WorkflowId>,
) -> Result<Json<WorkflowResponse>, ApiError> {
    let workflow = owned_or_not_found(&state, id, user_id)?;
    Ok(Json(WorkflowResponse { workflow }))
}

pub async fn list_workflows(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Json<Vec<WorkflowResponse>> {
    let workflows = state
        .workflows
        .list_for_owner(user_id)
        .into_iter()
        .map(|workflow| WorkflowResponse { workflow })
        .collect();
    Json(workflows)
}

pub async fn update_workflow(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(id): Path<WorkflowId>,
    Json(request): Json<WorkflowRequest>,
) -> Result<Json<WorkflowResponse>, ApiError> {
    let existing = owned_or_not_found(&state, id, user_id)?;
    let workflow = WorkflowDefinition {
        id: existing.id,
        owner_id: existing.owner_id,
        team_id: existing.team_id,
        name: request.name,
        description: request.description,
        version: request.version.unwrap_or(existing.version),
        nodes: request.nodes,
        connections: request.connections,
        variables: request.variables,
        config: request.config,
        tags: request.tags,
        created_at: existing.created_at,
        updated_at: Utc::now(),
    };
    nebula_workflow::validate_structure(&workflow)?;
    state.workflows.insert(workflow.clone());
    Ok(Json(WorkflowResponse { workflow }))
}

pub async fn delete_workflow(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(id): Path<WorkflowId>,
) -> Result<(), ApiError> {
    owned_or_not_found(&state, id, user_id)?;
    state.workflows.remove(id);
    Ok(())
}
