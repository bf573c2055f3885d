//! OAuth2 authorization-code flow endpoints and the credential inventory
//! built on top of it.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::Json;
use chrono::{DateTime, Utc};
use nebula_credential::audit::AuditContext;
use nebula_credential::oauth2::state::StateToken;
use nebula_core::{CredentialKey, ProviderId};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ApiError;
use crate::state::AppState;
use crate::user::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct AuthorizeQuery {
    pub provider: String,
    pub redirect_uri: String,
    #[serde(default)]
    pub scopes: Option<String>,
}

pub async fn begin_authorization(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Query(query): Query<AuthorizeQuery>,
) -> Result<Redirect, ApiError> {
    let redirect_uri = Url::parse(&query.redirect_uri)
        .map_err(|err| ApiError::from(nebula_error::NebulaError::new(nebula_error::ErrorKind::InvalidInput, err.to_string())))?;
    let scopes = query
        .scopes
        .map(|s| s.split(',').map(|scope| scope.trim().to_string()).collect())
        .unwrap_or_default();

    let url = state.oauth.begin_authorization(user_id, ProviderId::from(query.provider.as_str()), scopes, redirect_uri)?;
    Ok(Redirect::temporary(url.as_str()))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: String,
    pub state: String,
}

#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    pub provider: String,
    pub scopes: Vec<String>,
}

pub async fn oauth_callback(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<CallbackResponse>, ApiError> {
    let provider = ProviderId::from(provider.as_str());
    let ctx = AuditContext::new(user_id);
    let state_token = StateToken::from(query.state);
    let credential = state
        .oauth
        .complete_authorization(provider.clone(), &query.code, &state_token, &ctx)
        .await?;
    Ok(Json(CallbackResponse {
        provider: provider.as_str().to_string(),
        scopes: credential.scopes,
    }))
}

#[derive(Debug, Serialize)]
pub struct CredentialSummaryResponse {
    pub provider: String,
    pub integration_id: String,
    pub scopes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub valid: bool,
}

pub async fn list_credentials(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Json<Vec<CredentialSummaryResponse>> {
    let summaries = state
        .credentials
        .list_for_user(user_id)
        .await
        .into_iter()
        .map(|summary| CredentialSummaryResponse {
            provider: summary.key.provider.as_str().to_string(),
            integration_id: summary.key.integration_id,
            scopes: summary.scopes,
            created_at: summary.created_at,
            updated_at: summary.updated_at,
            valid: summary.valid,
        })
        .collect();
    Json(summaries)
}

pub async fn revoke_credential(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path((provider, integration_id)): Path<(String, String)>,
) -> Result<(), ApiError> {
    let key = CredentialKey::new(user_id, provider.as_str(), integration_id);
    let ctx = AuditContext::new(user_id);
    state.credentials.revoke(&key, &ctx).await?;
    Ok(())
}
