//! A thin `reqwest` wrapper over `nebula-api`'s HTTP contract.
//!
//! There is no client-side auth: the gateway trusts an upstream-set
//! `X-Nebula-User-Id` header, so this client attaches the configured user
//! id to every request the same way a fronting proxy would.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use nebula_core::{ExecutionId, UserId, WorkflowId};
use serde::de::DeserializeOwned;
use serde_json::Value;

const USER_HEADER: &str = "x-nebula-user-id";

#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
    user_id: UserId,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>, user_id: UserId) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http, base_url: base_url.into().trim_end_matches('/').to_string(), user_id })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request.header(USER_HEADER, self.user_id.to_string()).send().await?;
        Self::into_body(response).await
    }

    async fn send_no_body(&self, request: reqwest::RequestBuilder) -> Result<()> {
        let response = request.header(USER_HEADER, self.user_id.to_string()).send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::into_error(response).await)
    }

    async fn into_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(Self::into_error(response).await);
        }
        response.json::<T>().await.context("failed to decode gateway response")
    }

    async fn into_error(response: reqwest::Response) -> anyhow::Error {
        let status = response.status();
        match response.json::<Value>().await {
            Ok(body) => {
                let message = body.get("message").and_then(Value::as_str).unwrap_or("request failed");
                anyhow!("gateway returned {status}: {message}")
            }
            Err(_) => anyhow!("gateway returned {status}"),
        }
    }

    pub async fn create_workflow(&self, request: &Value) -> Result<Value> {
        self.send(self.http.post(self.url("/v1/workflows")).json(request)).await
    }

    pub async fn update_workflow(&self, id: WorkflowId, request: &Value) -> Result<Value> {
        self.send(self.http.put(self.url(&format!("/v1/workflows/{id}"))).json(request)).await
    }

    pub async fn get_workflow(&self, id: WorkflowId) -> Result<Value> {
        self.send(self.http.get(self.url(&format!("/v1/workflows/{id}")))).await
    }

    pub async fn list_workflows(&self) -> Result<Vec<Value>> {
        self.send(self.http.get(self.url("/v1/workflows"))).await
    }

    pub async fn delete_workflow(&self, id: WorkflowId) -> Result<()> {
        self.send_no_body(self.http.delete(self.url(&format!("/v1/workflows/{id}")))).await
    }

    pub async fn execute_workflow(&self, id: WorkflowId, request: &Value) -> Result<ExecutionId> {
        let body: Value = self.send(self.http.post(self.url(&format!("/v1/workflows/{id}/execute"))).json(request)).await?;
        let raw = body.get("execution_id").and_then(Value::as_str).ok_or_else(|| anyhow!("missing execution_id in response"))?;
        ExecutionId::parse(raw).map_err(|err| anyhow!("invalid execution_id in response: {err}"))
    }

    pub async fn get_execution(&self, id: ExecutionId) -> Result<Value> {
        self.send(self.http.get(self.url(&format!("/v1/executions/{id}")))).await
    }

    pub async fn cancel_execution(&self, id: ExecutionId) -> Result<()> {
        self.send_no_body(self.http.post(self.url(&format!("/v1/executions/{id}/cancel")))).await
    }

    pub async fn workflow_history(&self, id: WorkflowId) -> Result<Vec<Value>> {
        self.send(self.http.get(self.url(&format!("/v1/workflows/{id}/history")))).await
    }

    pub async fn list_credentials(&self) -> Result<Vec<Value>> {
        self.send(self.http.get(self.url("/v1/credentials"))).await
    }

    pub async fn revoke_credential(&self, provider: &str, integration_id: &str) -> Result<()> {
        self.send_no_body(self.http.delete(self.url(&format!("/v1/credentials/{provider}/{integration_id}")))).await
    }

    /// Returns the gateway's authorize redirect URL without following it —
    /// a human, not this process, completes the provider's consent screen.
    pub async fn authorize_url(&self, provider: &str, redirect_uri: &str, scopes: Option<&str>) -> Result<String> {
        let no_redirect = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none()).build()?;
        let mut query = vec![("provider", provider), ("redirect_uri", redirect_uri)];
        if let Some(scopes) = scopes {
            query.push(("scopes", scopes));
        }
        let response = no_redirect
            .get(self.url("/v1/oauth2/authorize"))
            .header(USER_HEADER, self.user_id.to_string())
            .query(&query)
            .send()
            .await?;
        if !response.status().is_redirection() {
            return Err(Self::into_error(response).await);
        }
        response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("gateway redirect had no Location header"))
    }

    pub fn events_request(&self, id: ExecutionId) -> reqwest::RequestBuilder {
        self.http.get(self.url(&format!("/v1/executions/{id}/events"))).header(USER_HEADER, self.user_id.to_string())
    }
}

pub fn must_parse_workflow_id(raw: &str) -> Result<WorkflowId> {
    WorkflowId::parse(raw).map_err(|err| anyhow!("invalid workflow id `{raw}`: {err}"))
}

pub fn must_parse_execution_id(raw: &str) -> Result<ExecutionId> {
    ExecutionId::parse(raw).map_err(|err| anyhow!("invalid execution id `{raw}`: {err}"))
}

pub fn must_parse_user_id(raw: &str) -> Result<UserId> {
    UserId::parse(raw).map_err(|err| anyhow!("invalid user id `{raw}`: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_drops_trailing_slash() {
        let client = GatewayClient::new("http://localhost:8080/", UserId::nil()).unwrap();
        assert_eq!(client.url("/v1/workflows"), "http://localhost:8080/v1/workflows");
    }

    #[test]
    fn must_parse_workflow_id_rejects_garbage() {
        assert!(must_parse_workflow_id("not-a-uuid").is_err());
    }

    #[test]
    fn must_parse_workflow_id_accepts_nil() {
        let id = must_parse_workflow_id("00000000-0000-0000-0000-000000000000").unwrap();
        assert_eq!(id, WorkflowId::nil());
    }
}
