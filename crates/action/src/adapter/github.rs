//! GitHub REST API adapter (`https://api.github.com`).
//!
//! Operations:
//! - `get_repo` — `{ "owner": str, "repo": str }`
//! - `list_issues` — `{ "owner": str, "repo": str, "state": "open"|"closed"|"all" (default "open") }`
//! - `create_issue` — `{ "owner": str, "repo": str, "title": str, "body": str? }`
//! - `create_comment` — `{ "owner": str, "repo": str, "issue_number": u64, "body": str }`
//! - `list_pull_requests` — `{ "owner": str, "repo": str, "state": str (default "open") }`

use async_trait::async_trait;
use nebula_core::{CredentialKey, ProviderId};
use nebula_resilience::RetryPolicy;
use serde_json::Value;
use std::sync::Arc;

use super::credential::CredentialProvider;
use super::execute::execute_call;
use super::result::ToolCallResult;
use super::ToolAdapter;
use crate::http::{HttpClient, RequestAuth, RequestMethod, RequestOptions};

const BASE_URL: &str = "https://api.github.com";

/// GitHub issues, pull requests, and comments.
pub struct GitHubAdapter {
    http: HttpClient,
    retry: RetryPolicy,
    credentials: Arc<dyn CredentialProvider>,
}

impl GitHubAdapter {
    /// Build the adapter.
    pub fn new(http: HttpClient, retry: RetryPolicy, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self { http, retry, credentials }
    }

    fn invalid(message: impl Into<String>) -> ToolCallResult {
        ToolCallResult::failure(nebula_error::NebulaError::invalid_input(message), 0)
    }

    fn field<'a>(params: &'a Value, name: &str) -> Result<&'a str, ToolCallResult> {
        params.get(name).and_then(Value::as_str).ok_or_else(|| Self::invalid(format!("missing required field `{name}`")))
    }
}

#[async_trait]
impl ToolAdapter for GitHubAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::from("github")
    }

    async fn call(&self, operation: &str, params: Value, credential: &CredentialKey) -> ToolCallResult {
        let path = match operation {
            "get_repo" => {
                let (owner, repo) = match (Self::field(&params, "owner"), Self::field(&params, "repo")) {
                    (Ok(o), Ok(r)) => (o, r),
                    (Err(e), _) | (_, Err(e)) => return e,
                };
                (RequestMethod::Get, format!("/repos/{owner}/{repo}"), None)
            }
            "list_issues" => {
                let (owner, repo) = match (Self::field(&params, "owner"), Self::field(&params, "repo")) {
                    (Ok(o), Ok(r)) => (o, r),
                    (Err(e), _) | (_, Err(e)) => return e,
                };
                let state = params.get("state").and_then(Value::as_str).unwrap_or("open");
                (RequestMethod::Get, format!("/repos/{owner}/{repo}/issues?state={state}"), None)
            }
            "create_issue" => {
                let (owner, repo) = match (Self::field(&params, "owner"), Self::field(&params, "repo")) {
                    (Ok(o), Ok(r)) => (o, r),
                    (Err(e), _) | (_, Err(e)) => return e,
                };
                let title = match Self::field(&params, "title") {
                    Ok(t) => t,
                    Err(e) => return e,
                };
                let body = serde_json::json!({ "title": title, "body": params.get("body").and_then(Value::as_str) });
                (RequestMethod::Post, format!("/repos/{owner}/{repo}/issues"), Some(body))
            }
            "create_comment" => {
                let (owner, repo) = match (Self::field(&params, "owner"), Self::field(&params, "repo")) {
                    (Ok(o), Ok(r)) => (o, r),
                    (Err(e), _) | (_, Err(e)) => return e,
                };
                let issue_number = match params.get("issue_number").and_then(Value::as_u64) {
                    Some(n) => n,
                    None => return Self::invalid("missing required field `issue_number`"),
                };
                let body = match Self::field(&params, "body") {
                    Ok(b) => b,
                    Err(e) => return e,
                };
                (RequestMethod::Post, format!("/repos/{owner}/{repo}/issues/{issue_number}/comments"), Some(serde_json::json!({ "body": body })))
            }
            "list_pull_requests" => {
                let (owner, repo) = match (Self::field(&params, "owner"), Self::field(&params, "repo")) {
                    (Ok(o), Ok(r)) => (o, r),
                    (Err(e), _) | (_, Err(e)) => return e,
                };
                let state = params.get("state").and_then(Value::as_str).unwrap_or("open");
                (RequestMethod::Get, format!("/repos/{owner}/{repo}/pulls?state={state}"), None)
            }
            other => return Self::invalid(format!("unknown operation `{other}`")),
        };

        let (method, path, body) = path;
        let result = execute_call(&self.http, &self.retry, self.credentials.as_ref(), credential, |token| {
            let mut builder = RequestOptions::builder().base_url(BASE_URL).url(path.clone()).method(method).auth(RequestAuth::bearer(token));
            if let Some(body) = &body {
                builder = builder.json(body)?;
            }
            builder.build()
        })
        .await;

        match result {
            Ok((response, duration_ms)) => ToolCallResult::success(response.json.unwrap_or(Value::Null), duration_ms),
            Err(err) => ToolCallResult::failure(err.into(), 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use nebula_core::UserId;

    use super::*;
    use crate::adapter::credential::AccessToken;

    struct StaticCredentials;

    #[async_trait]
    impl CredentialProvider for StaticCredentials {
        async fn access_token(&self, _key: &CredentialKey) -> Result<AccessToken, nebula_error::NebulaError> {
            Ok(AccessToken { token: "gh-token".to_string() })
        }

        async fn refresh(&self, _key: &CredentialKey) -> Result<AccessToken, nebula_error::NebulaError> {
            Ok(AccessToken { token: "gh-token".to_string() })
        }
    }

    #[tokio::test]
    async fn missing_owner_fails_before_any_network_call() {
        let adapter = GitHubAdapter::new(HttpClient::new().unwrap(), RetryPolicy::default(), Arc::new(StaticCredentials));
        let key = CredentialKey::new(UserId::v4(), "github", "default");
        let result = adapter.call("get_repo", serde_json::json!({ "repo": "nebula" }), &key).await;
        assert!(!result.success);
    }

    #[tokio::test]
    async fn unknown_operation_is_rejected() {
        let adapter = GitHubAdapter::new(HttpClient::new().unwrap(), RetryPolicy::default(), Arc::new(StaticCredentials));
        let key = CredentialKey::new(UserId::v4(), "github", "default");
        let result = adapter.call("delete_repo", Value::Null, &key).await;
        assert!(!result.success);
    }
}
