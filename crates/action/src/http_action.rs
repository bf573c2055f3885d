//! The `action.http_request` node subtype: a plain HTTP call with no
//! credential resolution, driven entirely by its input JSON.

use async_trait::async_trait;
use nebula_core::NodeKey;

use crate::action::{Action, ActionContext, ActionMetadata, ActionResult};
use crate::http::{HttpClient, RequestAuth, RequestMethod, RequestOptions};

/// Input shape accepted by [`HttpRequestAction`].
#[derive(Debug, Clone, serde::Deserialize)]
struct HttpRequestInput {
    url: String,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    headers: std::collections::HashMap<String, String>,
    #[serde(default)]
    query: std::collections::HashMap<String, String>,
    #[serde(default)]
    json: Option<serde_json::Value>,
    #[serde(default)]
    bearer_token: Option<String>,
}

/// A generic HTTP call action with no OAuth2 involvement — suitable
/// for calling unauthenticated endpoints or endpoints that take a
/// bearer token passed in directly (e.g. from an upstream node's
/// output) rather than through credential storage.
pub struct HttpRequestAction {
    metadata: ActionMetadata,
    client: HttpClient,
}

impl HttpRequestAction {
    /// Build the action over a shared [`HttpClient`].
    pub fn new(client: HttpClient) -> Self {
        Self { metadata: ActionMetadata::new(NodeKey::new("action", "http_request"), "HTTP Request", "Make an HTTP request to any URL"), client }
    }
}

#[async_trait]
impl Action for HttpRequestAction {
    fn metadata(&self) -> &ActionMetadata {
        &self.metadata
    }

    async fn execute(&self, ctx: &ActionContext) -> ActionResult {
        let start = std::time::Instant::now();
        let input: HttpRequestInput = match serde_json::from_value(ctx.input.clone()) {
            Ok(input) => input,
            Err(err) => return ActionResult::failure(nebula_error::NebulaError::invalid_input(err.to_string()), 0),
        };

        let method = match input.method.as_deref().map(str::parse::<RequestMethod>).transpose() {
            Ok(method) => method.unwrap_or_default(),
            Err(err) => return ActionResult::failure(nebula_error::NebulaError::invalid_input(err), 0),
        };

        let mut builder = RequestOptions::builder().url(input.url).method(method);
        for (key, value) in input.headers {
            builder = builder.header(key, value);
        }
        for (key, value) in input.query {
            builder = builder.query_param(key, value);
        }
        if let Some(body) = &input.json {
            builder = match builder.json(body) {
                Ok(builder) => builder,
                Err(err) => return ActionResult::failure(err.into(), start.elapsed().as_millis() as u64),
            };
        }
        if let Some(token) = input.bearer_token {
            builder = builder.auth(RequestAuth::bearer(token));
        }

        let options = match builder.build() {
            Ok(options) => options,
            Err(err) => return ActionResult::failure(err.into(), start.elapsed().as_millis() as u64),
        };

        match self.client.send(&options).await.and_then(crate::http::Response::into_result) {
            Ok(response) => ActionResult::success(
                serde_json::json!({ "status": response.status, "headers": response.headers, "body": response.json }),
                start.elapsed().as_millis() as u64,
            ),
            Err(err) => ActionResult::failure(err.into(), start.elapsed().as_millis() as u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_url_fails_without_a_network_call() {
        let action = HttpRequestAction::new(HttpClient::new().unwrap());
        let result = action.execute(&ActionContext::new(serde_json::json!({}))).await;
        assert!(!result.is_success());
    }

    #[tokio::test]
    async fn get_request_against_a_mock_server() {
        let mock = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&mock)
            .await;

        let action = HttpRequestAction::new(HttpClient::new().unwrap());
        let input = serde_json::json!({ "url": mock.uri() });
        let result = action.execute(&ActionContext::new(input)).await;
        assert!(result.is_success());
    }
}
