//! The `reqwest`-backed client that actually executes a [`RequestOptions`].

use std::collections::HashMap;
use std::time::Instant;

use futures::StreamExt;
use url::Url;

use super::error::RequestError;
use super::options::{RequestOptions, DEFAULT_CONNECT_TIMEOUT};
use super::response::Response;

/// Thin wrapper over a `reqwest::Client`, enforcing the adapter layer's
/// fixed timeout and response-size budget.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Build a client with the spec-default connect timeout.
    pub fn new() -> Result<Self, RequestError> {
        Self::with_connect_timeout(DEFAULT_CONNECT_TIMEOUT)
    }

    /// Build a client with an explicit connect timeout.
    pub fn with_connect_timeout(connect_timeout: std::time::Duration) -> Result<Self, RequestError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| RequestError::Build(e.to_string()))?;
        Ok(Self { client })
    }

    /// Execute one request attempt. Does not retry; callers apply
    /// [`nebula_resilience::RetryPolicy`] around this call.
    pub async fn send(&self, options: &RequestOptions) -> Result<Response, RequestError> {
        let base_url = options.full_url().ok_or_else(|| RequestError::InvalidUrl("no url or base_url provided".to_string()))?;
        let mut url = Url::parse(&base_url).map_err(|e| RequestError::InvalidUrl(e.to_string()))?;
        for (key, value) in &options.query_params {
            url.query_pairs_mut().append_pair(key, value);
        }

        let method = reqwest::Method::from_bytes(options.method.as_str().as_bytes()).map_err(|e| RequestError::Build(e.to_string()))?;

        let mut request = self.client.request(method, url).timeout(options.total_timeout);
        for (key, value) in &options.headers {
            request = request.header(key, value);
        }
        if let Some(user_agent) = &options.user_agent {
            request = request.header(reqwest::header::USER_AGENT, user_agent);
        }
        if options.method.can_have_body() {
            if let Some(json) = &options.json {
                request = request.json(json);
            }
        }

        let start = Instant::now();
        let response = request.send().await.map_err(classify_transport_error)?;

        let status = response.status().as_u16();
        let url = response.url().to_string();
        let headers: HashMap<String, String> =
            response.headers().iter().filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string()))).collect();
        let is_json = headers.iter().any(|(k, v)| k.eq_ignore_ascii_case("content-type") && v.contains("application/json"));

        let limit = options.max_response_bytes;
        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(classify_transport_error)?;
            body.extend_from_slice(&chunk);
            if body.len() as u64 > limit {
                return Err(RequestError::ResponseTooLarge { limit_bytes: limit });
            }
        }

        let json = if is_json { serde_json::from_slice(&body).ok() } else { None };
        let duration_ms = start.elapsed().as_millis() as u64;

        Ok(Response { status, headers, json, bytes: body, url, duration_ms })
    }
}

fn classify_transport_error(err: reqwest::Error) -> RequestError {
    if err.is_timeout() {
        RequestError::Timeout(err.to_string())
    } else {
        RequestError::Network(err.to_string())
    }
}
