//! Shared call orchestration: lazy credential resolution, a single
//! refresh-and-retry on `401`/`403`, then the generic backoff schedule for
//! transient failures. Every concrete adapter's `call` implementation
//! routes its HTTP attempt through [`execute_call`].

use std::time::Instant;

use nebula_core::CredentialKey;
use nebula_error::Retryable as _;
use nebula_resilience::{RetryPolicy, Retryable as _};

use super::credential::CredentialProvider;
use super::error::AdapterError;
use crate::http::{HttpClient, RequestOptions, Response};

/// Run one logical adapter call: resolve a token, build and send a
/// request, refresh-and-retry exactly once on auth failure, and apply
/// `retry`'s backoff schedule to any remaining transient failures.
///
/// `build` is called once per attempt with the current access token and
/// must produce a fresh [`RequestOptions`] (so a refreshed token is
/// re-applied to the `Authorization` header on the retried attempt).
pub async fn execute_call(
    http: &HttpClient,
    retry: &RetryPolicy,
    credentials: &dyn CredentialProvider,
    key: &CredentialKey,
    mut build: impl FnMut(&str) -> Result<RequestOptions, crate::http::RequestError>,
) -> Result<(Response, u64), AdapterError> {
    let start = Instant::now();
    let mut token = credentials.access_token(key).await?.token;
    let mut refreshed_once = false;
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let options = build(&token)?;
        match http.send(&options).await.and_then(Response::into_result) {
            Ok(response) => return Ok((response, start.elapsed().as_millis() as u64)),
            Err(err) if err.is_auth_failure() && !refreshed_once => {
                refreshed_once = true;
                token = credentials.refresh(key).await?.token;
                attempt = 0;
            }
            Err(err) if attempt < retry.max_attempts && err.is_retryable() => {
                let delay = err.retry_after().map(|hint| hint.min(retry.max_retry_after)).unwrap_or_else(|| {
                    let idx = (attempt as usize).saturating_sub(1);
                    retry.backoff.get(idx).copied().unwrap_or_else(|| *retry.backoff.last().expect("non-empty backoff schedule"))
                });
                tracing::warn!(attempt, delay_ms = delay.as_millis() as u64, error = %err, "retrying tool adapter call");
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err.into()),
        }
    }
}
