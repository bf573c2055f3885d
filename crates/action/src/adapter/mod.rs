//! The "External action / Tool" node subtype: adapters that always
//! resolve a credential before calling an upstream API.
//!
//! Every concrete adapter is a thin operation enum over
//! [`crate::http::HttpClient`], routed through [`execute_call`] for the
//! shared refresh-and-retry behavior.

mod credential;
mod error;
mod execute;
mod result;

pub mod generic_http;
pub mod github;
pub mod google_calendar;
pub mod slack;

use async_trait::async_trait;
use nebula_core::{CredentialKey, ProviderId};
use serde_json::Value;

pub use credential::{AccessToken, CredentialProvider};
pub use error::AdapterError;
pub use execute::execute_call;
pub use result::ToolCallResult;

/// A tool adapter: one provider's set of callable operations.
///
/// Operations are adapter-specific (each adapter documents its own
/// catalog); `params` carries the operation's arguments as JSON, and
/// the returned [`ToolCallResult`] always reports wall-clock time and a
/// structured error on failure rather than panicking or returning a
/// bare string.
#[async_trait]
pub trait ToolAdapter: Send + Sync {
    /// The provider this adapter calls (used to select a credential and
    /// to key the per-user concurrency limiter).
    fn provider(&self) -> ProviderId;

    /// Invoke `operation` with `params`, resolving credentials for
    /// `credential` through the configured [`CredentialProvider`].
    async fn call(&self, operation: &str, params: Value, credential: &CredentialKey) -> ToolCallResult;
}
