//! Generic HTTP request/response plumbing shared by every tool adapter.
//!
//! This is the one transport all adapters (Google Calendar, GitHub, Slack,
//! and the pass-through generic HTTP adapter) build on. Retry and circuit
//! breaking are layered on top by [`crate::adapter`] using
//! `nebula-resilience`; this module only knows how to build and send one
//! request attempt.

mod auth;
mod client;
mod error;
mod method;
mod options;
mod response;

pub use auth::RequestAuth;
pub use client::HttpClient;
pub use error::RequestError;
pub use method::RequestMethod;
pub use options::{RequestOptions, RequestOptionsBuilder, DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_RESPONSE_BYTES, DEFAULT_READ_TIMEOUT, DEFAULT_TOTAL_TIMEOUT};
pub use response::{Response, ResponseStatusCategory};
