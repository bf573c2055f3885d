#![forbid(unsafe_code)]

//! # Nebula API
//!
//! The HTTP/SSE gateway over the workflow engine: workflow CRUD,
//! execute/status/cancel, the per-execution event stream, and the
//! OAuth2 authorization-code flow plus credential inventory.
//!
//! Scoped to exercise the engine end-to-end, not to be a complete
//! production gateway — no auth middleware beyond trusting an
//! upstream-set `X-Nebula-User-Id` header (see [`user`]), no relational
//! persistence (workflows and executions live in [`state::AppState`]'s
//! in-memory tables), one binary instead of a fleet of specialized
//! services.

pub mod config;
pub mod error;
pub mod events;
pub mod executions;
pub mod oauth;
pub mod router;
pub mod state;
pub mod user;
pub mod workflows;

pub use config::ApiConfig;
pub use error::ApiError;
pub use state::AppState;
