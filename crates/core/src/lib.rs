#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Nebula Core
//!
//! Core types and traits shared by every crate in the Nebula workflow
//! engine: typed identifiers, the scope system, and the handful of
//! cross-cutting traits (`Identifiable`, `Scoped`, `HasContext`) that let
//! unrelated crates agree on identity and isolation without depending on
//! each other.
//!
//! ```rust
//! use nebula_core::{ExecutionId, WorkflowId, ScopeLevel};
//!
//! let execution_id = ExecutionId::v4();
//! let workflow_id = WorkflowId::v4();
//! let scope = ScopeLevel::Execution(execution_id);
//! assert_ne!(execution_id.to_string(), workflow_id.to_string());
//! let _ = scope;
//! ```

pub mod constants;
mod error;
pub mod id;
mod keys;
pub mod scope;
pub mod traits;
pub mod types;

pub use error::CoreError;
pub use id::*;
pub use keys::{CredentialKey, NodeKey, NodeKeyError};
pub use scope::{ScopeLevel, Scoped};
pub use traits::{HasContext, Identifiable};
pub use types::{ProviderId, Version};

/// Result type used throughout `nebula-core`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Common prelude for downstream Nebula crates.
pub mod prelude {
    pub use super::{
        ActionId, CoreError, CredentialId, CredentialKey, ExecutionId, HasContext, Identifiable,
        IntegrationId, NodeExecutionId, NodeId, NodeKey, NodeKeyError, ProviderId, Result,
        ScopeLevel, Scoped, TenantId, UserId, Version, WorkflowId,
    };
}
