#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Nebula Node
//!
//! Node kind/subtype registry for the Nebula workflow engine.
//!
//! A **node** is the user-visible, versionable step kind that appears in a
//! workflow definition — `trigger.manual`, `external_action.http_request`,
//! `external_action.slack`. Each node bundles:
//!
//! - [`NodeMetadata`] — key, name, version, group, icon, docs URL
//! - Parameter schemas ([`nebula_parameter::collection::ParameterCollection`])
//! - Credential requirements ([`CredentialDescription`])
//!
//! ## Core Types
//!
//! - [`Node`] — base trait every node implements
//! - [`NodeMetadata`] — static descriptor with builder API
//! - [`NodeType`] — enum wrapping a single node or a versioned set
//! - [`NodeVersions`] — multi-version container keyed by `u32`
//! - [`NodeRegistry`] — in-memory registry mapping [`NodeKey`] → [`NodeType`]
//! - [`NodeError`] — error type for node operations
//!
//! Resolving a node to a runnable executor (an action) is `nebula-runtime`'s
//! job: nodes here are metadata and versioning only.

mod error;
mod metadata;
mod node;
mod node_type;
mod registry;
mod versions;

pub use error::NodeError;
pub use metadata::{CredentialDescription, NodeMetadata};
pub use node::Node;
pub use node_type::NodeType;
pub use registry::NodeRegistry;
pub use versions::NodeVersions;

pub use nebula_core::NodeKey;
