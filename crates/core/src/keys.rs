//! Composite, human-readable keys layered on top of the typed UUID ids.
//!
//! Some lookups are naturally keyed by a stable string rather than a
//! UUID — a node's `kind.subtype` selector, or a credential's
//! `(user, provider, integration)` triple (spec §3: "exactly one active
//! row per (user, provider, integration)"). These keys are `Eq + Hash` so
//! they can be used directly as map keys, and `Display` so they serialize
//! to a single stable string for storage/logging.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::id::UserId;
use crate::types::ProviderId;

/// Error returned when a [`NodeKey`] string fails validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NodeKeyError {
    /// The key was empty.
    #[error("node key must not be empty")]
    Empty,
    /// The key was missing the `kind.subtype` separator.
    #[error("node key `{0}` must have the form `kind.subtype`")]
    MissingSubtype(String),
}

/// A node kind + subtype selector, e.g. `external_action.github`.
///
/// Used by the node registry (`nebula-node`) to resolve a
/// [`NodeDefinition`](nebula_workflow::NodeDefinition) to a concrete
/// executor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeKey {
    kind: String,
    subtype: String,
}

impl NodeKey {
    /// Construct a node key from its `kind` and `subtype` parts.
    #[must_use]
    pub fn new(kind: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            subtype: subtype.into(),
        }
    }

    /// Parse a `kind.subtype` string.
    pub fn parse(s: &str) -> Result<Self, NodeKeyError> {
        if s.is_empty() {
            return Err(NodeKeyError::Empty);
        }
        let (kind, subtype) = s
            .split_once('.')
            .ok_or_else(|| NodeKeyError::MissingSubtype(s.to_string()))?;
        Ok(Self::new(kind, subtype))
    }

    /// The node kind part (e.g. `external_action`).
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The subtype part (e.g. `github`).
    #[must_use]
    pub fn subtype(&self) -> &str {
        &self.subtype
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind, self.subtype)
    }
}

impl TryFrom<String> for NodeKey {
    type Error = NodeKeyError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NodeKey> for String {
    fn from(value: NodeKey) -> Self {
        value.to_string()
    }
}

/// The composite identity of a stored credential: `(user, provider,
/// integration)`.
///
/// Spec §3: "exactly one active row per (user_id, provider, integration_id)".
/// `integration_id` disambiguates multiple installs of the same provider
/// (e.g. two Slack workspaces); it defaults to the provider's canonical
/// name when the provider has no installable-integration concept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CredentialKey {
    /// The owning user.
    pub user_id: UserId,
    /// The external service identity.
    pub provider: ProviderId,
    /// Disambiguates multiple installs of the same provider.
    pub integration_id: String,
}

impl CredentialKey {
    /// Construct a credential key.
    #[must_use]
    pub fn new(user_id: UserId, provider: impl Into<ProviderId>, integration_id: impl Into<String>) -> Self {
        Self {
            user_id,
            provider: provider.into(),
            integration_id: integration_id.into(),
        }
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.user_id, self.provider, self.integration_id
        )
    }
}
