//! Node metadata, builder, and credential requirements.

use nebula_core::{NodeKey, ProviderId};
use nebula_parameter::collection::ParameterCollection;
use serde::{Deserialize, Serialize};

use crate::NodeError;

/// Declares that a node requires a credential for `provider`, optionally
/// with a minimum scope set.
///
/// This is node-declared metadata, not a stored credential — it tells the
/// runtime which `(provider, scopes)` it needs to resolve via
/// `nebula-runtime`'s credential provider port before the node can run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialDescription {
    /// The external service identity this node needs access to.
    pub provider: ProviderId,
    /// Scopes the resolved credential must have been authorized with.
    #[serde(default)]
    pub required_scopes: Vec<String>,
}

impl CredentialDescription {
    /// Require a credential for `provider` with no specific scopes.
    #[must_use]
    pub fn new(provider: impl Into<ProviderId>) -> Self {
        Self { provider: provider.into(), required_scopes: Vec::new() }
    }

    /// Require a credential for `provider` authorized with `scopes`.
    #[must_use]
    pub fn with_scopes(provider: impl Into<ProviderId>, scopes: Vec<String>) -> Self {
        Self { provider: provider.into(), required_scopes: scopes }
    }
}

/// Static metadata describing a node type.
///
/// Built via the builder API:
///
/// ```
/// use nebula_node::NodeMetadata;
///
/// let meta = NodeMetadata::builder("external_action.http_request", "HTTP Request")
///     .description("Make HTTP calls to external APIs")
///     .group(vec!["network".into()])
///     .version(2)
///     .build()
///     .unwrap();
///
/// assert_eq!(meta.key().to_string(), "external_action.http_request");
/// assert_eq!(meta.version(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeMetadata {
    key: NodeKey,
    name: String,
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    group: Vec<String>,
    #[serde(default)]
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    documentation_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<ParameterCollection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    credentials: Vec<CredentialDescription>,
}

fn default_version() -> u32 {
    1
}

impl NodeMetadata {
    /// Start building metadata with the minimum required fields. `key`
    /// must be a `kind.subtype` string (e.g. `external_action.slack`).
    pub fn builder(key: impl AsRef<str>, name: impl Into<String>) -> NodeMetadataBuilder {
        NodeMetadataBuilder {
            key: key.as_ref().to_owned(),
            name: name.into(),
            version: 1,
            group: Vec::new(),
            description: String::new(),
            icon: None,
            documentation_url: None,
            parameters: None,
            credentials: Vec::new(),
        }
    }

    /// The normalized `kind.subtype` key.
    #[inline]
    #[must_use]
    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    /// Human-readable name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version number (1-based).
    #[inline]
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Group hierarchy for UI categorization.
    #[inline]
    #[must_use]
    pub fn group(&self) -> &[String] {
        &self.group
    }

    /// Short description.
    #[inline]
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Optional icon identifier.
    #[inline]
    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// Optional documentation URL.
    #[inline]
    #[must_use]
    pub fn documentation_url(&self) -> Option<&str> {
        self.documentation_url.as_deref()
    }

    /// User-facing parameter definitions, if any.
    #[inline]
    #[must_use]
    pub fn parameters(&self) -> Option<&ParameterCollection> {
        self.parameters.as_ref()
    }

    /// Credentials this node requires to run.
    #[inline]
    #[must_use]
    pub fn credentials(&self) -> &[CredentialDescription] {
        &self.credentials
    }
}

/// Builder for [`NodeMetadata`].
pub struct NodeMetadataBuilder {
    key: String,
    name: String,
    version: u32,
    group: Vec<String>,
    description: String,
    icon: Option<String>,
    documentation_url: Option<String>,
    parameters: Option<ParameterCollection>,
    credentials: Vec<CredentialDescription>,
}

impl NodeMetadataBuilder {
    /// Set the version number (defaults to 1).
    #[must_use]
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Set the group hierarchy.
    #[must_use]
    pub fn group(mut self, group: Vec<String>) -> Self {
        self.group = group;
        self
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set an icon identifier.
    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set a documentation URL.
    #[must_use]
    pub fn documentation_url(mut self, url: impl Into<String>) -> Self {
        self.documentation_url = Some(url.into());
        self
    }

    /// Set user-facing parameter definitions.
    #[must_use]
    pub fn parameters(mut self, params: ParameterCollection) -> Self {
        self.parameters = Some(params);
        self
    }

    /// Add a required credential.
    #[must_use]
    pub fn credential(mut self, cred: CredentialDescription) -> Self {
        self.credentials.push(cred);
        self
    }

    /// Validate and build the metadata.
    pub fn build(self) -> Result<NodeMetadata, NodeError> {
        let key = NodeKey::parse(&self.key)?;

        Ok(NodeMetadata {
            key,
            name: self.name,
            version: self.version,
            group: self.group,
            description: self.description,
            icon: self.icon,
            documentation_url: self.documentation_url,
            parameters: self.parameters,
            credentials: self.credentials,
        })
    }
}
