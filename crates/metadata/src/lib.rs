#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Nebula Metadata
//!
//! A single [`EntityMetadata`] shape shared by every named, schematized
//! entity in the Nebula workflow engine — node types, actions, credential
//! providers, resources, and trigger kinds all describe themselves with
//! the same key/name/version/tags record rather than each crate inventing
//! its own descriptor struct.

use std::fmt;

use nebula_schema::ParameterSchema;
use semver::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors constructing or looking up [`EntityMetadata`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetadataError {
    /// The entity key was empty or contained characters outside
    /// `[a-z0-9_]`.
    #[error("invalid metadata key: {0:?}")]
    InvalidKey(String),
}

impl From<MetadataError> for nebula_error::NebulaError {
    fn from(err: MetadataError) -> Self {
        nebula_error::NebulaError::invalid_input(err.to_string())
    }
}

fn validate_key(key: &str) -> Result<(), MetadataError> {
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.')
    {
        return Err(MetadataError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Static, versioned metadata describing a named entity: a node type, an
/// action, a credential provider, a resource kind, or a trigger kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMetadata {
    key: String,
    name: String,
    version: Version,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: Vec<String>,
    /// The parameter schema this entity accepts, if any.
    #[serde(default)]
    parameters: Vec<ParameterSchema>,
}

impl EntityMetadata {
    /// Build metadata for `key`/`name` at version `1.0.0`.
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Result<Self, MetadataError> {
        let key = key.into();
        validate_key(&key)?;
        Ok(Self {
            key,
            name: name.into(),
            version: Version::new(1, 0, 0),
            description: String::new(),
            tags: Vec::new(),
            parameters: Vec::new(),
        })
    }

    /// Set the version.
    #[must_use]
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set tags.
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Set the parameter schema.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Vec<ParameterSchema>) -> Self {
        self.parameters = parameters;
        self
    }

    /// The parameter schema this entity accepts.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterSchema] {
        &self.parameters
    }

    /// The entity's stable key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Human-readable display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Semantic version.
    #[must_use]
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl fmt::Display for EntityMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{} ({})", self.name, self.version, self.key)
    }
}
