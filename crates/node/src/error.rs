//! Node error types.

use nebula_core::NodeKey;

/// Errors from node operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    /// Node not found in the registry.
    #[error("node not found: {0}")]
    NotFound(NodeKey),

    /// A specific version was not found.
    #[error("version {version} not found for node '{key}'")]
    VersionNotFound {
        /// The requested version.
        version: u32,
        /// The node key.
        key: NodeKey,
    },

    /// A node with this key already exists in the registry.
    #[error("node '{0}' already exists")]
    AlreadyExists(NodeKey),

    /// No versions are available in a `NodeVersions` container.
    #[error("no versions available for node '{0}'")]
    NoVersionsAvailable(NodeKey),

    /// The key of a node being added doesn't match the container's key.
    #[error("key mismatch: node has key '{node_key}', container has key '{container_key}'")]
    KeyMismatch {
        /// The incoming node's key.
        node_key: NodeKey,
        /// The container's existing key.
        container_key: NodeKey,
    },

    /// A version already exists in the container.
    #[error("version {version} already exists for node '{key}'")]
    VersionAlreadyExists {
        /// The conflicting version.
        version: u32,
        /// The node key.
        key: NodeKey,
    },

    /// Node key validation failed.
    #[error("invalid node key: {0}")]
    InvalidKey(#[from] nebula_core::NodeKeyError),
}

impl From<NodeError> for nebula_error::NebulaError {
    fn from(err: NodeError) -> Self {
        use nebula_error::NebulaError;
        match &err {
            NodeError::NotFound(_) | NodeError::VersionNotFound { .. } | NodeError::NoVersionsAvailable(_) => {
                NebulaError::not_found(err.to_string())
            }
            NodeError::AlreadyExists(_)
            | NodeError::KeyMismatch { .. }
            | NodeError::VersionAlreadyExists { .. }
            | NodeError::InvalidKey(_) => NebulaError::invalid_state(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let key = NodeKey::new("external_action", "slack");
        let err = NodeError::NotFound(key);
        assert_eq!(err.to_string(), "node not found: external_action.slack");
    }

    #[test]
    fn version_not_found_display() {
        let key = NodeKey::new("trigger", "manual");
        let err = NodeError::VersionNotFound { version: 3, key };
        assert_eq!(err.to_string(), "version 3 not found for node 'trigger.manual'");
    }

    #[test]
    fn key_mismatch_display_contains_both_keys() {
        let node_key = NodeKey::new("external_action", "foo");
        let container_key = NodeKey::new("external_action", "bar");
        let err = NodeError::KeyMismatch { node_key, container_key };
        assert!(err.to_string().contains("foo"));
        assert!(err.to_string().contains("bar"));
    }
}
