//! The base Node trait.

use std::fmt::Debug;

use nebula_core::NodeKey;

use crate::NodeMetadata;

/// Base trait for all node types in Nebula.
///
/// A node represents a user-visible, versionable DAG step kind (e.g.
/// `external_action.slack`, `trigger.manual`, `external_action.http_request`).
/// It is purely a metadata descriptor — dispatching a concrete execution for
/// a node is `nebula-runtime`'s job, resolved by action key rather than
/// through this trait.
///
/// This trait is **object-safe** so nodes can be stored as `Arc<dyn Node>`.
pub trait Node: Send + Sync + Debug + 'static {
    /// Returns the static metadata for this node.
    fn metadata(&self) -> &NodeMetadata;

    /// The normalized `kind.subtype` key identifying this node type.
    fn key(&self) -> &NodeKey {
        self.metadata().key()
    }

    /// Human-readable display name.
    fn name(&self) -> &str {
        self.metadata().name()
    }

    /// Version number (1-based).
    fn version(&self) -> u32 {
        self.metadata().version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct TestNode {
        meta: NodeMetadata,
    }

    impl Node for TestNode {
        fn metadata(&self) -> &NodeMetadata {
            &self.meta
        }
    }

    #[test]
    fn trait_default_methods() {
        let meta = NodeMetadata::builder("external_action.slack", "Slack")
            .version(2)
            .description("Send messages")
            .build()
            .unwrap();

        let node = TestNode { meta };

        assert_eq!(node.key().to_string(), "external_action.slack");
        assert_eq!(node.name(), "Slack");
        assert_eq!(node.version(), 2);
    }

    #[test]
    fn object_safety() {
        use std::sync::Arc;

        let meta = NodeMetadata::builder("trigger.manual", "Manual Trigger").build().unwrap();
        let node: Arc<dyn Node> = Arc::new(TestNode { meta });

        assert_eq!(node.key().to_string(), "trigger.manual");
        assert_eq!(node.version(), 1);
    }
}
