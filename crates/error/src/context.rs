//! Contextual breadcrumbs attached to an error as it propagates upward.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifying context captured at the point an error is raised.
///
/// Every layer that re-wraps an error with
/// [`NebulaError::with_context`](crate::NebulaError::with_context) may add
/// one of these; the outermost caller (the engine, or the API layer) sees
/// the full chain and can correlate a failure back to the exact
/// workflow/execution/node that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// The execution this error occurred within, if any.
    pub execution_id: Option<Uuid>,
    /// The node this error occurred within, if any.
    pub node_id: Option<Uuid>,
    /// A correlation id threading this error back to the originating
    /// request (API call, webhook delivery, scheduled trigger).
    pub correlation_id: Option<Uuid>,
    /// A free-form label identifying the component that raised the error
    /// (e.g. `"tool_adapter:github"`, `"credential_manager"`).
    pub component: Option<String>,
}

impl ErrorContext {
    /// An empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an execution id.
    #[must_use]
    pub fn with_execution_id(mut self, execution_id: Uuid) -> Self {
        self.execution_id = Some(execution_id);
        self
    }

    /// Attach a node id.
    #[must_use]
    pub fn with_node_id(mut self, node_id: Uuid) -> Self {
        self.node_id = Some(node_id);
        self
    }

    /// Attach a correlation id.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Attach a component label.
    #[must_use]
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Merge `other` into `self`, keeping `self`'s fields where both are set.
    #[must_use]
    pub fn merge(mut self, other: ErrorContext) -> Self {
        self.execution_id = self.execution_id.or(other.execution_id);
        self.node_id = self.node_id.or(other.node_id);
        self.correlation_id = self.correlation_id.or(other.correlation_id);
        self.component = self.component.or(other.component);
        self
    }
}
