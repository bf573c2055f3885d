//! Validation errors produced while constructing or checking a workflow.

use nebula_core::NodeId;
use thiserror::Error;

/// A structural problem with a workflow definition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// Two nodes share the same id.
    #[error("duplicate node id `{0}`")]
    DuplicateNodeId(NodeId),
    /// A connection references a node id that doesn't exist.
    #[error("connection references unknown node `{0}`")]
    DanglingConnection(NodeId),
    /// The graph contains a cycle not made up entirely of loop nodes.
    #[error("workflow graph contains a cycle at node `{0}`")]
    CyclicGraph(NodeId),
    /// The workflow has no trigger node and trigger validation was not
    /// explicitly skipped.
    #[error("workflow has no trigger node")]
    MissingTrigger,
    /// An `attached_nodes` entry does not refer to a tool/memory node.
    #[error("node `{parent}` attaches `{attached}`, which is not a tool or memory node")]
    InvalidAttachment {
        /// The `ai_agent` node doing the attaching.
        parent: NodeId,
        /// The node it incorrectly attaches.
        attached: NodeId,
    },
    /// `start_from_node` referenced a node id absent from the workflow.
    #[error("start_from_node `{0}` does not exist in this workflow")]
    UnknownStartNode(NodeId),
}

impl From<WorkflowError> for nebula_error::NebulaError {
    fn from(err: WorkflowError) -> Self {
        match &err {
            WorkflowError::DuplicateNodeId(_)
            | WorkflowError::DanglingConnection(_)
            | WorkflowError::CyclicGraph(_)
            | WorkflowError::MissingTrigger
            | WorkflowError::InvalidAttachment { .. }
            | WorkflowError::UnknownStartNode(_) => {
                nebula_error::NebulaError::invalid_workflow(err.to_string())
            }
        }
    }
}
