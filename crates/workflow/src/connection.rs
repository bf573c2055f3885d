//! Edges between nodes, carrying an optional conversion function.

use nebula_core::NodeId;
use serde::{Deserialize, Serialize};

fn default_output_key() -> String {
    nebula_core::constants::DEFAULT_OUTPUT_KEY.to_string()
}

/// A directed edge from one node's output to another node's input.
///
/// `conversion_function` is always present in storage, even when the
/// user intends no transformation — in that case it holds the identity
/// passthrough source (see [`nebula_expression`] for the evaluator that
/// runs it).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// The upstream node.
    pub from_node: NodeId,
    /// The downstream node.
    pub to_node: NodeId,
    /// Which of the upstream node's output keys this edge carries.
    #[serde(default = "default_output_key")]
    pub output_key: String,
    /// Source of the conversion function applied along this edge.
    pub conversion_function: String,
}

impl Connection {
    /// Construct a connection with the default output key and an
    /// identity conversion function.
    #[must_use]
    pub fn new(from_node: NodeId, to_node: NodeId) -> Self {
        Self {
            from_node,
            to_node,
            output_key: default_output_key(),
            conversion_function: nebula_expression::IDENTITY_SOURCE.to_string(),
        }
    }
}
