//! The dependency graph derived from a [`WorkflowDefinition`], and the
//! parallel-level decomposition the engine schedules from.

use std::collections::{HashMap, HashSet};

use nebula_core::NodeId;
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::error::WorkflowError;
use crate::workflow::WorkflowDefinition;

/// The workflow's nodes and connections as a directed graph, with the
/// node-id ↔ graph-index mapping needed to translate between the two.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<NodeId, ()>,
    index_of: HashMap<NodeId, NodeIndex>,
}

impl DependencyGraph {
    /// Build the graph from a workflow definition, validating structural
    /// invariants (spec §3: unique node ids, every connection references
    /// existing nodes, acyclic except where a loop node participates).
    pub fn from_definition(workflow: &WorkflowDefinition) -> Result<Self, WorkflowError> {
        let mut graph = DiGraph::new();
        let mut index_of = HashMap::with_capacity(workflow.nodes.len());
        let mut seen = HashSet::with_capacity(workflow.nodes.len());

        for node in &workflow.nodes {
            if !seen.insert(node.id) {
                return Err(WorkflowError::DuplicateNodeId(node.id));
            }
            let idx = graph.add_node(node.id);
            index_of.insert(node.id, idx);
        }

        for conn in &workflow.connections {
            let from = *index_of
                .get(&conn.from_node)
                .ok_or(WorkflowError::DanglingConnection(conn.from_node))?;
            let to = *index_of
                .get(&conn.to_node)
                .ok_or(WorkflowError::DanglingConnection(conn.to_node))?;
            graph.add_edge(from, to, ());
        }

        let dep_graph = Self { graph, index_of };
        dep_graph.validate_acyclic(workflow)?;
        Ok(dep_graph)
    }

    fn validate_acyclic(&self, workflow: &WorkflowDefinition) -> Result<(), WorkflowError> {
        if !is_cyclic_directed(&self.graph) {
            return Ok(());
        }
        // A cycle is permitted only when every node it touches is a loop
        // flow node (the loop body feeds back into its own controller).
        let loop_nodes: HashSet<NodeId> = workflow
            .nodes
            .iter()
            .filter(|n| n.is_loop())
            .map(|n| n.id)
            .collect();

        for scc in petgraph::algo::kosaraju_scc(&self.graph) {
            if scc.len() <= 1 {
                continue;
            }
            for idx in &scc {
                let node_id = self.graph[*idx];
                if !loop_nodes.contains(&node_id) {
                    return Err(WorkflowError::CyclicGraph(node_id));
                }
            }
        }
        Ok(())
    }

    /// Number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Nodes with no incoming edges.
    #[must_use]
    pub fn entry_nodes(&self) -> Vec<NodeId> {
        self.graph
            .node_indices()
            .filter(|idx| {
                self.graph
                    .neighbors_directed(*idx, Direction::Incoming)
                    .count()
                    == 0
            })
            .map(|idx| self.graph[idx])
            .collect()
    }

    /// Nodes with no outgoing edges.
    #[must_use]
    pub fn exit_nodes(&self) -> Vec<NodeId> {
        self.graph
            .node_indices()
            .filter(|idx| {
                self.graph
                    .neighbors_directed(*idx, Direction::Outgoing)
                    .count()
                    == 0
            })
            .map(|idx| self.graph[idx])
            .collect()
    }

    /// Direct successors of a node.
    #[must_use]
    pub fn successors(&self, id: NodeId) -> Vec<NodeId> {
        let Some(idx) = self.index_of.get(&id) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(*idx, Direction::Outgoing)
            .map(|i| self.graph[i])
            .collect()
    }

    /// Direct predecessors of a node.
    #[must_use]
    pub fn predecessors(&self, id: NodeId) -> Vec<NodeId> {
        let Some(idx) = self.index_of.get(&id) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(*idx, Direction::Incoming)
            .map(|i| self.graph[i])
            .collect()
    }

    /// Every node reachable forward from `id`, including `id` itself.
    #[must_use]
    pub fn reachable_from(&self, id: NodeId) -> HashSet<NodeId> {
        let mut visited = HashSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            stack.extend(self.successors(current));
        }
        visited
    }

    /// Decompose the graph into parallel execution levels: level 0 holds
    /// every entry node, level N holds every node whose predecessors all
    /// finish by level N-1. Nodes within a level have no dependency on
    /// one another and may run concurrently.
    pub fn compute_levels(&self) -> Result<Vec<Vec<NodeId>>, WorkflowError> {
        let order = toposort(&self.graph, None)
            .map_err(|cycle| WorkflowError::CyclicGraph(self.graph[cycle.node_id()]))?;

        let mut level_of: HashMap<NodeId, usize> = HashMap::with_capacity(order.len());
        for idx in &order {
            let node_id = self.graph[*idx];
            let level = self
                .graph
                .neighbors_directed(*idx, Direction::Incoming)
                .map(|pred_idx| level_of.get(&self.graph[pred_idx]).copied().unwrap_or(0) + 1)
                .max()
                .unwrap_or(0);
            level_of.insert(node_id, level);
        }

        let max_level = level_of.values().copied().max().unwrap_or(0);
        let mut levels = vec![Vec::new(); max_level + 1];
        for idx in &order {
            let node_id = self.graph[*idx];
            levels[level_of[&node_id]].push(node_id);
        }
        Ok(levels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkflowConfig;
    use crate::connection::Connection;
    use crate::node::NodeDefinition;
    use chrono::Utc;
    use nebula_core::{NodeKey, UserId, Version, WorkflowId};
    use std::collections::HashMap as StdHashMap;

    fn wf(nodes: Vec<NodeDefinition>, connections: Vec<Connection>) -> WorkflowDefinition {
        let now = Utc::now();
        WorkflowDefinition {
            id: WorkflowId::v4(),
            owner_id: UserId::v4(),
            team_id: None,
            name: "test".into(),
            description: None,
            version: Version::new(0, 1, 0),
            nodes,
            connections,
            variables: StdHashMap::new(),
            config: WorkflowConfig::default(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn node(id: NodeId) -> NodeDefinition {
        NodeDefinition::new(id, "n", NodeKey::new("action", "noop"))
    }

    #[test]
    fn linear_graph_has_one_node_per_level() {
        let (a, b, c) = (NodeId::v4(), NodeId::v4(), NodeId::v4());
        let workflow = wf(
            vec![node(a), node(b), node(c)],
            vec![Connection::new(a, b), Connection::new(b, c)],
        );
        let graph = DependencyGraph::from_definition(&workflow).unwrap();
        let levels = graph.compute_levels().unwrap();
        assert_eq!(levels.len(), 3);
        assert_eq!(graph.entry_nodes(), vec![a]);
        assert_eq!(graph.exit_nodes(), vec![c]);
    }

    #[test]
    fn diamond_graph_has_shared_level() {
        let (a, b, c, d) = (NodeId::v4(), NodeId::v4(), NodeId::v4(), NodeId::v4());
        let workflow = wf(
            vec![node(a), node(b), node(c), node(d)],
            vec![
                Connection::new(a, b),
                Connection::new(a, c),
                Connection::new(b, d),
                Connection::new(c, d),
            ],
        );
        let graph = DependencyGraph::from_definition(&workflow).unwrap();
        let levels = graph.compute_levels().unwrap();
        assert_eq!(levels.len(), 3);
        assert_eq!(levels[1].len(), 2);
    }

    #[test]
    fn duplicate_node_id_rejected() {
        let a = NodeId::v4();
        let workflow = wf(vec![node(a), node(a)], vec![]);
        assert!(matches!(
            DependencyGraph::from_definition(&workflow),
            Err(WorkflowError::DuplicateNodeId(_))
        ));
    }

    #[test]
    fn dangling_connection_rejected() {
        let a = NodeId::v4();
        let ghost = NodeId::v4();
        let workflow = wf(vec![node(a)], vec![Connection::new(a, ghost)]);
        assert!(matches!(
            DependencyGraph::from_definition(&workflow),
            Err(WorkflowError::DanglingConnection(_))
        ));
    }

    #[test]
    fn plain_cycle_rejected() {
        let (a, b) = (NodeId::v4(), NodeId::v4());
        let workflow = wf(vec![node(a), node(b)], vec![Connection::new(a, b), Connection::new(b, a)]);
        assert!(matches!(
            DependencyGraph::from_definition(&workflow),
            Err(WorkflowError::CyclicGraph(_))
        ));
    }

    #[test]
    fn cycle_through_loop_node_allowed() {
        let mut loop_node = node(NodeId::v4());
        loop_node.key = NodeKey::new("flow", "loop");
        let body = node(NodeId::v4());
        let loop_id = loop_node.id;
        let body_id = body.id;
        let workflow = wf(
            vec![loop_node, body],
            vec![Connection::new(loop_id, body_id), Connection::new(body_id, loop_id)],
        );
        assert!(DependencyGraph::from_definition(&workflow).is_ok());
    }

    #[test]
    fn reachable_from_covers_downstream_only() {
        let (a, b, c) = (NodeId::v4(), NodeId::v4(), NodeId::v4());
        let workflow = wf(
            vec![node(a), node(b), node(c)],
            vec![Connection::new(a, b), Connection::new(b, c)],
        );
        let graph = DependencyGraph::from_definition(&workflow).unwrap();
        let reachable = graph.reachable_from(b);
        assert!(reachable.contains(&b));
        assert!(reachable.contains(&c));
        assert!(!reachable.contains(&a));
    }
}
