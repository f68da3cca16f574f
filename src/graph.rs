//! In-memory resource graph arena.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::GraphError;
use crate::types::{EdgeKey, EdgeType, NodeData, NodeId};

/// Multigraph over one inventory snapshot: an id-keyed node arena plus one
/// directed relation layer per edge type.
///
/// Uses BTreeMap/BTreeSet throughout for deterministic iteration order.
/// Edges may reference ids no node declares; the graph stores them in the
/// adjacency only, and completeness checking rejects them before a graph
/// escapes the builder.
#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    /// Node payloads by id.
    nodes: BTreeMap<NodeId, NodeData>,
    /// The authoritative edge set.
    edges: BTreeSet<EdgeKey>,
    /// Per-type source -> targets adjacency.
    children: BTreeMap<EdgeType, BTreeMap<NodeId, BTreeSet<NodeId>>>,
    /// Per-type target -> sources adjacency.
    parents: BTreeMap<EdgeType, BTreeMap<NodeId, BTreeSet<NodeId>>>,
}

impl ResourceGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node payload, replacing any previous payload under the id.
    pub fn insert_node(&mut self, node: NodeData) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// Insert an edge. Re-inserting the same key is a no-op.
    pub fn insert_edge(&mut self, key: EdgeKey) {
        self.children
            .entry(key.edge_type)
            .or_default()
            .entry(key.from.clone())
            .or_default()
            .insert(key.to.clone());
        self.parents
            .entry(key.edge_type)
            .or_default()
            .entry(key.to.clone())
            .or_default()
            .insert(key.from.clone());
        self.edges.insert(key);
    }

    /// Remove a node payload together with every edge touching its id.
    pub fn remove_node(&mut self, id: &NodeId) -> Option<NodeData> {
        let node = self.nodes.remove(id);
        let stale: Vec<EdgeKey> = self
            .edges
            .iter()
            .filter(|key| &key.from == id || &key.to == id)
            .cloned()
            .collect();
        for key in &stale {
            self.remove_edge(key);
        }
        node
    }

    /// Remove one edge. Returns whether it was present.
    pub fn remove_edge(&mut self, key: &EdgeKey) -> bool {
        if !self.edges.remove(key) {
            return false;
        }
        if let Some(adjacency) = self.children.get_mut(&key.edge_type) {
            if let Some(targets) = adjacency.get_mut(&key.from) {
                targets.remove(&key.to);
                if targets.is_empty() {
                    adjacency.remove(&key.from);
                }
            }
        }
        if let Some(adjacency) = self.parents.get_mut(&key.edge_type) {
            if let Some(sources) = adjacency.get_mut(&key.to) {
                sources.remove(&key.from);
                if sources.is_empty() {
                    adjacency.remove(&key.to);
                }
            }
        }
        true
    }

    /// Look up a node payload.
    pub fn node(&self, id: &NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// Mutable access to a node payload.
    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id)
    }

    /// Whether a node payload exists under the id.
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Whether the exact edge exists.
    pub fn has_edge(&self, key: &EdgeKey) -> bool {
        self.edges.contains(key)
    }

    /// All declared node ids in id order.
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> + '_ {
        self.nodes.keys()
    }

    /// All node payloads in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeData> + '_ {
        self.nodes.values()
    }

    /// All edges in canonical key order.
    pub fn edges(&self) -> impl Iterator<Item = &EdgeKey> + '_ {
        self.edges.iter()
    }

    /// Number of declared nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Successors of a node along one edge type, in id order.
    pub fn successors(&self, id: &NodeId, edge_type: EdgeType) -> impl Iterator<Item = &NodeId> + '_ {
        self.children
            .get(&edge_type)
            .and_then(|adjacency| adjacency.get(id))
            .into_iter()
            .flatten()
    }

    /// Predecessors of a node along one edge type, in id order.
    pub fn predecessors(
        &self,
        id: &NodeId,
        edge_type: EdgeType,
    ) -> impl Iterator<Item = &NodeId> + '_ {
        self.parents
            .get(&edge_type)
            .and_then(|adjacency| adjacency.get(id))
            .into_iter()
            .flatten()
    }

    /// Successors of a node across all edge types, deduplicated, id order.
    pub fn successors_any(&self, id: &NodeId) -> impl Iterator<Item = &NodeId> + '_ {
        let mut merged: BTreeSet<&NodeId> = BTreeSet::new();
        for adjacency in self.children.values() {
            if let Some(targets) = adjacency.get(id) {
                merged.extend(targets.iter());
            }
        }
        merged.into_iter()
    }

    /// Predecessors of a node across all edge types, deduplicated, id order.
    pub fn predecessors_any(&self, id: &NodeId) -> impl Iterator<Item = &NodeId> + '_ {
        let mut merged: BTreeSet<&NodeId> = BTreeSet::new();
        for adjacency in self.parents.values() {
            if let Some(sources) = adjacency.get(id) {
                merged.extend(sources.iter());
            }
        }
        merged.into_iter()
    }

    /// All in-degree-zero nodes, counting every edge type, in id order.
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .keys()
            .filter(|id| self.predecessors_any(id).next().is_none())
            .cloned()
            .collect()
    }

    /// The unique root of the graph.
    ///
    /// Fails with the full candidate list when the graph has zero or
    /// multiple in-degree-zero nodes.
    pub fn root_id(&self) -> Result<NodeId, GraphError> {
        let mut roots = self.roots();
        if roots.len() == 1 {
            Ok(roots.remove(0))
        } else {
            Err(GraphError::RootCount { roots })
        }
    }

    /// Induced subgraph over the given ids: their payloads plus every edge
    /// with both endpoints inside the set.
    pub fn subgraph(&self, ids: &BTreeSet<NodeId>) -> ResourceGraph {
        let mut sub = ResourceGraph::new();
        for id in ids {
            if let Some(node) = self.nodes.get(id) {
                sub.insert_node(node.clone());
            }
        }
        for key in &self.edges {
            if ids.contains(&key.from) && ids.contains(&key.to) {
                sub.insert_edge(key.clone());
            }
        }
        sub
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_node(id: &str) -> NodeData {
        NodeData::new(NodeId::new(id), json!({"kind": "test", "id": id}))
    }

    fn make_graph(edges: &[(&str, &str, EdgeType)]) -> ResourceGraph {
        let mut graph = ResourceGraph::new();
        let mut seen = BTreeSet::new();
        for (from, to, edge_type) in edges {
            for id in [from, to] {
                if seen.insert(id.to_string()) {
                    graph.insert_node(make_node(id));
                }
            }
            graph.insert_edge(EdgeKey::new(
                NodeId::new(*from),
                NodeId::new(*to),
                *edge_type,
            ));
        }
        graph
    }

    #[test]
    fn test_edge_type_layers_are_independent() {
        let graph = make_graph(&[
            ("a", "b", EdgeType::Dependency),
            ("b", "a", EdgeType::Delete),
        ]);

        let deps: Vec<_> = graph
            .successors(&NodeId::new("a"), EdgeType::Dependency)
            .collect();
        assert_eq!(deps, [&NodeId::new("b")]);

        let dels: Vec<_> = graph
            .successors(&NodeId::new("a"), EdgeType::Delete)
            .collect();
        assert!(dels.is_empty());

        assert!(graph.has_edge(&EdgeKey::dependency(NodeId::new("a"), NodeId::new("b"))));
        assert!(!graph.has_edge(&EdgeKey::dependency(NodeId::new("b"), NodeId::new("a"))));
    }

    #[test]
    fn test_any_type_union_is_deduplicated() {
        let graph = make_graph(&[
            ("a", "b", EdgeType::Dependency),
            ("a", "b", EdgeType::Delete),
            ("a", "c", EdgeType::Delete),
        ]);

        let all: Vec<_> = graph.successors_any(&NodeId::new("a")).collect();
        assert_eq!(all, [&NodeId::new("b"), &NodeId::new("c")]);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_unique_root() {
        let graph = make_graph(&[
            ("root", "a", EdgeType::Dependency),
            ("a", "b", EdgeType::Dependency),
        ]);
        assert_eq!(graph.root_id().unwrap(), NodeId::new("root"));
    }

    #[test]
    fn test_multiple_roots_rejected() {
        let graph = make_graph(&[
            ("r1", "a", EdgeType::Dependency),
            ("r2", "a", EdgeType::Dependency),
        ]);
        match graph.root_id() {
            Err(GraphError::RootCount { roots }) => {
                assert_eq!(roots, [NodeId::new("r1"), NodeId::new("r2")]);
            }
            other => panic!("expected RootCount, got {other:?}"),
        }
    }

    #[test]
    fn test_cycle_has_no_root() {
        let graph = make_graph(&[
            ("a", "b", EdgeType::Dependency),
            ("b", "a", EdgeType::Dependency),
        ]);
        match graph.root_id() {
            Err(GraphError::RootCount { roots }) => assert!(roots.is_empty()),
            other => panic!("expected RootCount, got {other:?}"),
        }
    }

    #[test]
    fn test_delete_layer_counts_for_root_detection() {
        // b has only a delete-edge parent, so it is not a root
        let graph = make_graph(&[("a", "b", EdgeType::Delete)]);
        assert_eq!(graph.root_id().unwrap(), NodeId::new("a"));
    }

    #[test]
    fn test_subgraph_keeps_inner_edges_only() {
        let graph = make_graph(&[
            ("a", "b", EdgeType::Dependency),
            ("b", "c", EdgeType::Dependency),
            ("c", "d", EdgeType::Dependency),
        ]);

        let ids: BTreeSet<NodeId> = [NodeId::new("a"), NodeId::new("b"), NodeId::new("d")]
            .into_iter()
            .collect();
        let sub = graph.subgraph(&ids);

        assert_eq!(sub.node_count(), 3);
        assert_eq!(sub.edge_count(), 1);
        assert!(sub.has_edge(&EdgeKey::dependency(NodeId::new("a"), NodeId::new("b"))));
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let mut graph = make_graph(&[
            ("a", "b", EdgeType::Dependency),
            ("b", "c", EdgeType::Dependency),
            ("b", "c", EdgeType::Delete),
        ]);

        assert!(graph.remove_node(&NodeId::new("b")).is_some());
        assert_eq!(graph.edge_count(), 0);
        assert!(graph
            .successors(&NodeId::new("a"), EdgeType::Dependency)
            .next()
            .is_none());
        assert!(graph
            .predecessors(&NodeId::new("c"), EdgeType::Delete)
            .next()
            .is_none());
    }

    #[test]
    fn test_edge_to_undeclared_id_is_stored() {
        let mut graph = ResourceGraph::new();
        graph.insert_node(make_node("a"));
        graph.insert_edge(EdgeKey::dependency(NodeId::new("a"), NodeId::new("ghost")));

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 1);
        assert!(!graph.contains_node(&NodeId::new("ghost")));
    }
}
