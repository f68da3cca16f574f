//! Read view over a finalized graph snapshot.
//!
//! [`GraphAccess`] is what the persistence layer consumes: it materializes
//! node documents (ancestor resolution plus lazy backfill of derived
//! fields) and tracks which nodes and edges the consumer has seen. The
//! complement of the visited sets drives deletion detection, so `node()`
//! and `has_edge()` record every lookup.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde_json::Value as Json;

use crate::canonical::content_hash;
use crate::error::GraphError;
use crate::flatten::flatten;
use crate::graph::ResourceGraph;
use crate::resolve::{value_in_path, ResolverTable};
use crate::types::{EdgeKey, EdgeType, NodeData, NodeId, Section};

/// Read-oriented access over one graph snapshot.
///
/// Owns the snapshot; the arena stays immutable while documents are
/// materialized on the way out. Visited tracking lives here, not in the
/// graph, so several accesses over subgraphs of one build can each keep
/// their own diff state.
#[derive(Debug)]
pub struct GraphAccess {
    graph: ResourceGraph,
    maybe_root: Option<NodeId>,
    visited_nodes: BTreeSet<NodeId>,
    visited_edges: BTreeSet<EdgeKey>,
    resolvers: ResolverTable,
    at: DateTime<Utc>,
}

impl GraphAccess {
    /// Create an access over a snapshot with the standard resolver table.
    pub fn new(graph: ResourceGraph) -> Self {
        Self {
            graph,
            maybe_root: None,
            visited_nodes: BTreeSet::new(),
            visited_edges: BTreeSet::new(),
            resolvers: ResolverTable::default(),
            at: Utc::now(),
        }
    }

    /// Override the root instead of computing it from in-degrees. Used for
    /// subgraph views whose logical root is not in-degree zero within the
    /// whole graph.
    pub fn with_root(mut self, root: NodeId) -> Self {
        self.maybe_root = Some(root);
        self
    }

    /// Replace the resolver table.
    pub fn with_resolvers(mut self, resolvers: ResolverTable) -> Self {
        self.resolvers = resolvers;
        self
    }

    /// Seed the visited node set.
    pub fn with_visited_nodes(mut self, nodes: BTreeSet<NodeId>) -> Self {
        self.visited_nodes = nodes;
        self
    }

    /// Seed the visited edge set.
    pub fn with_visited_edges(mut self, edges: BTreeSet<EdgeKey>) -> Self {
        self.visited_edges = edges;
        self
    }

    /// When this access was created.
    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }

    /// The underlying snapshot.
    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    /// The root id: the override when set, otherwise the unique
    /// in-degree-zero node.
    pub fn root(&self) -> Result<NodeId, GraphError> {
        match &self.maybe_root {
            Some(root) => Ok(root.clone()),
            None => self.graph.root_id(),
        }
    }

    /// Materialize one node document, marking the id as visited.
    ///
    /// The id is recorded even when no such node exists; a consumer asking
    /// for it has seen it as far as diffing is concerned.
    pub fn node(&mut self, id: &NodeId) -> Option<Json> {
        self.visited_nodes.insert(id.clone());
        let node = self.graph.node(id)?.clone();
        Some(self.materialize(node))
    }

    /// Whether the exact edge exists, marking it visited on a positive
    /// answer.
    pub fn has_edge(&mut self, from: &NodeId, to: &NodeId, edge_type: EdgeType) -> bool {
        let key = EdgeKey::new(from.clone(), to.clone(), edge_type);
        let result = self.graph.has_edge(&key);
        if result {
            self.visited_edges.insert(key);
        }
        result
    }

    /// Predecessors of a node along one edge type, in id order.
    pub fn predecessors(
        &self,
        id: &NodeId,
        edge_type: EdgeType,
    ) -> impl Iterator<Item = &NodeId> + '_ {
        self.graph.predecessors(id, edge_type)
    }

    /// Successors of a node along one edge type, in id order.
    pub fn successors(
        &self,
        id: &NodeId,
        edge_type: EdgeType,
    ) -> impl Iterator<Item = &NodeId> + '_ {
        self.graph.successors(id, edge_type)
    }

    /// The nearest ancestor along `edge_type` whose kind hierarchy contains
    /// `kind`.
    ///
    /// Depth-first over predecessors, smallest id first, each chain
    /// exhausted before the next sibling. The walk carries a visited guard,
    /// so cyclic input (a data-integrity violation, not expected behavior)
    /// terminates instead of recursing forever.
    pub fn ancestor_of(
        &self,
        id: &NodeId,
        edge_type: EdgeType,
        kind: &str,
    ) -> Option<&NodeData> {
        let mut visited: BTreeSet<&NodeId> = BTreeSet::new();
        let mut stack: Vec<&NodeId> = self.graph.predecessors(id, edge_type).collect();
        stack.reverse();

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(node) = self.graph.node(current) {
                if node.kinds.iter().any(|k| k == kind) {
                    return Some(node);
                }
            }
            let mut parents: Vec<&NodeId> = self.graph.predecessors(current, edge_type).collect();
            parents.reverse();
            stack.extend(parents);
        }
        None
    }

    /// Materialize one node without ancestor resolution, backfilling any
    /// missing derived fields. Covers nodes loaded from storage rather than
    /// freshly built.
    pub fn dump_direct(node: &NodeData) -> Json {
        let mut node = node.clone();
        Self::finalize(&mut node);
        node.to_document()
    }

    /// Lazily materialized documents of every node not yet visited.
    pub fn not_visited_nodes(&self) -> impl Iterator<Item = Json> + '_ {
        self.graph
            .nodes()
            .filter(|node| !self.visited_nodes.contains(&node.id))
            .map(|node| self.materialize(node.clone()))
    }

    /// Every edge of one type not yet visited, as (from, to) pairs.
    pub fn not_visited_edges(
        &self,
        edge_type: EdgeType,
    ) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.graph
            .edges()
            .filter(move |key| key.edge_type == edge_type && !self.visited_edges.contains(key))
            .map(|key| (key.from.clone(), key.to.clone()))
    }

    /// Nodes marked visited so far.
    pub fn visited_nodes(&self) -> &BTreeSet<NodeId> {
        &self.visited_nodes
    }

    /// Edges marked visited so far.
    pub fn visited_edges(&self) -> &BTreeSet<EdgeKey> {
        &self.visited_edges
    }

    /// Copy resolved ancestor attributes into the node per the resolver
    /// table. Writes land in the configured section, which is created on
    /// first use; a write into a section that exists as a non-object is
    /// dropped rather than clobbering it.
    ///
    /// `node()` and the complement iterators run this on the way out; the
    /// entry point exists for callers materializing nodes themselves.
    pub fn resolve_into(&self, node: &mut NodeData) {
        let id = node.id.clone();
        for resolver in self.resolvers.rules() {
            let Some(ancestor) = self.ancestor_of(&id, EdgeType::Dependency, &resolver.kind)
            else {
                continue;
            };
            for prop in &resolver.props {
                let Some((first, rest)) = prop.extract_path.split_first() else {
                    continue;
                };
                let Some(base) = Section::from_str(first).and_then(|s| ancestor.section(s))
                else {
                    continue;
                };
                if let Some(value) = value_in_path(base, rest) {
                    if let Some(target) = node.section_mut(prop.section).as_object_mut() {
                        target.insert(prop.name.clone(), value.clone());
                    }
                }
            }
        }
    }

    /// Resolution runs before finalization: a hash computed lazily covers
    /// resolved values, while a hash computed at build time (before
    /// resolution) is preserved as the change-detection fingerprint.
    fn materialize(&self, mut node: NodeData) -> Json {
        self.resolve_into(&mut node);
        Self::finalize(&mut node);
        node.to_document()
    }

    fn finalize(node: &mut NodeData) {
        if node.hash.is_none() {
            node.hash = Some(content_hash(
                &node.reported,
                node.desired.as_ref(),
                node.metadata.as_ref(),
            ));
        }
        if node.flat.is_none() {
            node.flat = Some(flatten(&node.reported));
        }
        if node.kinds.is_empty() {
            if let Some(kind) = node.reported_kind() {
                node.kinds = vec![kind.to_string()];
            }
        }
    }
}
