//! Graph construction and validation.

use std::sync::Arc;

use serde_json::Value as Json;

use crate::canonical::content_hash;
use crate::error::GraphError;
use crate::flatten::flatten;
use crate::graph::ResourceGraph;
use crate::model::Model;
use crate::types::{EdgeKey, EdgeType, NodeData, NodeId, UpdateRecord};
use crate::{GRAPH_ROOT_KIND, ROOT_ID};

/// Builds one resource graph from a stream of update records.
///
/// Schema validation is delegated to the [`Model`] collaborator; the builder
/// computes the derived node attributes (content hash, kind hierarchy,
/// flattened search text) and enforces the structural invariants before the
/// graph is handed out. One builder per ingestion cycle, consumed by
/// [`GraphBuilder::build`].
pub struct GraphBuilder<M> {
    model: Arc<M>,
    graph: ResourceGraph,
    with_flatten: bool,
    nodes_added: usize,
    edges_added: usize,
}

impl<M: Model> GraphBuilder<M> {
    /// Create a builder around a schema model. Flattening is on by default.
    pub fn new(model: Arc<M>) -> Self {
        Self {
            model,
            graph: ResourceGraph::new(),
            with_flatten: true,
            nodes_added: 0,
            edges_added: 0,
        }
    }

    /// Toggle computation of the flattened search text at build time.
    ///
    /// Skipping it only defers the work: materialization backfills `flat`
    /// on export.
    pub fn with_flatten(mut self, with_flatten: bool) -> Self {
        self.with_flatten = with_flatten;
        self
    }

    /// Number of node records accepted so far.
    pub fn nodes_added(&self) -> usize {
        self.nodes_added
    }

    /// Number of edge records accepted so far.
    pub fn edges_added(&self) -> usize {
        self.edges_added
    }

    /// Decode one raw update record and add it to the graph.
    pub fn add_from_json(&mut self, record: &Json) -> Result<(), GraphError> {
        match UpdateRecord::from_json(record)? {
            UpdateRecord::Node {
                id,
                reported,
                desired,
                metadata,
                merge,
            } => self.add_node(id, reported, desired, metadata, merge),
            UpdateRecord::Edge {
                from,
                to,
                edge_type,
            } => {
                self.add_edge(from, to, edge_type);
                Ok(())
            }
        }
    }

    /// Validate and insert one node with all derived attributes.
    ///
    /// The model may coerce the reported value; a coerced value supersedes
    /// the raw input everywhere, including in the content hash.
    pub fn add_node(
        &mut self,
        id: NodeId,
        reported: Json,
        desired: Option<Json>,
        metadata: Option<Json>,
        merge: bool,
    ) -> Result<(), GraphError> {
        self.nodes_added += 1;
        let reported = match self.model.check_valid(&reported)? {
            Some(coerced) => coerced,
            None => reported,
        };
        let kind = self.model.kind_of(&reported);
        let hash = content_hash(&reported, desired.as_ref(), metadata.as_ref());
        let flat = self.with_flatten.then(|| flatten(&reported));
        let kinds = kind.kind_hierarchy().to_vec();

        self.graph.insert_node(NodeData {
            id,
            reported,
            desired,
            metadata,
            hash: Some(hash),
            kind: Some(kind),
            kinds,
            flat,
            merge,
        });
        Ok(())
    }

    /// Insert one edge between two node ids.
    ///
    /// Endpoints need not be declared yet; completeness checking verifies
    /// them once the stream is exhausted.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, edge_type: EdgeType) {
        self.edges_added += 1;
        self.graph.insert_edge(EdgeKey::new(from, to, edge_type));
    }

    /// Check the structural invariants and normalize the root.
    ///
    /// Every edge endpoint must be a declared node and exactly one root must
    /// exist. Edge-type membership needs no check here: unknown types were
    /// already rejected at record decode. When the root's reported kind is
    /// the virtual-root marker under a non-canonical id, the node is moved
    /// to [`ROOT_ID`] and every outgoing edge follows it.
    pub fn check_complete(&mut self) -> Result<(), GraphError> {
        for key in self.graph.edges() {
            for id in [&key.from, &key.to] {
                if !self.graph.contains_node(id) {
                    return Err(GraphError::UndeclaredNode { id: id.clone() });
                }
            }
        }

        let root = self.graph.root_id()?;
        self.normalize_root(root);
        Ok(())
    }

    /// Run the completeness check and hand out the validated graph.
    pub fn build(mut self) -> Result<ResourceGraph, GraphError> {
        self.check_complete()?;
        tracing::debug!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "graph build complete"
        );
        Ok(self.graph)
    }

    fn normalize_root(&mut self, root: NodeId) {
        if root.as_str() == ROOT_ID {
            return;
        }
        let is_virtual = self
            .graph
            .node(&root)
            .and_then(NodeData::reported_kind)
            .map(|kind| kind == GRAPH_ROOT_KIND)
            .unwrap_or(false);
        if !is_virtual {
            return;
        }

        tracing::debug!(old_id = %root, "renaming virtual root to canonical id");
        let canonical = NodeId::new(ROOT_ID);
        let outgoing: Vec<EdgeKey> = self
            .graph
            .edges()
            .filter(|key| key.from == root)
            .cloned()
            .collect();
        // A root has no incoming edges, so removing the node only drops the
        // outgoing ones collected above.
        if let Some(mut node) = self.graph.remove_node(&root) {
            node.id = canonical.clone();
            self.graph.insert_node(node);
            for key in outgoing {
                self.graph
                    .insert_edge(EdgeKey::new(canonical.clone(), key.to, key.edge_type));
            }
        }
    }
}
