//! Error taxonomy for the build / access / decompose pass.

use thiserror::Error;

use crate::model::ValidationError;
use crate::types::NodeId;

/// Fatal errors raised while building, validating, or decomposing a graph.
///
/// Every variant aborts the surrounding pass. Nothing is retried and no
/// partially validated graph is ever handed out.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A raw update record matched neither the node nor the edge shape.
    #[error("invalid update record, expected node or edge shape: {record}")]
    InvalidFormat {
        /// The rejected record, serialized back to JSON.
        record: String,
    },

    /// The schema model rejected a node's reported section.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An edge references an id that was never declared as a node.
    #[error("edge references undeclared node: {id}")]
    UndeclaredNode {
        /// The undeclared id.
        id: NodeId,
    },

    /// The graph does not have exactly one root.
    #[error("graph must have exactly one root, found {}: {roots:?}", roots.len())]
    RootCount {
        /// Every in-degree-zero node found. Empty when the graph has none.
        roots: Vec<NodeId>,
    },

    /// Merge decomposition was requested on a graph without merge nodes.
    #[error("graph contains no merge nodes")]
    NoMergeNodes,

    /// Two merge roots claim at least one node in common.
    #[error("nodes are referenced by more than one merge root: {nodes:?}")]
    OverlappingMergeRoots {
        /// The contested nodes.
        nodes: Vec<NodeId>,
    },

    /// A merge node is not reachable from the graph root.
    #[error("merge node {node} is not reachable from the root")]
    UnreachableMergeNode {
        /// The unreachable merge node.
        node: NodeId,
    },
}
