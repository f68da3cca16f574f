//! Boundary decode of raw update records.

use serde::Deserialize;
use serde_json::Value as Json;

use super::edge::EdgeType;
use super::node::NodeId;
use crate::error::GraphError;

/// One record of an update stream, after shape dispatch.
///
/// Records arrive as plain JSON objects. The presence of `id` and `reported`
/// selects the node shape; `from` and `to` select the edge shape. Everything
/// else, including an edge with an unknown `edge_type` string, is rejected
/// here so nothing malformed reaches the graph.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UpdateRecord {
    /// Declares a node and its document sections.
    Node {
        /// Node identifier.
        id: NodeId,
        /// State gathered by the collector. Mandatory for the node shape.
        reported: Json,
        /// Requested target state.
        #[serde(default)]
        desired: Option<Json>,
        /// Annotations derived during import.
        #[serde(default)]
        metadata: Option<Json>,
        /// Marks the node as a merge boundary. Defaults to false.
        #[serde(default)]
        merge: bool,
    },
    /// Declares a directed edge between two node ids.
    Edge {
        /// Source node id.
        from: NodeId,
        /// Target node id.
        to: NodeId,
        /// Edge type. Dependency when omitted.
        #[serde(default)]
        edge_type: EdgeType,
    },
}

impl UpdateRecord {
    /// Decode a raw JSON record, mapping any shape failure to a format
    /// error naming the offending record.
    pub fn from_json(value: &Json) -> Result<Self, GraphError> {
        serde_json::from_value(value.clone()).map_err(|_| GraphError::InvalidFormat {
            record: value.to_string(),
        })
    }
}
