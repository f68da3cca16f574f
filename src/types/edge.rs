//! Edge types and composite edge identity.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::node::NodeId;

/// Type of a directed edge between resource nodes.
///
/// The same pair of nodes may be connected once per edge type, so the two
/// relations form independent layers over one node set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    /// Logical dependency between resources. The main relation, assumed
    /// when no type is given.
    Dependency,
    /// Order of delete operations: a resource can be deleted once all its
    /// outgoing delete targets are deleted.
    Delete,
}

impl EdgeType {
    /// All known edge types.
    pub const ALL: [EdgeType; 2] = [EdgeType::Dependency, EdgeType::Delete];

    /// Parse an edge type from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "dependency" | "" => Some(Self::Dependency),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

impl Default for EdgeType {
    fn default() -> Self {
        Self::Dependency
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dependency => write!(f, "dependency"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Composite identity of a directed edge.
///
/// The `(from, to, edge_type)` triple is the full identity; it stays
/// collision-free for arbitrary id strings, unlike a delimiter-joined key.
/// Implements `Ord` for deterministic ordering: (from, to, edge_type).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    /// Source node.
    pub from: NodeId,
    /// Target node.
    pub to: NodeId,
    /// Type of edge.
    pub edge_type: EdgeType,
}

impl EdgeKey {
    /// Create a new edge key.
    pub fn new(from: NodeId, to: NodeId, edge_type: EdgeType) -> Self {
        Self {
            from,
            to,
            edge_type,
        }
    }

    /// Create a dependency edge key.
    pub fn dependency(from: NodeId, to: NodeId) -> Self {
        Self::new(from, to, EdgeType::Dependency)
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -{}-> {}", self.from, self.edge_type, self.to)
    }
}

// Canonical ordering: from, then to, then edge_type
impl PartialOrd for EdgeKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EdgeKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.from.cmp(&other.from) {
            std::cmp::Ordering::Equal => match self.to.cmp(&other.to) {
                std::cmp::Ordering::Equal => self.edge_type.cmp(&other.edge_type),
                ord => ord,
            },
            ord => ord,
        }
    }
}
