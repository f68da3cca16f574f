//! # inventory-graph-kernel
//!
//! Deterministic graph construction and decomposition for cloud resource
//! inventories.
//!
//! The Graph Kernel answers one question:
//!
//! > Given a stream of collected resources and dependencies, which parts of
//! > the resulting graph can be **merged independently and safely**?
//!
//! ## Core Contract
//!
//! 1. Build a validated, single-rooted resource graph from boundary records
//! 2. Fingerprint every node with a **content hash** over its canonical form
//! 3. Decompose an update into disjoint subgraphs mergeable without locks
//!
//! ## Architecture
//!
//! ```text
//! UpdateRecord → GraphBuilder → ResourceGraph → merge_graphs → GraphMerge
//!                     ↓                                ↓
//!                   Model                    GraphAccess (per merge root)
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same reported content in any key order → identical node hash
//! - Node ordering is canonical (by NodeId)
//! - Edge ordering is canonical (from, to, edge type)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod model;
pub mod resolve;
pub mod canonical;
pub mod flatten;
pub mod graph;
pub mod builder;
pub mod access;
pub mod merge;
pub mod error;

// Re-exports
pub use types::{EdgeKey, EdgeType, NodeData, NodeId, Section, UpdateRecord};
pub use model::{Kind, Model, StaticModel, ValidationError};
pub use resolve::{AncestorResolver, ResolveProp, ResolverTable};
pub use canonical::{content_hash, to_canonical_bytes};
pub use flatten::flatten;
pub use graph::ResourceGraph;
pub use builder::GraphBuilder;
pub use access::GraphAccess;
pub use merge::{merge_graphs, GraphMerge, MergeSubGraphs};
pub use error::GraphError;

/// Canonical id of the graph root node.
pub const ROOT_ID: &str = "root";

/// Reported kind marking a virtual placeholder root that is renamed to
/// [`ROOT_ID`] during completion checks.
pub const GRAPH_ROOT_KIND: &str = "graph_root";
