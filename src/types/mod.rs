//! Core types for the graph kernel.

pub mod edge;
pub mod node;
pub mod record;
pub mod section;

pub use edge::{EdgeKey, EdgeType};
pub use node::{NodeData, NodeId};
pub use record::UpdateRecord;
pub use section::Section;
