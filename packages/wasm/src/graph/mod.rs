//! Graph data structures and operations.
//!
//! The graph is a petgraph `StableGraph` of shaped nodes and routed edges.
//! Callers address nodes and edges through stable ids that survive removals.

pub(crate) mod edge;
mod engine;
mod node;

pub use edge::{EdgeId, polyline};
pub use engine::LayoutGraph;
pub use node::{NodeId, NodeShape};
