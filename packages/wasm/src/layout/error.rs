//! Layout errors.

use thiserror::Error;

use crate::graph::{EdgeId, NodeId};

/// Why a layout call was rejected.
///
/// Nothing is written to the graph when a layout fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The graph is not a tree from the chosen root: `edge` leads back to
    /// `node`, which was already placed.
    #[error("{edge} to {node} is part of a cycle")]
    Cycle { edge: EdgeId, node: NodeId },

    /// The requested root is not part of the graph.
    #[error("unknown root {0}")]
    UnknownNode(NodeId),
}

impl LayoutError {
    /// Errors caused by the shape of the graph rather than by the request.
    pub fn is_structural(&self) -> bool {
        matches!(self, LayoutError::Cycle { .. })
    }
}
