//! Edge type and related structures.
//!
//! Edges are the connections between nodes. Each edge has:
//! - A stable unique identifier
//! - Source and target node IDs
//! - A routed path, rewritten by every layout call

use std::fmt;

use kurbo::{BezPath, Point, Vec2};

/// Stable edge identifier.
///
/// This ID remains valid even after other edges are removed from the graph.
/// IDs are handed out in creation order, which is also the order in which
/// a node's children are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// Create a new EdgeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({})", self.0)
    }
}

impl From<u32> for EdgeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<EdgeId> for u32 {
    #[inline]
    fn from(id: EdgeId) -> Self {
        id.0
    }
}

/// Build a renderable polyline from a routed edge path.
pub fn polyline(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let mut points = points.iter();
    if let Some(&first) = points.next() {
        path.move_to(first);
        for &point in points {
            path.line_to(point);
        }
    }
    path
}

/// Shift every point of a path by `delta`.
pub(crate) fn translate(points: &mut [Point], delta: Vec2) {
    for point in points {
        *point += delta;
    }
}
