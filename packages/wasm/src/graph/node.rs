//! Node type and related structures.
//!
//! Nodes are the vertices the layout places. Each node has:
//! - A stable unique identifier (survives graph mutations)
//! - A boundary shape, expressed relative to the node's position
//! - A position in graph space, rewritten by every layout call

use std::fmt;

use kurbo::{BezPath, Ellipse, Line, ParamCurve, Point, Rect, Shape};

/// Stable node identifier.
///
/// This ID remains valid even after other nodes are removed from the graph.
/// It wraps a u32 for efficient storage and WebAssembly interop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
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

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// The boundary of a node.
///
/// Shapes live in node-local coordinates: a shape centred on the origin is
/// drawn centred on the node's position. The layout only ever asks a shape
/// for its bounding box and for the point where a segment crosses its
/// outline.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeShape {
    path: BezPath,
    bounds: Rect,
}

impl NodeShape {
    /// Flattening tolerance used when converting curved shapes to paths.
    pub const TOLERANCE: f64 = 0.1;

    /// Wrap an arbitrary kurbo shape.
    pub fn from_shape(shape: &impl Shape) -> Self {
        let path = shape.to_path(Self::TOLERANCE);
        let bounds = if path.elements().is_empty() {
            Rect::ZERO
        } else {
            path.bounding_box()
        };
        Self { path, bounds }
    }

    /// An axis-aligned rectangle of the given size, centred on the node.
    pub fn rect(width: f64, height: f64) -> Self {
        Self::from_shape(&Rect::from_center_size(Point::ZERO, (width, height)))
    }

    /// An ellipse of the given size, centred on the node.
    pub fn ellipse(width: f64, height: f64) -> Self {
        Self::from_shape(&Ellipse::from_rect(Rect::from_center_size(
            Point::ZERO,
            (width, height),
        )))
    }

    /// A shape without extent. Connectors attach to the node's position.
    pub fn point() -> Self {
        Self {
            path: BezPath::new(),
            bounds: Rect::ZERO,
        }
    }

    /// Bounding box in node-local coordinates.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The outline in node-local coordinates.
    #[inline]
    pub fn path(&self) -> &BezPath {
        &self.path
    }

    /// Project the segment `from -> to` onto this shape placed at `at`.
    ///
    /// Returns the crossing with the outline closest to `from`, or `to`
    /// when the segment never crosses it.
    pub fn project(&self, at: Point, from: Point, to: Point) -> Point {
        const SLACK: f64 = 1e-9;

        let offset = at.to_vec2();
        let line = Line::new(from - offset, to - offset);
        self.path
            .segments()
            .flat_map(|segment| segment.intersect_line(line))
            .map(|hit| hit.line_t)
            .filter(|t| (-SLACK..=1.0 + SLACK).contains(t))
            .min_by(f64::total_cmp)
            .map(|t| line.eval(t.clamp(0.0, 1.0)) + offset)
            .unwrap_or(to)
    }
}

impl Default for NodeShape {
    fn default() -> Self {
        Self::point()
    }
}
