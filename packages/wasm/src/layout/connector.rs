//! Connector routing between a parent and its children.
//!
//! All routes are computed in depth/spread terms through the active
//! [`Orientation`] and converted back to screen points, so every policy
//! works the same way in all four orientations. Paths run from the edge's
//! source to its target and start and end on the node outlines.

use kurbo::{Point, Vec2};

use super::config::ConnectorStyle;
use super::orientation::Orientation;
use crate::graph::NodeShape;

/// One end of a connector: a shape placed at a position.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Endpoint<'a> {
    pub(crate) shape: &'a NodeShape,
    pub(crate) position: Point,
}

impl<'a> Endpoint<'a> {
    pub(crate) fn new(shape: &'a NodeShape, position: Point) -> Self {
        Self { shape, position }
    }

    fn project(&self, from: Point, to: Point) -> Point {
        self.shape.project(self.position, from, to)
    }
}

/// Route an edge between two different nodes.
///
/// `equator` is the depth bent connectors turn at.
pub(crate) fn route(
    style: ConnectorStyle,
    orientation: Orientation,
    equator: f64,
    source: Endpoint<'_>,
    target: Endpoint<'_>,
) -> Vec<Point> {
    match style {
        ConnectorStyle::Straight => straight(orientation, source, target),
        ConnectorStyle::Bent => bent(orientation, equator, source, target),
    }
}

/// A single segment leaving each node along the depth axis.
pub(crate) fn straight(o: Orientation, source: Endpoint<'_>, target: Endpoint<'_>) -> Vec<Point> {
    let (p1, p2) = (source.position, target.position);
    let a = source.project(p1, o.point(o.depth(p2), o.spread(p1)));
    let b = target.project(p2, o.point(o.depth(a), o.spread(p2)));
    vec![a, b]
}

/// An elbow through the equator.
pub(crate) fn bent(
    o: Orientation,
    equator: f64,
    source: Endpoint<'_>,
    target: Endpoint<'_>,
) -> Vec<Point> {
    let (p1, p4) = (source.position, target.position);
    if o.spread(p1) == o.spread(p4) {
        return straight(o, source, target);
    }

    let turns = if equator == o.depth(p1) {
        vec![o.point(equator, o.spread(p4))]
    } else if equator == o.depth(p4) {
        vec![o.point(equator, o.spread(p1))]
    } else {
        vec![o.point(equator, o.spread(p1)), o.point(equator, o.spread(p4))]
    };

    let mut path = Vec::with_capacity(turns.len() + 2);
    path.push(source.project(turns[0], p1));
    path.extend_from_slice(&turns);
    path.push(target.project(turns[turns.len() - 1], p4));
    path
}

/// A rectangular loop leaving the node east and coming back from the south.
pub(crate) fn self_loop(node: Endpoint<'_>) -> Vec<Point> {
    let bounds = node.shape.bounds();
    let width = bounds.x1 + bounds.width() / 4.0;
    let height = bounds.y1 + bounds.height() / 4.0;

    let a = node.position;
    let b = a + Vec2::new(width, 0.0);
    let c = a + Vec2::new(width, height);
    let d = a + Vec2::new(0.0, height);
    vec![node.project(b, a), b, c, d, node.project(d, a)]
}
