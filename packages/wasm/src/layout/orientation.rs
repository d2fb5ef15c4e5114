//! Mapping between screen space and the layout's depth/spread space.
//!
//! The layout only ever reasons about two abstract axes: *depth*, the
//! distance from the root, and *spread*, the axis siblings are packed along.
//! An [`Orientation`] fixes how those axes lie on the screen. Depth always
//! increases away from the root; spread always increases along the positive
//! direction of the remaining screen axis.

use kurbo::{Point, Rect, Vec2};

use super::config::Padding;
use super::contour::Contour;

/// One of the four ways a tree can grow on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// Root at the top, depth along +y.
    #[default]
    TopDown,
    /// Root at the bottom, depth along -y.
    BottomUp,
    /// Root on the left, depth along +x.
    LeftRight,
    /// Root on the right, depth along -x.
    RightLeft,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::TopDown,
        Orientation::BottomUp,
        Orientation::LeftRight,
        Orientation::RightLeft,
    ];

    /// Select an orientation from the axis choice and direction.
    pub fn new(vertical: bool, top_down: bool) -> Self {
        match (vertical, top_down) {
            (true, true) => Orientation::TopDown,
            (true, false) => Orientation::BottomUp,
            (false, true) => Orientation::LeftRight,
            (false, false) => Orientation::RightLeft,
        }
    }

    /// Whether depth runs along the y axis.
    pub fn is_vertical(self) -> bool {
        matches!(self, Orientation::TopDown | Orientation::BottomUp)
    }

    /// The orientation turned by 90 degrees.
    pub fn rotate(self, clockwise: bool) -> Self {
        use Orientation::*;
        match (self, clockwise) {
            (TopDown, true) => RightLeft,
            (RightLeft, true) => BottomUp,
            (BottomUp, true) => LeftRight,
            (LeftRight, true) => TopDown,
            (TopDown, false) => LeftRight,
            (LeftRight, false) => BottomUp,
            (BottomUp, false) => RightLeft,
            (RightLeft, false) => TopDown,
        }
    }

    /// Depth coordinate of a screen point.
    #[inline]
    pub fn depth(self, p: Point) -> f64 {
        match self {
            Orientation::TopDown => p.y,
            Orientation::BottomUp => -p.y,
            Orientation::LeftRight => p.x,
            Orientation::RightLeft => -p.x,
        }
    }

    /// Spread coordinate of a screen point.
    #[inline]
    pub fn spread(self, p: Point) -> f64 {
        if self.is_vertical() { p.x } else { p.y }
    }

    /// Screen displacement for a move in depth/spread space.
    #[inline]
    pub fn vector(self, depth: f64, spread: f64) -> Vec2 {
        match self {
            Orientation::TopDown => Vec2::new(spread, depth),
            Orientation::BottomUp => Vec2::new(spread, -depth),
            Orientation::LeftRight => Vec2::new(depth, spread),
            Orientation::RightLeft => Vec2::new(-depth, spread),
        }
    }

    /// Screen point for a depth/spread pair.
    #[inline]
    pub fn point(self, depth: f64, spread: f64) -> Point {
        self.vector(depth, spread).to_point()
    }

    /// The contour covering a screen rectangle.
    pub fn contour(self, rect: Rect) -> Contour {
        let a = rect.origin();
        let b = Point::new(rect.x1, rect.y1);
        let (da, db) = (self.depth(a), self.depth(b));
        let (sa, sb) = (self.spread(a), self.spread(b));
        Contour::new(da.min(db), sa.min(sb), sa.max(sb), da.max(db))
    }

    /// The contour covering a screen rectangle grown by `padding`.
    pub fn padded_contour(self, rect: Rect, padding: &Padding) -> Contour {
        let mut contour = self.contour(rect);
        contour.north -= padding.north;
        contour.west -= padding.west;
        contour.east += padding.east;
        contour.south += padding.south;
        contour
    }

    /// The screen rectangle spanned by a contour's extents.
    pub fn bounds(self, contour: &Contour) -> Rect {
        Rect::from_points(
            self.point(contour.north, contour.west),
            self.point(contour.south, contour.east),
        )
    }
}
