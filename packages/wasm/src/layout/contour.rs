//! Subtree silhouettes in depth/spread space.
//!
//! A [`Contour`] describes the area a subtree occupies as it extends from
//! north (towards the root) to south, with a west and east extension:
//!
//! ```text
//!        spread ->
//!  d       +-+
//!  e       | |          north
//!  p     +-+ +---+        ^
//!  t     |       |  west <+> east
//!  h   +-+       |        v
//!  |   |         |      south
//!  v   +---------+
//! ```
//!
//! A plain contour is a rectangle given by its four extents. A merged
//! contour also records the west and east boundaries as staircases: a list
//! of steps, each holding the spread of the boundary and the depth where the
//! step ends. Steps are ordered north to south and the last step always ends
//! at the contour's south. Translating a contour accumulates an offset
//! instead of rewriting the steps, and clones share their steps.

use std::sync::Arc;

use kurbo::BezPath;

use super::orientation::Orientation;

/// One of the two boundaries of a contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    West,
    East,
}

/// A stretch of boundary at a fixed spread between two depths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Depth where the segment starts.
    pub near: f64,
    /// Depth where the segment ends.
    pub far: f64,
    /// Spread of the boundary along the segment.
    pub spread: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Step {
    spread: f64,
    far: f64,
}

#[derive(Debug, PartialEq)]
struct Profile {
    west: Vec<Step>,
    east: Vec<Step>,
}

/// The occupied area of a (sub)tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contour {
    pub north: f64,
    pub west: f64,
    pub east: f64,
    pub south: f64,
    depth_offset: f64,
    spread_offset: f64,
    profile: Option<Arc<Profile>>,
}

impl Contour {
    /// A rectangular contour.
    pub fn new(north: f64, west: f64, east: f64, south: f64) -> Self {
        Self {
            north,
            west,
            east,
            south,
            ..Self::default()
        }
    }

    /// Whether the contour carries staircase boundaries.
    pub fn is_stepped(&self) -> bool {
        self.profile.is_some()
    }

    /// Number of segments on the longer of the two boundaries.
    pub fn segment_count(&self) -> usize {
        self.profile
            .as_ref()
            .map_or(1, |p| p.west.len().max(p.east.len()))
    }

    /// Move the contour in place.
    pub fn translate(&mut self, depth: f64, spread: f64) {
        self.north += depth;
        self.south += depth;
        self.west += spread;
        self.east += spread;
        self.depth_offset += depth;
        self.spread_offset += spread;
    }

    /// A moved copy of the contour. The steps are shared, not copied.
    pub fn translated(&self, depth: f64, spread: f64) -> Self {
        let mut result = self.clone();
        result.translate(depth, spread);
        result
    }

    /// Walk one boundary from north to south.
    pub fn cursor(&self, side: Side) -> ContourCursor<'_> {
        ContourCursor::new(self, side)
    }

    /// All segments of one boundary, north to south.
    pub fn segments(&self, side: Side) -> Vec<Segment> {
        let mut cursor = self.cursor(side);
        let mut result = vec![cursor.segment()];
        while cursor.advance() {
            result.push(cursor.segment());
        }
        result
    }

    fn steps(&self, side: Side) -> &[Step] {
        match (&self.profile, side) {
            (Some(profile), Side::West) => &profile.west,
            (Some(profile), Side::East) => &profile.east,
            (None, _) => &[],
        }
    }

    /// Merge contours into the hull of all of them.
    ///
    /// The east boundary is collected from the last contour back to the
    /// first, the west boundary from the first to the last. A contour only
    /// contributes the parts of its boundary south of what was already
    /// collected. Contours are expected to be listed west to east, the
    /// result's north is the first contour's north.
    ///
    /// A single contour, or a list of identical ones, is returned as is.
    /// An empty list yields an empty contour at the origin.
    pub fn merge(contours: &[Contour]) -> Contour {
        let Some((first, rest)) = contours.split_first() else {
            return Contour::default();
        };
        if rest.iter().all(|c| c == first) {
            return first.clone();
        }

        let capacity = contours.iter().map(Contour::segment_count).sum();
        let (east, _) = collect_side(contours.iter().rev(), Side::East, capacity);
        let (west, south) = collect_side(contours.iter(), Side::West, capacity);

        let extreme = |steps: &[Step], pick: fn(f64, f64) -> f64, start: f64| {
            steps.iter().map(|s| s.spread).fold(start, pick)
        };

        Contour {
            north: first.north,
            west: extreme(&west, f64::min, f64::INFINITY),
            east: extreme(&east, f64::max, f64::NEG_INFINITY),
            south,
            depth_offset: 0.0,
            spread_offset: 0.0,
            profile: Some(Arc::new(Profile { west, east })),
        }
    }

    /// Trace the contour's boundaries as a screen path.
    pub fn outline(&self, orientation: Orientation) -> BezPath {
        let mut path = BezPath::new();

        let west = self.segments(Side::West);
        let start = orientation.point(self.north, west[0].spread);
        path.move_to(start);
        for s in &west {
            path.line_to(orientation.point(s.near, s.spread));
            path.line_to(orientation.point(s.far, s.spread));
        }
        let bottom = path.elements().last().and_then(|e| e.end_point());

        path.move_to(start);
        for s in self.segments(Side::East) {
            path.line_to(orientation.point(s.near, s.spread));
            path.line_to(orientation.point(s.far, s.spread));
        }
        if let Some(bottom) = bottom {
            path.line_to(bottom);
        }
        path
    }
}

/// Thread one side of several contours into a single staircase.
fn collect_side<'a>(
    contours: impl Iterator<Item = &'a Contour>,
    side: Side,
    capacity: usize,
) -> (Vec<Step>, f64) {
    let mut steps = Vec::with_capacity(capacity);
    let mut south = f64::NEG_INFINITY;

    'contours: for contour in contours {
        let mut cursor = contour.cursor(side);
        while cursor.far() <= south {
            if !cursor.advance() {
                continue 'contours;
            }
        }
        loop {
            steps.push(Step {
                spread: cursor.spread(),
                far: cursor.far(),
            });
            south = cursor.far();
            if !cursor.advance() {
                break;
            }
        }
    }

    (steps, south)
}

/// Iterates the segments of one contour boundary from north to south.
#[derive(Debug, Clone)]
pub struct ContourCursor<'a> {
    contour: &'a Contour,
    steps: &'a [Step],
    next: usize,
    current: Segment,
}

impl<'a> ContourCursor<'a> {
    fn new(contour: &'a Contour, side: Side) -> Self {
        let steps = contour.steps(side);
        let mut cursor = Self {
            contour,
            steps,
            next: 0,
            current: Segment {
                near: contour.north,
                far: contour.south,
                spread: match side {
                    Side::West => contour.west,
                    Side::East => contour.east,
                },
            },
        };
        if !steps.is_empty() {
            cursor.current.far = contour.north;
            cursor.advance();
        }
        cursor
    }

    /// The segment under the cursor.
    #[inline]
    pub fn segment(&self) -> Segment {
        self.current
    }

    #[inline]
    pub fn near(&self) -> f64 {
        self.current.near
    }

    #[inline]
    pub fn far(&self) -> f64 {
        self.current.far
    }

    #[inline]
    pub fn spread(&self) -> f64 {
        self.current.spread
    }

    /// Move to the next segment. Returns false when there is none.
    pub fn advance(&mut self) -> bool {
        let Some(step) = self.steps.get(self.next) else {
            return false;
        };
        self.next += 1;
        self.current.near = self.current.far;
        self.current.spread = self.contour.spread_offset + step.spread;
        self.current.far = if self.next == self.steps.len() {
            self.contour.south
        } else {
            self.contour.depth_offset + step.far
        };
        true
    }
}

/// How far `next` can move towards negative spread before touching any of
/// the already `placed` contours.
///
/// `placed` lists siblings west to east; only depth ranges where both
/// boundaries exist are compared. Each depth of `next` is checked against
/// the east-most placed sibling reaching that depth. Returns infinity when
/// no depth range is shared.
pub fn min_distance(placed: &[Contour], next: &Contour) -> f64 {
    let mut result = f64::INFINITY;
    let mut probe = next.cursor(Side::West);

    'placed: for contour in placed.iter().rev() {
        let mut wall = contour.cursor(Side::East);
        loop {
            // skip wall segments north of the probe
            while wall.far() <= probe.near() {
                if !wall.advance() {
                    continue 'placed;
                }
            }
            // skip probe segments north of the wall
            while probe.far() <= wall.near() {
                if !probe.advance() {
                    break 'placed;
                }
            }

            result = result.min(probe.spread() - wall.spread());

            if wall.far() < probe.far() {
                if !wall.advance() {
                    continue 'placed;
                }
            } else if !probe.advance() {
                break 'placed;
            }
        }
    }

    result
}
