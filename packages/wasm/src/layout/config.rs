//! Tree layout configuration.

use serde::{Deserialize, Serialize};

/// Four-sided padding in depth/spread terms.
///
/// `north` is the side facing the root, `south` the side facing the
/// children, `west`/`east` the low and high spread sides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Padding {
    pub north: f64,
    pub west: f64,
    pub east: f64,
    pub south: f64,
}

impl Padding {
    /// The same padding on all four sides.
    pub const fn uniform(value: f64) -> Self {
        Self {
            north: value,
            west: value,
            east: value,
            south: value,
        }
    }

    /// Read the sides rotated by one step clockwise.
    ///
    /// Applied to nodes under an odd number of orientation toggles.
    pub fn rotated(self) -> Self {
        Self {
            north: self.east,
            east: self.south,
            south: self.west,
            west: self.north,
        }
    }

    /// Negative or non-finite sides become 0.
    pub(crate) fn clamped(self) -> Self {
        let side = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            north: side(self.north),
            west: side(self.west),
            east: side(self.east),
            south: side(self.south),
        }
    }
}

impl Default for Padding {
    fn default() -> Self {
        Self::uniform(2.0)
    }
}

/// How edges between a parent and its children are routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectorStyle {
    /// One segment between the two node boundaries.
    Straight,
    /// An elbow through the depth just below the parent.
    #[default]
    Bent,
}

/// Configuration for the tree layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TreeLayoutConfig {
    /// Depth runs along the y axis (false: along the x axis).
    pub vertical: bool,
    /// Depth grows with the screen axis (down or right).
    pub top_down: bool,
    /// Padding applied around every node (default: 2.0 on all sides).
    pub padding: Padding,
    /// Gap added between generations when computing generation offsets.
    pub generation_padding: f64,
    /// Where a parent sits between its first (0.0) and last (1.0) child.
    pub spread_alignment: f64,
    /// Where a node sits inside its generation band when generations are aligned.
    pub depth_alignment: f64,
    /// Force every node of a generation into the same depth band.
    pub align_generations: bool,
    /// Spread intermediate children evenly between the first and the last.
    pub balance_children: bool,
    /// Connector routing policy.
    pub connectors: ConnectorStyle,
    /// Lay out only the tree of the root, leaving other nodes untouched.
    pub ignore_unreachable: bool,
    /// Report the outline of every tree's contour in the outcome.
    pub debug_contours: bool,
}

impl Default for TreeLayoutConfig {
    fn default() -> Self {
        Self {
            vertical: true,
            top_down: true,
            padding: Padding::default(),
            generation_padding: 4.0,
            spread_alignment: 0.5,
            depth_alignment: 0.5,
            align_generations: false,
            balance_children: false,
            connectors: ConnectorStyle::default(),
            ignore_unreachable: false,
            debug_contours: false,
        }
    }
}

impl TreeLayoutConfig {
    /// Bring every numeric option into its valid range.
    ///
    /// Returns the sanitized copy and whether anything had to change.
    pub fn sanitized(&self) -> (Self, bool) {
        let fraction = |v: f64| {
            if v.is_finite() {
                v.clamp(0.0, 1.0)
            } else {
                0.5
            }
        };

        let mut result = self.clone();
        result.padding = self.padding.clamped();
        result.generation_padding = if self.generation_padding.is_finite() {
            self.generation_padding.max(0.0)
        } else {
            0.0
        };
        result.spread_alignment = fraction(self.spread_alignment);
        result.depth_alignment = fraction(self.depth_alignment);

        let changed = result != *self;
        (result, changed)
    }
}
