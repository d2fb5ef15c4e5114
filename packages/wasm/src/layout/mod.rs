//! Contour-based tree layout.
//!
//! This module places the nodes of a [`LayoutGraph`] as a tree (or a forest
//! of trees) so that no two subtrees overlap, and routes every edge. Node
//! shapes can be arbitrary; subtrees are packed by their contours, not by
//! their bounding boxes, so a small subtree can tuck in next to a deep one.
//!
//! The layout runs in two phases. First every tree of the forest is
//! analysed and laid out into scratch buffers. Only when every tree has
//! succeeded are positions and paths written back to the graph, so a
//! failing call leaves the graph untouched.

mod algorithm;
mod config;
mod connector;
mod contour;
mod error;
mod orientation;
mod tree;

pub use config::{ConnectorStyle, Padding, TreeLayoutConfig};
pub use contour::{Contour, ContourCursor, Segment, Side, min_distance};
pub use error::LayoutError;
pub use orientation::Orientation;

use std::collections::HashSet;

use kurbo::{BezPath, Rect};
use tracing::{debug, warn};

use crate::graph::{LayoutGraph, NodeId};
use algorithm::{Anchor, LayoutPass, PlacedTree};
use tree::Tree;

/// Summary of a finished layout.
#[derive(Debug, Clone, Default)]
pub struct LayoutOutcome {
    /// Bounding rectangle of every laid-out tree, padding included.
    pub bounds: Rect,
    /// Number of trees laid out.
    pub trees: usize,
    /// Number of nodes placed.
    pub nodes: usize,
    /// One contour outline per tree when `debug_contours` is set.
    pub contour_outlines: Vec<BezPath>,
}

/// The tree layout engine.
#[derive(Debug, Clone, Default)]
pub struct TreeLayout {
    config: TreeLayoutConfig,
    root: Option<NodeId>,
    toggles: HashSet<NodeId>,
}

impl TreeLayout {
    /// Create a new tree layout with the given configuration.
    pub fn new(config: TreeLayoutConfig) -> Self {
        Self {
            config,
            root: None,
            toggles: HashSet::new(),
        }
    }

    /// Create a tree layout with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TreeLayoutConfig::default())
    }

    pub fn config(&self) -> &TreeLayoutConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TreeLayoutConfig) {
        self.config = config;
    }

    /// Choose the root of the first tree. `None` picks the lowest node id.
    pub fn set_root(&mut self, root: Option<NodeId>) {
        self.root = root;
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Flip whether the branch below `node` grows at a right angle to its
    /// parent. Returns whether the node is toggled afterwards.
    pub fn toggle_orientation(&mut self, node: NodeId) -> bool {
        if self.toggles.remove(&node) {
            false
        } else {
            self.toggles.insert(node);
            true
        }
    }

    pub fn is_toggled(&self, node: NodeId) -> bool {
        self.toggles.contains(&node)
    }

    /// Drop the root choice and toggle of a node that left the graph.
    pub fn forget_node(&mut self, node: NodeId) {
        self.toggles.remove(&node);
        if self.root == Some(node) {
            self.root = None;
        }
    }

    /// Drop every per-node setting, keeping the configuration.
    pub fn forget_nodes(&mut self) {
        self.toggles.clear();
        self.root = None;
    }

    /// Lay out the graph, writing node positions and edge paths.
    ///
    /// The first tree keeps its root where it is. Nodes the first tree does
    /// not reach start further trees (unless `ignore_unreachable` is set),
    /// each placed below the previous one and aligned with the first tree's
    /// low-spread edge. On error nothing is written.
    pub fn layout(&self, graph: &mut LayoutGraph) -> Result<LayoutOutcome, LayoutError> {
        let (config, clamped) = self.config.sanitized();
        let orientation = Orientation::new(config.vertical, config.top_down);

        let ids = graph.node_ids();
        let first = match self.root {
            Some(root) if !graph.contains_node(root) => return Err(LayoutError::UnknownNode(root)),
            Some(root) => root,
            None => match ids.first() {
                Some(&first) => first,
                None => return Ok(LayoutOutcome::default()),
            },
        };

        // Analyse the whole forest before placing anything.
        let mut trees = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(first);
        while let Some(root) = next {
            let index = graph.index_of(root).ok_or(LayoutError::UnknownNode(root))?;
            let tree = Tree::analyze(graph, index, orientation, config.generation_padding)?;
            visited.extend(tree.node_indices());
            trees.push(tree);

            if config.ignore_unreachable {
                break;
            }
            next = ids.iter().copied().find(|&id| {
                graph
                    .index_of(id)
                    .is_some_and(|index| !visited.contains(&index))
            });
        }

        let overrides = visited
            .iter()
            .filter_map(|&index| graph.node_at(index).padding)
            .filter(|padding| padding.clamped() != *padding)
            .count();
        if clamped || overrides > 0 {
            warn!(
                config = ?self.config,
                overrides,
                "tree layout padding or alignment out of range, clamped"
            );
        }

        let mut placed: Vec<PlacedTree> = Vec::with_capacity(trees.len());
        let mut extent: Option<Contour> = None;
        for tree in &trees {
            let anchor = match &extent {
                None => Anchor::Root,
                Some(extent) => Anchor::NorthWest {
                    north: extent.south,
                    west: extent.west,
                },
            };
            let result = LayoutPass::new(graph, tree, &config, &self.toggles).run(orientation, anchor);

            let c = &result.contour;
            extent = Some(match extent {
                None => Contour::new(c.north, c.west, c.east, c.south),
                Some(e) => Contour::new(e.north, e.west, e.east.max(c.east), c.south),
            });
            placed.push(result);
        }

        let mut outcome = LayoutOutcome {
            bounds: extent.map_or(Rect::ZERO, |e| orientation.bounds(&e)),
            trees: placed.len(),
            nodes: visited.len(),
            contour_outlines: Vec::new(),
        };

        for tree in placed {
            if config.debug_contours {
                outcome.contour_outlines.push(tree.contour.outline(orientation));
            }
            for (index, position) in tree.positions {
                graph.set_position_at(index, position);
            }
            for (index, path) in tree.paths {
                graph.set_path_at(index, path);
            }
        }

        debug!(
            trees = outcome.trees,
            nodes = outcome.nodes,
            bounds = ?outcome.bounds,
            "tree layout complete"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeShape;
    use kurbo::Point;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn square(graph: &mut LayoutGraph, at: Point) -> NodeId {
        graph.add_node(NodeShape::rect(10.0, 10.0), at)
    }

    #[test]
    fn test_empty_graph() {
        let mut graph = LayoutGraph::new();
        let outcome = TreeLayout::with_defaults().layout(&mut graph).unwrap();
        assert_eq!(outcome.bounds, Rect::ZERO);
        assert_eq!(outcome.trees, 0);
    }

    #[test]
    fn test_single_node() {
        let mut graph = LayoutGraph::new();
        let a = square(&mut graph, Point::new(30.0, 40.0));
        let outcome = TreeLayout::with_defaults().layout(&mut graph).unwrap();
        assert_eq!(graph.node_position(a), Some(Point::new(30.0, 40.0)));
        assert_eq!(outcome.bounds, Rect::new(23.0, 33.0, 37.0, 47.0));
        assert_eq!((outcome.trees, outcome.nodes), (1, 1));
    }

    #[test]
    fn test_two_generation_fixed_case() {
        let mut graph = LayoutGraph::new();
        let root = square(&mut graph, Point::new(100.0, 100.0));
        let mut edges = Vec::new();
        let mut children = Vec::new();
        for _ in 0..3 {
            let child = square(&mut graph, Point::ZERO);
            edges.push(graph.add_edge(root, child).unwrap());
            children.push(child);
        }

        let mut layout = TreeLayout::new(TreeLayoutConfig {
            connectors: ConnectorStyle::Straight,
            ..TreeLayoutConfig::default()
        });
        layout.set_root(Some(root));
        let outcome = layout.layout(&mut graph).unwrap();

        let xs: Vec<f64> = children
            .iter()
            .map(|&c| graph.node_position(c).unwrap().x)
            .collect();
        assert_eq!(xs, vec![86.0, 100.0, 114.0]);
        assert_eq!(graph.node_position(root), Some(Point::new(100.0, 100.0)));
        assert_eq!(outcome.bounds, Rect::new(79.0, 93.0, 121.0, 121.0));

        for (edge, &x) in edges.iter().zip(&xs) {
            let path = graph.edge_path(*edge).unwrap();
            assert_eq!(path.len(), 2);
            assert!((path[0] - Point::new(100.0, 105.0)).hypot() < 1e-6);
            assert!((path[1] - Point::new(x, 109.0)).hypot() < 1e-6);
        }
    }

    #[test]
    fn test_cycle_writes_nothing() {
        let mut graph = LayoutGraph::new();
        let a = square(&mut graph, Point::new(1.0, 1.0));
        let b = square(&mut graph, Point::new(2.0, 2.0));
        let c = square(&mut graph, Point::new(3.0, 3.0));
        let ab = graph.add_edge(a, b).unwrap();
        graph.add_edge(b, c);
        graph.add_edge(c, a);

        let error = TreeLayout::with_defaults().layout(&mut graph).unwrap_err();
        assert!(error.is_structural());
        assert_eq!(graph.node_position(b), Some(Point::new(2.0, 2.0)));
        assert_eq!(graph.node_position(c), Some(Point::new(3.0, 3.0)));
        assert_eq!(graph.edge_path(ab), Some(&[][..]));
    }

    #[test]
    fn test_cycle_in_later_tree_writes_nothing() {
        let mut graph = LayoutGraph::new();
        let a = square(&mut graph, Point::new(50.0, 50.0));
        let b = square(&mut graph, Point::new(7.0, 7.0));
        graph.add_edge(a, b);
        let c = square(&mut graph, Point::ZERO);
        let d = square(&mut graph, Point::ZERO);
        let e = square(&mut graph, Point::ZERO);
        graph.add_edge(c, d);
        graph.add_edge(d, e);
        graph.add_edge(e, c);

        assert!(TreeLayout::with_defaults().layout(&mut graph).is_err());
        assert_eq!(graph.node_position(b), Some(Point::new(7.0, 7.0)));
    }

    #[test]
    fn test_unknown_root() {
        let mut graph = LayoutGraph::new();
        square(&mut graph, Point::ZERO);
        let mut layout = TreeLayout::with_defaults();
        layout.set_root(Some(NodeId(42)));
        assert_eq!(
            layout.layout(&mut graph).unwrap_err(),
            LayoutError::UnknownNode(NodeId(42))
        );
    }

    #[test]
    fn test_forest_stacks_trees() {
        let mut graph = LayoutGraph::new();
        let a = square(&mut graph, Point::new(0.0, 0.0));
        let a1 = square(&mut graph, Point::ZERO);
        graph.add_edge(a, a1);
        let b = square(&mut graph, Point::new(500.0, 500.0));

        let outcome = TreeLayout::with_defaults().layout(&mut graph).unwrap();
        assert_eq!(outcome.trees, 2);
        assert_eq!(outcome.nodes, 3);
        assert_eq!(graph.node_position(a), Some(Point::new(0.0, 0.0)));
        // a1 sits at depth 14, its padded box ends at 21; b's box starts there.
        assert_eq!(graph.node_position(b), Some(Point::new(0.0, 28.0)));
        assert_eq!(outcome.bounds, Rect::new(-7.0, -7.0, 7.0, 35.0));
    }

    #[test]
    fn test_ignore_unreachable() {
        let mut graph = LayoutGraph::new();
        square(&mut graph, Point::ZERO);
        let b = square(&mut graph, Point::new(500.0, 500.0));
        let layout = TreeLayout::new(TreeLayoutConfig {
            ignore_unreachable: true,
            ..TreeLayoutConfig::default()
        });
        let outcome = layout.layout(&mut graph).unwrap();
        assert_eq!(outcome.trees, 1);
        assert_eq!(graph.node_position(b), Some(Point::new(500.0, 500.0)));
    }

    #[test]
    fn test_debug_contours() {
        let mut graph = LayoutGraph::new();
        square(&mut graph, Point::ZERO);
        square(&mut graph, Point::ZERO);
        let layout = TreeLayout::new(TreeLayoutConfig {
            debug_contours: true,
            ..TreeLayoutConfig::default()
        });
        let outcome = layout.layout(&mut graph).unwrap();
        assert_eq!(outcome.contour_outlines.len(), 2);
        assert!(TreeLayout::with_defaults()
            .layout(&mut graph)
            .unwrap()
            .contour_outlines
            .is_empty());
    }

    #[test]
    fn test_self_loop_is_routed() {
        let mut graph = LayoutGraph::new();
        let a = square(&mut graph, Point::new(10.0, 10.0));
        let lp = graph.add_edge(a, a).unwrap();
        TreeLayout::with_defaults().layout(&mut graph).unwrap();
        let path = graph.edge_path(lp).unwrap();
        assert_eq!(path.len(), 5);
        assert!((path[0] - Point::new(15.0, 10.0)).hypot() < 1e-6);
        assert_eq!(path[2], Point::new(17.5, 17.5));
    }

    #[test]
    fn test_node_padding_override() {
        let mut graph = LayoutGraph::new();
        let root = square(&mut graph, Point::ZERO);
        let a = square(&mut graph, Point::ZERO);
        let b = square(&mut graph, Point::ZERO);
        graph.add_edge(root, a);
        graph.add_edge(root, b);
        graph.set_node_padding(
            a,
            Some(Padding {
                east: 10.0,
                ..Padding::default()
            }),
        );
        TreeLayout::with_defaults().layout(&mut graph).unwrap();
        let gap = graph.node_position(b).unwrap().x - graph.node_position(a).unwrap().x;
        assert!((gap - 22.0).abs() < EPS);
    }

    #[test]
    fn test_padding_override_is_clamped() {
        let mut graph = LayoutGraph::new();
        let root = square(&mut graph, Point::ZERO);
        let a = square(&mut graph, Point::ZERO);
        let b = square(&mut graph, Point::ZERO);
        graph.add_edge(root, a);
        graph.add_edge(root, b);

        for east in [f64::NAN, -9.0] {
            graph.set_node_padding(
                a,
                Some(Padding {
                    east,
                    ..Padding::default()
                }),
            );
            let outcome = TreeLayout::with_defaults().layout(&mut graph).unwrap();
            for id in [root, a, b] {
                let p = graph.node_position(id).unwrap();
                assert!(p.x.is_finite() && p.y.is_finite(), "{id} at {p:?}");
            }
            assert!(outcome.bounds.x0.is_finite() && outcome.bounds.x1.is_finite());
            // a's east padding is 0, b keeps its 2.
            let gap = graph.node_position(b).unwrap().x - graph.node_position(a).unwrap().x;
            assert!((gap - 12.0).abs() < EPS, "east {east}: gap {gap}");
        }
    }

    #[test]
    fn test_forget_node() {
        let mut layout = TreeLayout::with_defaults();
        layout.set_root(Some(NodeId(1)));
        layout.toggle_orientation(NodeId(1));
        layout.toggle_orientation(NodeId(2));

        layout.forget_node(NodeId(1));
        assert_eq!(layout.root(), None);
        assert!(!layout.is_toggled(NodeId(1)));
        assert!(layout.is_toggled(NodeId(2)));

        layout.set_root(Some(NodeId(2)));
        layout.forget_nodes();
        assert_eq!(layout.root(), None);
        assert!(!layout.is_toggled(NodeId(2)));
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut layout = TreeLayout::with_defaults();
        assert!(layout.toggle_orientation(NodeId(3)));
        assert!(layout.is_toggled(NodeId(3)));
        assert!(!layout.toggle_orientation(NodeId(3)));
        assert!(!layout.is_toggled(NodeId(3)));
    }

    #[test]
    fn test_toggling_twice_restores_layout() {
        let mut graph = LayoutGraph::new();
        let root = square(&mut graph, Point::new(50.0, 50.0));
        let mut ids = vec![root];
        for parent in [0, 0, 1, 1, 2] {
            let child = square(&mut graph, Point::ZERO);
            graph.add_edge(ids[parent], child);
            ids.push(child);
        }

        let mut layout = TreeLayout::with_defaults();
        let before = layout.layout(&mut graph).unwrap();
        let positions: Vec<Point> = ids.iter().map(|&id| graph.node_position(id).unwrap()).collect();

        layout.toggle_orientation(ids[1]);
        layout.layout(&mut graph).unwrap();
        layout.toggle_orientation(ids[1]);
        let after = layout.layout(&mut graph).unwrap();

        assert_eq!(before.bounds, after.bounds);
        for (&id, expected) in ids.iter().zip(positions) {
            assert!((graph.node_position(id).unwrap() - expected).hypot() < EPS);
        }
    }

    #[test]
    fn test_clamped_config_still_lays_out() {
        let mut graph = LayoutGraph::new();
        let root = square(&mut graph, Point::ZERO);
        let a = square(&mut graph, Point::ZERO);
        let b = square(&mut graph, Point::ZERO);
        graph.add_edge(root, a);
        graph.add_edge(root, b);
        let layout = TreeLayout::new(TreeLayoutConfig {
            spread_alignment: 7.0,
            ..TreeLayoutConfig::default()
        });
        layout.layout(&mut graph).unwrap();
        // Clamped to 1.0: the root sits over the last child.
        assert_eq!(graph.node_position(root).unwrap().x, graph.node_position(b).unwrap().x);
    }

    /// Random trees: node i > 0 hangs off a random earlier node.
    fn arb_tree() -> impl Strategy<Value = Vec<(usize, f64, f64)>> {
        prop::collection::vec((any::<prop::sample::Index>(), 2.0f64..40.0, 2.0f64..40.0), 1..24)
            .prop_map(|nodes| {
                nodes
                    .into_iter()
                    .enumerate()
                    .map(|(i, (parent, w, h))| (if i == 0 { 0 } else { parent.index(i) }, w, h))
                    .collect()
            })
    }

    fn build(nodes: &[(usize, f64, f64)]) -> (LayoutGraph, Vec<NodeId>) {
        let mut graph = LayoutGraph::new();
        let mut ids = Vec::new();
        for (i, &(parent, w, h)) in nodes.iter().enumerate() {
            let id = graph.add_node(NodeShape::rect(w, h), Point::ZERO);
            if i > 0 {
                graph.add_edge(ids[parent], id);
            }
            ids.push(id);
        }
        (graph, ids)
    }

    fn padded_box(graph: &LayoutGraph, id: NodeId) -> Rect {
        let shape = graph.node_shape(id).unwrap().bounds();
        (shape + graph.node_position(id).unwrap().to_vec2()).inflate(2.0, 2.0)
    }

    proptest! {
        #[test]
        fn padded_boxes_never_overlap(
            nodes in arb_tree(),
            balance in any::<bool>(),
            align in any::<bool>(),
            toggled in prop::collection::vec(any::<bool>(), 24),
        ) {
            let (mut graph, ids) = build(&nodes);
            let mut layout = TreeLayout::new(TreeLayoutConfig {
                balance_children: balance,
                align_generations: align,
                ..TreeLayoutConfig::default()
            });
            for (&id, _) in ids.iter().zip(&toggled).filter(|(_, flip)| **flip) {
                layout.toggle_orientation(id);
            }
            layout.layout(&mut graph).unwrap();

            for (i, &a) in ids.iter().enumerate() {
                for &b in &ids[i + 1..] {
                    let overlap = padded_box(&graph, a).intersect(padded_box(&graph, b));
                    prop_assert!(
                        overlap.width() <= 1e-6 || overlap.height() <= 1e-6,
                        "{} and {} overlap: {:?}", a, b, overlap
                    );
                }
            }
        }

        #[test]
        fn layout_is_idempotent(nodes in arb_tree()) {
            let (mut graph, ids) = build(&nodes);
            let layout = TreeLayout::with_defaults();
            layout.layout(&mut graph).unwrap();
            let first: Vec<Point> = ids.iter().map(|&id| graph.node_position(id).unwrap()).collect();
            layout.layout(&mut graph).unwrap();
            for (&id, before) in ids.iter().zip(first) {
                let after = graph.node_position(id).unwrap();
                prop_assert!((after - before).hypot() < 1e-6);
            }
        }
    }
}
