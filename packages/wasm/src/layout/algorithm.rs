//! The recursive contour layout.
//!
//! Every node passes through the same phases:
//!
//! 1. **Toggle:** a node flagged for inversion swaps in the rotated
//!    orientation for its whole subtree.
//! 2. **Children:** each child subtree is laid out recursively, top-aligned
//!    with its previous sibling and pushed west until its contour touches
//!    the siblings already placed. Optionally the intermediate children are
//!    then balanced.
//! 3. **Parent:** the node is placed relative to its children (or at the
//!    origin for leaves) and gets its padded contour.
//! 4. **Connectors:** the edges the node routes are given paths.
//! 5. **Relativize:** children and paths are made relative to the node so
//!    the subtree moves as a unit when the parent places it.
//! 6. **Merge:** the node's contour and its children's form the subtree
//!    contour handed back to the parent.
//!
//! A final sweep down the arena turns relative positions into absolute
//! ones. The pass only fills scratch buffers; nothing is written to the
//! graph here.

use kurbo::{Point, Vec2};
use petgraph::stable_graph::{EdgeIndex, NodeIndex};
use std::collections::HashSet;
use tracing::{debug, trace};

use super::config::{Padding, TreeLayoutConfig};
use super::connector::{self, Endpoint};
use super::contour::{Contour, Side, min_distance};
use super::orientation::Orientation;
use super::tree::Tree;
use crate::graph::{LayoutGraph, NodeId, edge};

/// Where a laid-out tree goes.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Anchor {
    /// Keep the root at its current position.
    Root,
    /// Put the tree's north-west corner (in depth/spread terms) here.
    NorthWest { north: f64, west: f64 },
}

/// A tree laid out in absolute coordinates, not yet written to the graph.
#[derive(Debug, Clone)]
pub(crate) struct PlacedTree {
    pub(crate) contour: Contour,
    pub(crate) positions: Vec<(NodeIndex, Point)>,
    pub(crate) paths: Vec<(EdgeIndex, Vec<Point>)>,
}

/// The orientation state threaded down the recursion.
#[derive(Debug, Clone, Copy)]
struct Frame {
    orientation: Orientation,
    /// How many toggled ancestors (the node itself included) we are under.
    toggles: usize,
}

/// Scratch state for laying out one tree.
pub(crate) struct LayoutPass<'a> {
    graph: &'a LayoutGraph,
    tree: &'a Tree,
    config: &'a TreeLayoutConfig,
    toggles: &'a HashSet<NodeId>,
    /// Per slot: position, relative to the parent once the parent is done.
    positions: Vec<Point>,
    /// Per connector: routed path, relative like the positions.
    paths: Vec<Vec<Point>>,
}

impl<'a> LayoutPass<'a> {
    pub(crate) fn new(
        graph: &'a LayoutGraph,
        tree: &'a Tree,
        config: &'a TreeLayoutConfig,
        toggles: &'a HashSet<NodeId>,
    ) -> Self {
        Self {
            graph,
            tree,
            config,
            toggles,
            positions: vec![Point::ZERO; tree.len()],
            paths: vec![Vec::new(); tree.connectors.len()],
        }
    }

    /// Lay out the whole tree and place it according to `anchor`.
    pub(crate) fn run(mut self, orientation: Orientation, anchor: Anchor) -> PlacedTree {
        let frame = Frame {
            orientation,
            toggles: 0,
        };
        let mut contour = self.layout_node(0, frame);

        let o = orientation;
        let computed = self.positions[0];
        let (ddepth, dspread) = match anchor {
            Anchor::Root => {
                let root = self.graph.node_at(self.tree.nodes[0].node).position;
                (o.depth(root) - o.depth(computed), o.spread(root) - o.spread(computed))
            }
            Anchor::NorthWest { north, west } => (north - contour.north, west - contour.west),
        };
        contour.translate(ddepth, dspread);
        self.to_absolute(o.vector(ddepth, dspread));

        debug!(
            nodes = self.tree.len(),
            generations = self.tree.generations(),
            north = contour.north,
            south = contour.south,
            "tree placed"
        );

        let tree = self.tree;
        PlacedTree {
            contour,
            positions: tree.node_indices().zip(self.positions).collect(),
            paths: tree.connectors.iter().map(|c| c.edge).zip(self.paths).collect(),
        }
    }

    fn layout_node(&mut self, slot: usize, outer: Frame) -> Contour {
        let tree = self.tree;
        let node = &tree.nodes[slot];

        let toggled = !self.config.align_generations && self.toggles.contains(&node.id);
        let frame = if toggled {
            let toggles = outer.toggles + 1;
            Frame {
                orientation: outer.orientation.rotate(toggles % 2 == 0),
                toggles,
            }
        } else {
            outer
        };
        trace!(node = %node.id, generation = node.generation, toggled, "layout node");

        let children = self.layout_children(slot, frame);
        let parent = self.layout_parent(slot, &children, frame);

        let equator = if toggled {
            frame.orientation.depth(self.positions[slot])
        } else {
            parent.south
        };
        self.route_connectors(slot, equator, frame.orientation);
        self.relativize(slot);

        let mut hull = Vec::with_capacity(children.len() + 2);
        hull.push(parent.clone());
        hull.extend(children);
        hull.push(parent);
        let merged = Contour::merge(&hull);

        if toggled {
            // back into the caller's axes, through screen space
            outer.orientation.contour(frame.orientation.bounds(&merged))
        } else {
            merged
        }
    }

    /// Lay out and pack the children of `slot`, west to east.
    fn layout_children(&mut self, slot: usize, frame: Frame) -> Vec<Contour> {
        let tree = self.tree;
        let o = frame.orientation;
        let children = &tree.nodes[slot].children;
        let mut placed: Vec<Contour> = Vec::with_capacity(children.len());

        for &child in children {
            let mut contour = self.layout_node(child, frame);

            if let Some(previous) = placed.last() {
                let ddepth = previous.north - contour.north;
                contour.translate(ddepth, 0.0);

                let mut distance = min_distance(&placed, &contour);
                if !distance.is_finite() {
                    // no shared depth, pack by extents
                    let east = placed.iter().map(|c| c.east).fold(f64::NEG_INFINITY, f64::max);
                    distance = contour.west - east;
                }
                contour.translate(0.0, -distance);
                self.positions[child] += o.vector(ddepth, -distance);
            }

            placed.push(contour);
        }

        if self.config.balance_children && placed.len() > 2 {
            self.balance(children, &mut placed, o);
        }
        placed
    }

    /// Move intermediate children east towards even spacing.
    ///
    /// Children are tightly packed at this point, so each can only gain by
    /// moving east. Working from the east-most intermediate child back west,
    /// each one moves towards its evenly spaced spread between the first and
    /// the last child, but never further than the room left to any sibling
    /// east of it.
    fn balance(&mut self, children: &[usize], placed: &mut [Contour], o: Orientation) {
        let n = children.len();
        let first = o.spread(self.positions[children[0]]);
        let last = o.spread(self.positions[children[n - 1]]);

        for i in (1..n - 1).rev() {
            let ideal = first + (last - first) * i as f64 / (n - 1) as f64;
            let current = o.spread(self.positions[children[i]]);
            let wanted = ideal - current;
            if wanted <= 0.0 {
                continue;
            }

            let room = placed[i + 1..]
                .iter()
                .map(|later| min_distance(std::slice::from_ref(&placed[i]), later))
                .fold(f64::INFINITY, f64::min);
            let shift = wanted.min(room);
            if shift > 0.0 {
                placed[i].translate(0.0, shift);
                self.positions[children[i]] += o.vector(0.0, shift);
            }
        }
    }

    /// Place `slot` itself relative to its (already placed) children.
    fn layout_parent(&mut self, slot: usize, children: &[Contour], frame: Frame) -> Contour {
        let tree = self.tree;
        let o = frame.orientation;
        let node = &tree.nodes[slot];
        let record = self.graph.node_at(node.node);

        let mut padding = record.padding.map_or(self.config.padding, Padding::clamped);
        if frame.toggles % 2 == 1 {
            padding = padding.rotated();
        }
        let mut contour = o.padded_contour(record.shape.bounds(), &padding);

        let (mut depth, spread) = match (children.first(), children.last()) {
            (Some(first), Some(last)) => {
                let min = first.cursor(Side::West).spread() - contour.west;
                let max = last.cursor(Side::East).spread() - contour.east;
                (first.north - contour.south, self.align_spread(min, max, frame))
            }
            _ => (0.0, self.align_spread(0.0, 0.0, frame)),
        };

        if self.config.align_generations {
            let band = tree.offset(node.generation);
            let min = band - contour.north;
            let max = band + tree.extent(node.generation) - contour.south;
            depth = min + (max - min) * self.config.depth_alignment;
        }

        self.positions[slot] = o.point(depth, spread);
        contour.translate(depth, spread);
        if self.config.align_generations {
            contour.north = tree.offset(node.generation);
        }
        contour
    }

    /// Spread of a parent between the extremes allowed by its children.
    fn align_spread(&self, min: f64, max: f64, frame: Frame) -> f64 {
        match frame.toggles {
            0 => min + (max - min) * self.config.spread_alignment,
            k if k % 2 == 0 => min,
            _ => max,
        }
    }

    fn route_connectors(&mut self, slot: usize, equator: f64, o: Orientation) {
        let tree = self.tree;
        let graph = self.graph;
        let endpoint = |slot: usize, positions: &[Point]| {
            Endpoint::new(&graph.node_at(tree.nodes[slot].node).shape, positions[slot])
        };

        for &index in &tree.nodes[slot].connectors {
            let connector = tree.connectors[index];
            let source = endpoint(connector.source, &self.positions);
            self.paths[index] = if connector.is_loop() {
                connector::self_loop(source)
            } else {
                let target = endpoint(connector.target, &self.positions);
                connector::route(self.config.connectors, o, equator, source, target)
            };
        }
    }

    /// Express children and routed paths relative to `slot`.
    fn relativize(&mut self, slot: usize) {
        let tree = self.tree;
        let delta = -self.positions[slot].to_vec2();
        for &child in &tree.nodes[slot].children {
            self.positions[child] += delta;
        }
        for &index in &tree.nodes[slot].connectors {
            edge::translate(&mut self.paths[index], delta);
        }
    }

    /// Turn relative positions into absolute ones, moving the root by `delta`.
    fn to_absolute(&mut self, delta: Vec2) {
        let tree = self.tree;
        self.positions[0] += delta;
        // preorder: a parent is always final before its children
        for (slot, node) in tree.nodes.iter().enumerate() {
            if let Some(parent) = node.parent {
                let origin = self.positions[parent].to_vec2();
                self.positions[slot] += origin;
            }
            let origin = self.positions[slot].to_vec2();
            for &index in &node.connectors {
                edge::translate(&mut self.paths[index], origin);
            }
        }
    }
}
