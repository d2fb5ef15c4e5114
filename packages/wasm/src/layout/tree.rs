//! Tree analysis.
//!
//! Walks the graph from a root and builds an arena of tree nodes in
//! depth-first preorder (the root sits in slot 0, every parent precedes its
//! children). Edges are followed in either direction, in edge creation
//! order, which fixes the west-to-east order of siblings.
//!
//! Besides the arena the analysis records, per generation, the thickest
//! node (its extent along the depth axis) and the depth offset where the
//! generation starts when generations are aligned.

use std::collections::HashSet;

use petgraph::stable_graph::{EdgeIndex, NodeIndex};

use super::error::LayoutError;
use super::orientation::Orientation;
use crate::graph::{LayoutGraph, NodeId};

/// A node as placed in the tree.
#[derive(Debug, Clone)]
pub(crate) struct TreeNode {
    /// Graph index of the node.
    pub(crate) node: NodeIndex,
    /// Stable id of the node.
    pub(crate) id: NodeId,
    /// Slot of the parent (None for the root).
    pub(crate) parent: Option<usize>,
    /// Distance from the root.
    pub(crate) generation: usize,
    /// Slots of the children, west to east.
    pub(crate) children: Vec<usize>,
    /// Indices into [`Tree::connectors`] of the edges this node routes.
    pub(crate) connectors: Vec<usize>,
}

/// An edge routed by one node of the tree.
///
/// `source` and `target` are slots and follow the edge's direction, so a
/// routed path always runs from the edge's source to its target. Both are
/// the same slot for self-loops.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeConnector {
    pub(crate) edge: EdgeIndex,
    pub(crate) source: usize,
    pub(crate) target: usize,
}

impl TreeConnector {
    pub(crate) fn is_loop(&self) -> bool {
        self.source == self.target
    }
}

/// A read-only tree view over a graph.
#[derive(Debug, Clone)]
pub(crate) struct Tree {
    pub(crate) nodes: Vec<TreeNode>,
    pub(crate) connectors: Vec<TreeConnector>,
    thickness: Vec<f64>,
    offsets: Vec<f64>,
    generation_padding: f64,
}

impl Tree {
    /// Build the tree reachable from `root`.
    ///
    /// Fails with [`LayoutError::Cycle`] when a node can be reached twice.
    pub(crate) fn analyze(
        graph: &LayoutGraph,
        root: NodeIndex,
        orientation: Orientation,
        generation_padding: f64,
    ) -> Result<Self, LayoutError> {
        let mut analysis = Analysis {
            graph,
            orientation,
            seen: HashSet::new(),
            nodes: Vec::new(),
            connectors: Vec::new(),
            thickness: Vec::new(),
        };
        analysis.visit(root, None, 0)?;

        let mut offsets = Vec::with_capacity(analysis.thickness.len());
        let mut offset = 0.0;
        for thickness in &analysis.thickness {
            offsets.push(offset);
            offset += thickness + generation_padding;
        }

        Ok(Self {
            nodes: analysis.nodes,
            connectors: analysis.connectors,
            thickness: analysis.thickness,
            offsets,
            generation_padding,
        })
    }

    /// Number of nodes in the tree.
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn generations(&self) -> usize {
        self.thickness.len()
    }

    /// Thickest node of a generation, measured along depth.
    pub(crate) fn thickness(&self, generation: usize) -> f64 {
        self.thickness.get(generation).copied().unwrap_or(0.0)
    }

    /// Depth at which a generation starts.
    pub(crate) fn offset(&self, generation: usize) -> f64 {
        self.offsets.get(generation).copied().unwrap_or(0.0)
    }

    /// Depth band reserved for a generation, padding included.
    pub(crate) fn extent(&self, generation: usize) -> f64 {
        self.thickness(generation) + self.generation_padding
    }

    /// Graph indices of every node in the tree.
    pub(crate) fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes.iter().map(|n| n.node)
    }
}

struct Analysis<'a> {
    graph: &'a LayoutGraph,
    orientation: Orientation,
    seen: HashSet<NodeIndex>,
    nodes: Vec<TreeNode>,
    connectors: Vec<TreeConnector>,
    thickness: Vec<f64>,
}

impl Analysis<'_> {
    fn visit(
        &mut self,
        index: NodeIndex,
        parent: Option<usize>,
        generation: usize,
    ) -> Result<usize, LayoutError> {
        let graph = self.graph;
        let record = graph.node_at(index);
        self.seen.insert(index);

        let slot = self.nodes.len();
        self.nodes.push(TreeNode {
            node: index,
            id: record.id,
            parent,
            generation,
            children: Vec::new(),
            connectors: Vec::new(),
        });

        let contour = self.orientation.contour(record.shape.bounds());
        if self.thickness.len() <= generation {
            self.thickness.resize(generation + 1, 0.0);
        }
        self.thickness[generation] = self.thickness[generation].max(contour.south - contour.north);

        let parent_node = parent.map(|p| self.nodes[p].node);
        let mut reached: Vec<(NodeIndex, usize)> = Vec::new();

        for incidence in graph.incidences(index) {
            // the parent routes every edge between us
            if Some(incidence.other) == parent_node {
                continue;
            }

            let other = if incidence.other == index {
                slot
            } else if let Some(&(_, child)) = reached.iter().find(|(n, _)| *n == incidence.other) {
                // parallel edge: route it, but don't go twice
                child
            } else if self.seen.contains(&incidence.other) {
                return Err(LayoutError::Cycle {
                    edge: incidence.id,
                    node: graph.node_at(incidence.other).id,
                });
            } else {
                let child = self.visit(incidence.other, Some(slot), generation + 1)?;
                self.nodes[slot].children.push(child);
                reached.push((incidence.other, child));
                child
            };

            let (source, target) = if incidence.source == index {
                (slot, other)
            } else {
                (other, slot)
            };
            self.nodes[slot].connectors.push(self.connectors.len());
            self.connectors.push(TreeConnector {
                edge: incidence.edge,
                source,
                target,
            });
        }

        Ok(slot)
    }
}
