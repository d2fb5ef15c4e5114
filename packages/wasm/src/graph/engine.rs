//! LayoutGraph - the graph the tree layout reads and writes.
//!
//! The LayoutGraph stores the topology using petgraph's StableGraph so that
//! node and edge indices survive removals. Every node carries its boundary
//! shape and current position; every edge carries the path last routed for
//! it. The layout engine reads shapes and writes positions and paths, nothing
//! else.

use std::collections::HashMap;

use kurbo::{Point, Rect};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};

use super::edge::EdgeId;
use super::node::{NodeId, NodeShape};
use crate::layout::Padding;

/// Per-node payload stored in the graph.
#[derive(Debug, Clone)]
pub(crate) struct NodeRecord {
    pub(crate) id: NodeId,
    pub(crate) shape: NodeShape,
    pub(crate) position: Point,
    /// Overrides the configured padding for this node only.
    pub(crate) padding: Option<Padding>,
}

/// Per-edge payload stored in the graph.
#[derive(Debug, Clone)]
pub(crate) struct EdgeRecord {
    pub(crate) id: EdgeId,
    pub(crate) path: Vec<Point>,
}

/// An edge as seen from one of its endpoints.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Incidence {
    pub(crate) edge: EdgeIndex,
    pub(crate) id: EdgeId,
    pub(crate) source: NodeIndex,
    pub(crate) target: NodeIndex,
    /// The endpoint that is not the node we looked from (itself for loops).
    pub(crate) other: NodeIndex,
}

/// The graph collaborator of the tree layout.
///
/// This struct manages:
/// - Graph topology via petgraph
/// - Node shapes, positions and padding overrides
/// - Routed edge paths
/// - ID mapping between stable IDs and internal indices
#[derive(Debug, Clone)]
pub struct LayoutGraph {
    /// The underlying graph structure.
    graph: StableGraph<NodeRecord, EdgeRecord, Directed>,

    /// Map from stable NodeId to petgraph NodeIndex
    node_id_to_index: HashMap<NodeId, NodeIndex>,

    /// Map from stable EdgeId to petgraph EdgeIndex
    edge_id_to_index: HashMap<EdgeId, EdgeIndex>,

    /// Next node ID to assign
    next_node_id: u32,

    /// Next edge ID to assign
    next_edge_id: u32,
}

impl LayoutGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            node_id_to_index: HashMap::new(),
            edge_id_to_index: HashMap::new(),
            next_node_id: 0,
            next_edge_id: 0,
        }
    }

    /// Create a graph with pre-allocated capacity.
    pub fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: StableGraph::with_capacity(node_capacity, edge_capacity),
            node_id_to_index: HashMap::with_capacity(node_capacity),
            edge_id_to_index: HashMap::with_capacity(edge_capacity),
            next_node_id: 0,
            next_edge_id: 0,
        }
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node with the given shape at the specified position.
    pub fn add_node(&mut self, shape: NodeShape, position: Point) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        let index = self.graph.add_node(NodeRecord {
            id,
            shape,
            position,
            padding: None,
        });
        self.node_id_to_index.insert(id, index);
        id
    }

    /// Remove a node and all its connected edges.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(index) = self.node_id_to_index.remove(&id) else {
            return false;
        };
        let edges: Vec<EdgeId> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .chain(self.graph.edges_directed(index, Direction::Incoming))
            .map(|e| e.weight().id)
            .collect();
        for edge_id in edges {
            self.edge_id_to_index.remove(&edge_id);
        }
        self.graph.remove_node(index);
        true
    }

    /// Check whether a node exists.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_id_to_index.contains_key(&id)
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// All node IDs in ascending (creation) order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.node_id_to_index.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Get a node's position.
    pub fn node_position(&self, id: NodeId) -> Option<Point> {
        self.record(id).map(|record| record.position)
    }

    /// Set a node's position. Returns false if the node does not exist.
    pub fn set_node_position(&mut self, id: NodeId, position: Point) -> bool {
        match self.record_mut(id) {
            Some(record) => {
                record.position = position;
                true
            }
            None => false,
        }
    }

    /// Get a node's shape.
    pub fn node_shape(&self, id: NodeId) -> Option<&NodeShape> {
        self.record(id).map(|record| &record.shape)
    }

    /// Replace a node's shape. Returns false if the node does not exist.
    pub fn set_node_shape(&mut self, id: NodeId, shape: NodeShape) -> bool {
        match self.record_mut(id) {
            Some(record) => {
                record.shape = shape;
                true
            }
            None => false,
        }
    }

    /// Get a node's padding override.
    pub fn node_padding(&self, id: NodeId) -> Option<Padding> {
        self.record(id).and_then(|record| record.padding)
    }

    /// Override (or with `None`, stop overriding) the padding of one node.
    pub fn set_node_padding(&mut self, id: NodeId, padding: Option<Padding>) -> bool {
        match self.record_mut(id) {
            Some(record) => {
                record.padding = padding;
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add an edge between two nodes.
    ///
    /// Returns the edge ID, or None if source/target don't exist.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> Option<EdgeId> {
        let source_index = *self.node_id_to_index.get(&source)?;
        let target_index = *self.node_id_to_index.get(&target)?;

        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;

        let index = self.graph.add_edge(
            source_index,
            target_index,
            EdgeRecord {
                id,
                path: Vec::new(),
            },
        );
        self.edge_id_to_index.insert(id, index);
        Some(id)
    }

    /// Remove an edge.
    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        match self.edge_id_to_index.remove(&id) {
            Some(index) => self.graph.remove_edge(index).is_some(),
            None => false,
        }
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All edge IDs in ascending (creation) order.
    pub fn edge_ids(&self) -> Vec<EdgeId> {
        let mut ids: Vec<EdgeId> = self.edge_id_to_index.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Get an edge's source and target.
    pub fn edge_endpoints(&self, id: EdgeId) -> Option<(NodeId, NodeId)> {
        let index = *self.edge_id_to_index.get(&id)?;
        let (source, target) = self.graph.edge_endpoints(index)?;
        Some((self.graph[source].id, self.graph[target].id))
    }

    /// Get the path last routed for an edge (empty until laid out).
    pub fn edge_path(&self, id: EdgeId) -> Option<&[Point]> {
        let index = *self.edge_id_to_index.get(&id)?;
        self.graph.edge_weight(index).map(|record| record.path.as_slice())
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Get the bounding box of all node shapes at their current positions.
    pub fn bounds(&self) -> Option<Rect> {
        self.graph
            .node_weights()
            .map(|record| record.shape.bounds() + record.position.to_vec2())
            .reduce(|a, b| a.union(b))
    }

    /// Clear all nodes and edges.
    ///
    /// Id counters keep running, so ids handed out before the clear never
    /// name a new node or edge.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_id_to_index.clear();
        self.edge_id_to_index.clear();
    }

    // =========================================================================
    // Layout Access
    // =========================================================================

    pub(crate) fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.node_id_to_index.get(&id).copied()
    }

    pub(crate) fn node_at(&self, index: NodeIndex) -> &NodeRecord {
        &self.graph[index]
    }

    pub(crate) fn set_position_at(&mut self, index: NodeIndex, position: Point) {
        self.graph[index].position = position;
    }

    pub(crate) fn set_path_at(&mut self, index: EdgeIndex, path: Vec<Point>) {
        self.graph[index].path = path;
    }

    /// Every edge touching `index`, in either direction, in edge creation order.
    pub(crate) fn incidences(&self, index: NodeIndex) -> Vec<Incidence> {
        let mut result: Vec<Incidence> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .chain(self.graph.edges_directed(index, Direction::Incoming))
            .map(|e| Incidence {
                edge: e.id(),
                id: e.weight().id,
                source: e.source(),
                target: e.target(),
                other: if e.source() == index {
                    e.target()
                } else {
                    e.source()
                },
            })
            .collect();
        // Loops show up once per direction.
        result.sort_unstable_by_key(|incidence| incidence.id);
        result.dedup_by_key(|incidence| incidence.id);
        result
    }

    fn record(&self, id: NodeId) -> Option<&NodeRecord> {
        let index = *self.node_id_to_index.get(&id)?;
        self.graph.node_weight(index)
    }

    fn record_mut(&mut self, id: NodeId) -> Option<&mut NodeRecord> {
        let index = *self.node_id_to_index.get(&id)?;
        self.graph.node_weight_mut(index)
    }
}

impl Default for LayoutGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> NodeShape {
        NodeShape::rect(10.0, 10.0)
    }

    #[test]
    fn test_add_and_remove_nodes() {
        let mut graph = LayoutGraph::new();
        let a = graph.add_node(square(), Point::new(1.0, 2.0));
        let b = graph.add_node(square(), Point::ZERO);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.node_position(a), Some(Point::new(1.0, 2.0)));

        assert!(graph.remove_node(a));
        assert!(!graph.remove_node(a));
        assert!(!graph.contains_node(a));
        assert!(graph.contains_node(b));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut graph = LayoutGraph::new();
        let a = graph.add_node(square(), Point::ZERO);
        graph.remove_node(a);
        let b = graph.add_node(square(), Point::ZERO);
        assert_ne!(a, b);
        assert_eq!(graph.node_ids(), vec![b]);
    }

    #[test]
    fn test_add_edge_requires_endpoints() {
        let mut graph = LayoutGraph::new();
        let a = graph.add_node(square(), Point::ZERO);
        let b = graph.add_node(square(), Point::ZERO);
        let e = graph.add_edge(a, b).unwrap();
        assert_eq!(graph.edge_endpoints(e), Some((a, b)));
        assert_eq!(graph.edge_path(e), Some(&[][..]));
        assert!(graph.add_edge(a, NodeId(99)).is_none());
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_remove_node_drops_edges() {
        let mut graph = LayoutGraph::new();
        let a = graph.add_node(square(), Point::ZERO);
        let b = graph.add_node(square(), Point::ZERO);
        let e = graph.add_edge(a, b).unwrap();
        graph.remove_node(b);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.edge_path(e).is_none());
        assert!(!graph.remove_edge(e));
    }

    #[test]
    fn test_incidences_follow_creation_order() {
        let mut graph = LayoutGraph::new();
        let a = graph.add_node(square(), Point::ZERO);
        let b = graph.add_node(square(), Point::ZERO);
        let c = graph.add_node(square(), Point::ZERO);
        let ab = graph.add_edge(a, b).unwrap();
        let ca = graph.add_edge(c, a).unwrap();
        let aa = graph.add_edge(a, a).unwrap();

        let index = graph.index_of(a).unwrap();
        let seen: Vec<EdgeId> = graph.incidences(index).iter().map(|i| i.id).collect();
        assert_eq!(seen, vec![ab, ca, aa], "loop must be reported once");

        let incoming = graph.incidences(index)[1];
        assert_eq!(incoming.other, graph.index_of(c).unwrap());
        assert_eq!(incoming.target, index);
    }

    #[test]
    fn test_padding_override() {
        let mut graph = LayoutGraph::new();
        let a = graph.add_node(square(), Point::ZERO);
        assert_eq!(graph.node_padding(a), None);
        assert!(graph.set_node_padding(a, Some(Padding::uniform(7.0))));
        assert_eq!(graph.node_padding(a), Some(Padding::uniform(7.0)));
        assert!(!graph.set_node_padding(NodeId(42), None));
    }

    #[test]
    fn test_bounds() {
        let mut graph = LayoutGraph::new();
        assert!(graph.bounds().is_none());
        graph.add_node(square(), Point::new(0.0, 0.0));
        graph.add_node(square(), Point::new(20.0, 30.0));
        assert_eq!(graph.bounds(), Some(Rect::new(-5.0, -5.0, 25.0, 35.0)));
    }

    #[test]
    fn test_clear() {
        let mut graph = LayoutGraph::with_capacity(4, 4);
        let a = graph.add_node(square(), Point::ZERO);
        let b = graph.add_node(square(), Point::ZERO);
        let e = graph.add_edge(a, b).unwrap();
        graph.clear();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(!graph.contains_node(a));

        // Ids are never reused.
        let c = graph.add_node(square(), Point::ZERO);
        let d = graph.add_node(square(), Point::ZERO);
        assert_eq!(c, NodeId(2));
        assert_ne!(graph.add_edge(c, d), Some(e));
    }
}
