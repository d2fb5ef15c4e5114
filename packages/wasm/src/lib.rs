//! Canopy - WASM Module
//!
//! Contour-based tree layout for graphs whose nodes have arbitrary shapes.
//! The crate is compiled to WebAssembly and exposes a JavaScript-friendly
//! API via wasm-bindgen; the same types are usable natively from Rust.
//!
//! # Architecture
//!
//! - `graph`: Shaped nodes and routed edges on petgraph's StableGraph
//! - `layout`: Contours, tree analysis, the recursive packing pass and
//!   connector routing

use js_sys::Error;
use kurbo::{BezPath, PathEl, Point};
use wasm_bindgen::prelude::*;

pub mod graph;
pub mod layout;

use graph::{EdgeId, LayoutGraph, NodeId, NodeShape};
use layout::{LayoutError, Padding, TreeLayout, TreeLayoutConfig};

/// Initialize the WASM module.
///
/// Installs the panic hook and routes `tracing` output to the browser
/// console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    #[cfg(target_arch = "wasm32")]
    tracing_wasm::set_as_global_default();
}

fn to_js(error: LayoutError) -> JsValue {
    Error::new(&error.to_string()).into()
}

/// Flatten an outline into runs of `[n, x0, y0, ..., xn-1, yn-1]`, one run
/// per subpath.
fn flatten_outline(path: &BezPath) -> Vec<f64> {
    let mut out = Vec::new();
    let mut run = 0;
    for element in path.elements() {
        if let PathEl::MoveTo(_) = element {
            run = out.len();
            out.push(0.0);
        }
        if let Some(p) = element.end_point() {
            out.extend_from_slice(&[p.x, p.y]);
            out[run] += 1.0;
        }
    }
    out
}

/// Main entry point for the tree layout.
///
/// Wraps a [`LayoutGraph`] and the [`TreeLayout`] that arranges it.
#[wasm_bindgen]
pub struct CanopyWasm {
    graph: LayoutGraph,
    layout: TreeLayout,
    /// Contour outlines of the last layout, when `debugContours` is set.
    outlines: Vec<BezPath>,
}

impl Default for CanopyWasm {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl CanopyWasm {
    /// Create an empty graph with the default layout configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            graph: LayoutGraph::new(),
            layout: TreeLayout::with_defaults(),
            outlines: Vec::new(),
        }
    }

    /// Create an empty graph with pre-allocated capacity.
    #[wasm_bindgen(js_name = withCapacity)]
    pub fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: LayoutGraph::with_capacity(node_capacity, edge_capacity),
            layout: TreeLayout::with_defaults(),
            outlines: Vec::new(),
        }
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a rectangular node centred on (x, y). Returns its stable id.
    #[wasm_bindgen(js_name = addRectNode)]
    pub fn add_rect_node(&mut self, width: f64, height: f64, x: f64, y: f64) -> u32 {
        self.graph
            .add_node(NodeShape::rect(width, height), Point::new(x, y))
            .raw()
    }

    /// Add an elliptical node centred on (x, y). Returns its stable id.
    #[wasm_bindgen(js_name = addEllipseNode)]
    pub fn add_ellipse_node(&mut self, width: f64, height: f64, x: f64, y: f64) -> u32 {
        self.graph
            .add_node(NodeShape::ellipse(width, height), Point::new(x, y))
            .raw()
    }

    /// Remove a node and its edges. Its toggle and root choice go with it.
    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, node_id: u32) -> bool {
        let id = NodeId(node_id);
        self.layout.forget_node(id);
        self.graph.remove_node(id)
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.graph.node_count() as u32
    }

    /// Current position of a node as `[x, y]`.
    #[wasm_bindgen(js_name = getNodePosition)]
    pub fn get_node_position(&self, node_id: u32) -> Option<Vec<f64>> {
        self.graph
            .node_position(NodeId(node_id))
            .map(|p| vec![p.x, p.y])
    }

    #[wasm_bindgen(js_name = setNodePosition)]
    pub fn set_node_position(&mut self, node_id: u32, x: f64, y: f64) -> bool {
        self.graph.set_node_position(NodeId(node_id), Point::new(x, y))
    }

    /// Override the configured padding of one node. Sides are given in
    /// layout terms: north faces the root, south the children.
    #[wasm_bindgen(js_name = setNodePadding)]
    pub fn set_node_padding(
        &mut self,
        node_id: u32,
        north: f64,
        west: f64,
        east: f64,
        south: f64,
    ) -> bool {
        let padding = Padding {
            north,
            west,
            east,
            south,
        };
        self.graph.set_node_padding(NodeId(node_id), Some(padding))
    }

    /// Go back to the configured padding for one node.
    #[wasm_bindgen(js_name = clearNodePadding)]
    pub fn clear_node_padding(&mut self, node_id: u32) -> bool {
        self.graph.set_node_padding(NodeId(node_id), None)
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add a directed edge. Returns its id, or `undefined` if an endpoint
    /// does not exist.
    #[wasm_bindgen(js_name = addEdge)]
    pub fn add_edge(&mut self, source: u32, target: u32) -> Option<u32> {
        self.graph
            .add_edge(NodeId(source), NodeId(target))
            .map(EdgeId::raw)
    }

    #[wasm_bindgen(js_name = removeEdge)]
    pub fn remove_edge(&mut self, edge_id: u32) -> bool {
        self.graph.remove_edge(EdgeId(edge_id))
    }

    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.graph.edge_count() as u32
    }

    /// Routed path of an edge as `[x0, y0, x1, y1, ...]`. Empty until the
    /// first successful layout.
    #[wasm_bindgen(js_name = getEdgePath)]
    pub fn get_edge_path(&self, edge_id: u32) -> Option<Vec<f64>> {
        self.graph
            .edge_path(EdgeId(edge_id))
            .map(|path| path.iter().flat_map(|p| [p.x, p.y]).collect())
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Replace the layout configuration with a plain JS object. Missing
    /// fields keep their defaults.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config: JsValue) -> Result<(), JsValue> {
        let config: TreeLayoutConfig = serde_wasm_bindgen::from_value(config)?;
        self.layout.set_config(config);
        Ok(())
    }

    /// The current layout configuration as a plain JS object.
    #[wasm_bindgen(js_name = getConfig)]
    pub fn get_config(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(self.layout.config())?)
    }

    /// Root the first tree at `node_id`, or at the lowest id when `undefined`.
    #[wasm_bindgen(js_name = setRoot)]
    pub fn set_root(&mut self, node_id: Option<u32>) {
        self.layout.set_root(node_id.map(NodeId));
    }

    /// Flip the growth direction of the branch below a node. Returns
    /// whether the node is toggled afterwards.
    #[wasm_bindgen(js_name = toggleOrientation)]
    pub fn toggle_orientation(&mut self, node_id: u32) -> bool {
        self.layout.toggle_orientation(NodeId(node_id))
    }

    /// Lay out the graph. Returns the bounds as `[minX, minY, maxX, maxY]`
    /// or throws if the graph is not a forest.
    pub fn layout(&mut self) -> Result<Vec<f64>, JsValue> {
        let outcome = self.layout.layout(&mut self.graph).map_err(to_js)?;
        self.outlines = outcome.contour_outlines;
        let b = outcome.bounds;
        Ok(vec![b.x0, b.y0, b.x1, b.y1])
    }

    /// All node positions as `[id0, x0, y0, id1, x1, y1, ...]`, by id.
    #[wasm_bindgen(js_name = getPositions)]
    pub fn get_positions(&self) -> Vec<f64> {
        let ids = self.graph.node_ids();
        let mut out = Vec::with_capacity(ids.len() * 3);
        for id in ids {
            if let Some(p) = self.graph.node_position(id) {
                out.extend_from_slice(&[f64::from(id.raw()), p.x, p.y]);
            }
        }
        out
    }

    /// Number of contour outlines kept from the last layout (one per tree,
    /// zero unless `debugContours` is set).
    #[wasm_bindgen(js_name = contourOutlineCount)]
    pub fn contour_outline_count(&self) -> u32 {
        self.outlines.len() as u32
    }

    /// Contour outline of one tree as runs of `[n, x0, y0, ...]`. The west
    /// and the east side are separate runs.
    #[wasm_bindgen(js_name = getContourOutline)]
    pub fn get_contour_outline(&self, tree: u32) -> Option<Vec<f64>> {
        self.outlines.get(tree as usize).map(flatten_outline)
    }

    /// Remove every node and edge, with the root choice and toggles that
    /// referred to them. The configuration is kept.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.layout.forget_nodes();
        self.outlines.clear();
    }
}
