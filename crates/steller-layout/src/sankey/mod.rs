//! Sankey flow layout.
//!
//! Nodes are placed in columns along the *main* axis (x for horizontal flows, y for vertical
//! ones) by a topological sort, then spread along the *cross* axis proportionally to their
//! flow value and relaxed towards the weighted centers of their neighbours. Edges get a
//! thickness (`dy`) and their offsets at the source (`sy`) and target (`ty`) node.
//!
//! The graph must be a DAG; cycles are reported as [`Error::Cycle`](crate::Error::Cycle).

mod breadth;
mod relax;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use steller_graphlib::{EdgeId, Graph, NodeId};

use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SankeyOrient {
    #[default]
    Horizontal,
    Vertical,
}

impl SankeyOrient {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "horizontal" => Some(Self::Horizontal),
            "vertical" => Some(Self::Vertical),
            _ => None,
        }
    }
}

/// Column assignment policy for nodes without an explicit depth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeAlign {
    /// Topological layer.
    Left,
    /// Pushed as far right as their longest downstream path allows.
    Right,
    /// Like `Left`, but sinks go to the last column.
    #[default]
    Justify,
}

impl NodeAlign {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "justify" => Some(Self::Justify),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SankeyNodeLayout {
    /// Flow through the node: the largest of its outgoing sum, incoming sum and raw value.
    pub value: f64,
    /// Column index.
    pub depth: usize,
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    /// Longest path to a sink, only computed for [`NodeAlign::Right`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sk_node_height: Option<usize>,
}

impl SankeyNodeLayout {
    /// Position along the flow direction.
    pub fn main(&self, orient: SankeyOrient) -> f64 {
        match orient {
            SankeyOrient::Horizontal => self.x,
            SankeyOrient::Vertical => self.y,
        }
    }

    /// Position across the flow direction.
    pub fn cross(&self, orient: SankeyOrient) -> f64 {
        match orient {
            SankeyOrient::Horizontal => self.y,
            SankeyOrient::Vertical => self.x,
        }
    }

    /// Extent across the flow direction, proportional to `value`.
    pub fn cross_len(&self, orient: SankeyOrient) -> f64 {
        match orient {
            SankeyOrient::Horizontal => self.dy,
            SankeyOrient::Vertical => self.dx,
        }
    }

    pub fn center(&self, orient: SankeyOrient) -> f64 {
        self.cross(orient) + self.cross_len(orient) / 2.0
    }

    fn set_main(&mut self, orient: SankeyOrient, v: f64) {
        match orient {
            SankeyOrient::Horizontal => self.x = v,
            SankeyOrient::Vertical => self.y = v,
        }
    }

    fn set_main_len(&mut self, orient: SankeyOrient, v: f64) {
        match orient {
            SankeyOrient::Horizontal => self.dx = v,
            SankeyOrient::Vertical => self.dy = v,
        }
    }

    fn set_cross(&mut self, orient: SankeyOrient, v: f64) {
        match orient {
            SankeyOrient::Horizontal => self.y = v,
            SankeyOrient::Vertical => self.x = v,
        }
    }

    fn set_cross_len(&mut self, orient: SankeyOrient, v: f64) {
        match orient {
            SankeyOrient::Horizontal => self.dy = v,
            SankeyOrient::Vertical => self.dx = v,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SankeyNode {
    /// Raw node value from the data item.
    pub value: Option<f64>,
    /// Column override, honored when non-negative.
    pub depth: Option<i64>,
    #[serde(default)]
    pub layout: SankeyNodeLayout,
}

impl SankeyNode {
    pub fn new(value: Option<f64>, depth: Option<i64>) -> Self {
        Self {
            value,
            depth,
            layout: SankeyNodeLayout::default(),
        }
    }

    pub fn explicit_depth(&self) -> Option<usize> {
        self.depth.and_then(|d| usize::try_from(d).ok())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SankeyEdgeLayout {
    /// Thickness.
    pub dy: f64,
    /// Offset inside the source node.
    pub sy: f64,
    /// Offset inside the target node.
    pub ty: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SankeyEdge {
    /// Flow carried by the edge; `NaN` when the input was not numeric.
    pub value: f64,
    #[serde(default)]
    pub layout: SankeyEdgeLayout,
}

impl SankeyEdge {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            layout: SankeyEdgeLayout::default(),
        }
    }
}

pub type SankeyGraph = Graph<SankeyNode, SankeyEdge>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SankeyLayoutOptions {
    /// Node thickness along the main axis.
    pub node_width: f64,
    /// Gap between nodes of the same column.
    pub node_gap: f64,
    pub layout_iterations: usize,
    pub orient: SankeyOrient,
    pub node_align: NodeAlign,
    /// Size of the view rect.
    pub width: f64,
    pub height: f64,
}

impl Default for SankeyLayoutOptions {
    fn default() -> Self {
        Self {
            node_width: 20.0,
            node_gap: 8.0,
            layout_iterations: 32,
            orient: SankeyOrient::Horizontal,
            node_align: NodeAlign::Justify,
            width: 0.0,
            height: 0.0,
        }
    }
}

impl SankeyLayoutOptions {
    fn main_extent(&self) -> f64 {
        match self.orient {
            SankeyOrient::Horizontal => self.width,
            SankeyOrient::Vertical => self.height,
        }
    }

    fn cross_extent(&self) -> f64 {
        match self.orient {
            SankeyOrient::Horizontal => self.height,
            SankeyOrient::Vertical => self.width,
        }
    }
}

/// Lays out `graph` inside a `width` x `height` view rect, overwriting every node and edge
/// layout.
///
/// When any node carries no flow at all, the relaxation rounds are skipped so that such
/// nodes keep their initial column order.
pub fn layout(graph: &mut SankeyGraph, opts: &SankeyLayoutOptions) -> Result<()> {
    if graph.node_count() == 0 {
        return Ok(());
    }
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        orient = ?opts.orient,
        align = ?opts.node_align,
        "sankey layout"
    );

    let has_empty_node = compute_node_values(graph);
    let iterations = if has_empty_node {
        0
    } else {
        opts.layout_iterations
    };

    breadth::compute_node_breadths(graph, opts)?;
    relax::compute_node_depths(graph, opts, iterations);
    compute_edge_depths(graph, opts.orient);
    Ok(())
}

/// Resets every layout and computes node values. Returns whether some node has value 0.
fn compute_node_values(graph: &mut SankeyGraph) -> bool {
    for e in graph.edge_ids() {
        graph.edge_mut(e).label.layout = SankeyEdgeLayout::default();
    }
    let mut has_empty_node = false;
    for v in graph.node_ids() {
        let value_of = |e: &EdgeId| graph.edge(*e).label.value;
        let out_value = nan_sum(graph.out_edges(v).iter().map(value_of));
        let in_value = nan_sum(graph.in_edges(v).iter().map(value_of));
        let node = &mut graph.node_mut(v).label;
        let raw = node.value.filter(|x| !x.is_nan()).unwrap_or(0.0);
        let value = out_value.max(in_value).max(raw);
        has_empty_node |= value == 0.0;
        node.layout = SankeyNodeLayout {
            value,
            ..SankeyNodeLayout::default()
        };
    }
    has_empty_node
}

/// Orders each node's edges along the cross axis and stacks them inside the node.
fn compute_edge_depths(graph: &mut SankeyGraph, orient: SankeyOrient) {
    let cross = |graph: &SankeyGraph, v: NodeId| graph.node(v).label.layout.cross(orient);
    for v in graph.node_ids() {
        let (out_edges, in_edges) = {
            let g: &SankeyGraph = graph;
            let mut out_edges: Vec<EdgeId> = g.out_edges(v).to_vec();
            out_edges.sort_by(|&a, &b| {
                f64_cmp(cross(g, g.edge(a).node2()), cross(g, g.edge(b).node2()))
            });
            let mut in_edges: Vec<EdgeId> = g.in_edges(v).to_vec();
            in_edges.sort_by(|&a, &b| {
                f64_cmp(cross(g, g.edge(a).node1()), cross(g, g.edge(b).node1()))
            });
            (out_edges, in_edges)
        };

        let mut sy = 0.0;
        for e in out_edges {
            let layout = &mut graph.edge_mut(e).label.layout;
            layout.sy = sy;
            sy += layout.dy;
        }
        let mut ty = 0.0;
        for e in in_edges {
            let layout = &mut graph.edge_mut(e).label.layout;
            layout.ty = ty;
            ty += layout.dy;
        }
    }
}

/// Sum that skips `NaN` terms. An empty sum is `+0.0`.
fn nan_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(0.0, |a, b| a + b)
}

fn f64_cmp(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
