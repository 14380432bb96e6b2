//! Directed graph container.
//!
//! Nodes are keyed by a unique string id and stored in insertion order; edges keep their
//! endpoints as [`NodeId`]s and are mirrored into each endpoint's `in_edges` / `out_edges`.
//! Several edges may join the same pair of nodes, and self-loops are accepted: rejecting
//! cyclic input is left to the algorithms that care about it.

use crate::{EdgeId, NodeId};
use rustc_hash::FxBuildHasher;

mod entries;

pub use entries::{GraphEdge, GraphNode};

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

/// A way to name an edge endpoint: by insertion index or by node id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef<'a> {
    Index(usize),
    Id(&'a str),
}

impl From<usize> for NodeRef<'_> {
    fn from(value: usize) -> Self {
        NodeRef::Index(value)
    }
}

impl<'a> From<&'a str> for NodeRef<'a> {
    fn from(value: &'a str) -> Self {
        NodeRef::Id(value)
    }
}

impl<'a> From<&'a String> for NodeRef<'a> {
    fn from(value: &'a String) -> Self {
        NodeRef::Id(value.as_str())
    }
}

impl From<NodeId> for NodeRef<'_> {
    fn from(value: NodeId) -> Self {
        NodeRef::Index(value.0)
    }
}

#[derive(Debug, Clone)]
pub struct Graph<N, E> {
    nodes: Vec<GraphNode<N>>,
    node_index: HashMap<String, NodeId>,
    edges: Vec<GraphEdge<E>>,
}

impl<N, E> Default for Graph<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E> Graph<N, E> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            node_index: HashMap::default(),
            edges: Vec::new(),
        }
    }

    /// Adds a node. Returns `None` (and keeps the existing node) when `id` is already taken.
    pub fn add_node(&mut self, id: impl Into<String>, label: N) -> Option<NodeId> {
        let id = id.into();
        if self.node_index.contains_key(&id) {
            tracing::warn!(id = %id, "graph nodes have duplicate name or id");
            return None;
        }
        let ix = NodeId(self.nodes.len());
        self.nodes.push(GraphNode {
            id: id.clone(),
            in_edges: Vec::new(),
            out_edges: Vec::new(),
            label,
        });
        self.node_index.insert(id, ix);
        Some(ix)
    }

    /// Adds a directed edge `n1 -> n2`. Returns `None` when either endpoint does not exist.
    pub fn add_edge<'a>(
        &mut self,
        n1: impl Into<NodeRef<'a>>,
        n2: impl Into<NodeRef<'a>>,
        label: E,
    ) -> Option<EdgeId> {
        let n1 = n1.into();
        let n2 = n2.into();
        let (Some(v), Some(w)) = (self.resolve(n1), self.resolve(n2)) else {
            tracing::warn!(
                source = ?n1,
                target = ?n2,
                "edge endpoint not found; edge dropped"
            );
            return None;
        };

        let ix = EdgeId(self.edges.len());
        self.edges.push(GraphEdge {
            node1: v,
            node2: w,
            label,
        });
        self.nodes[v.0].out_edges.push(ix);
        self.nodes[w.0].in_edges.push(ix);
        Some(ix)
    }

    pub fn resolve(&self, r: NodeRef<'_>) -> Option<NodeId> {
        match r {
            NodeRef::Index(i) => (i < self.nodes.len()).then_some(NodeId(i)),
            NodeRef::Id(id) => self.node_by_id(id),
        }
    }

    pub fn node_by_id(&self, id: &str) -> Option<NodeId> {
        self.node_index.get(id).copied()
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + use<N, E> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + use<N, E> {
        (0..self.edges.len()).map(EdgeId)
    }

    pub fn node(&self, v: NodeId) -> &GraphNode<N> {
        &self.nodes[v.0]
    }

    pub fn node_mut(&mut self, v: NodeId) -> &mut GraphNode<N> {
        &mut self.nodes[v.0]
    }

    pub fn edge(&self, e: EdgeId) -> &GraphEdge<E> {
        &self.edges[e.0]
    }

    pub fn edge_mut(&mut self, e: EdgeId) -> &mut GraphEdge<E> {
        &mut self.edges[e.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode<N>> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge<E>> {
        self.edges.iter()
    }

    pub fn in_edges(&self, v: NodeId) -> &[EdgeId] {
        &self.nodes[v.0].in_edges
    }

    pub fn out_edges(&self, v: NodeId) -> &[EdgeId] {
        &self.nodes[v.0].out_edges
    }

    /// Nodes without incoming edges, in insertion order.
    pub fn sources(&self) -> Vec<NodeId> {
        self.node_ids()
            .filter(|&v| self.nodes[v.0].in_edges.is_empty())
            .collect()
    }

    /// Nodes without outgoing edges, in insertion order.
    pub fn sinks(&self) -> Vec<NodeId> {
        self.node_ids()
            .filter(|&v| self.nodes[v.0].out_edges.is_empty())
            .collect()
    }
}
