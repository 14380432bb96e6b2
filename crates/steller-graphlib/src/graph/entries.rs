//! Storage entries for [`Graph`](super::Graph).

use crate::{EdgeId, NodeId};

#[derive(Debug, Clone)]
pub struct GraphNode<N> {
    pub(in crate::graph) id: String,
    pub(in crate::graph) in_edges: Vec<EdgeId>,
    pub(in crate::graph) out_edges: Vec<EdgeId>,
    pub label: N,
}

impl<N> GraphNode<N> {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Edges whose target is this node, in insertion order.
    pub fn in_edges(&self) -> &[EdgeId] {
        &self.in_edges
    }

    /// Edges whose source is this node, in insertion order.
    pub fn out_edges(&self) -> &[EdgeId] {
        &self.out_edges
    }
}

#[derive(Debug, Clone)]
pub struct GraphEdge<E> {
    pub(in crate::graph) node1: NodeId,
    pub(in crate::graph) node2: NodeId,
    pub label: E,
}

impl<E> GraphEdge<E> {
    /// Source node.
    pub fn node1(&self) -> NodeId {
        self.node1
    }

    /// Target node.
    pub fn node2(&self) -> NodeId {
        self.node2
    }
}
