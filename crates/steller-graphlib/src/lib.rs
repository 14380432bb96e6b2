//! Hierarchy and graph containers used by `steller-layout`.
//!
//! Both containers are arenas. Nodes and edges are addressed by index, so back-references
//! (a node's parent, an edge's endpoints) are plain ids instead of shared pointers. Layout
//! engines never add or remove elements; they only write into the per-element labels.

pub mod graph;
pub mod tree;

pub use graph::{Graph, GraphEdge, GraphNode, NodeRef};
pub use tree::{Tree, TreeNode};

/// Index of a node inside the [`Tree`] or [`Graph`] that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of an edge inside the [`Graph`] that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub usize);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}
