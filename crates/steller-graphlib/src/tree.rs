//! Hierarchy container.
//!
//! A [`Tree`] always owns a *virtual root* at [`Tree::root`] (depth 0). Data roots are added
//! as its children; the first of them is the *real root* (depth 1) that tree layouts start
//! from. Collapsing a node (`is_expand = false`) hides its subtree from the `expanded_*`
//! traversals without touching the subtree itself.

use crate::NodeId;

#[derive(Debug, Clone)]
pub struct TreeNode<N> {
    name: String,
    data_index: usize,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    depth: usize,
    height: usize,
    pub is_expand: bool,
    pub label: N,
}

impl<N> TreeNode<N> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of this node in the flattened pre-order data list.
    pub fn data_index(&self) -> usize {
        self.data_index
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of levels in the subtree rooted here, counting this node (a leaf has height 1).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Children that take part in layout: none when the node is collapsed.
    pub fn visible_children(&self) -> &[NodeId] {
        if self.is_expand { &self.children } else { &[] }
    }
}

#[derive(Debug, Clone)]
pub struct Tree<N> {
    nodes: Vec<TreeNode<N>>,
}

impl<N: Default> Tree<N> {
    /// Creates a tree holding only the virtual root.
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![TreeNode {
                name: root_name.into(),
                data_index: 0,
                parent: None,
                children: Vec::new(),
                depth: 0,
                height: 1,
                is_expand: true,
                label: N::default(),
            }],
        }
    }

    /// Appends a child to `parent`. Data indices follow insertion order, so building the
    /// hierarchy depth-first yields pre-order indices.
    pub fn add_child(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        let ix = NodeId(self.nodes.len());
        let depth = self.nodes[parent.0].depth + 1;
        self.nodes.push(TreeNode {
            name: name.into(),
            data_index: ix.0,
            parent: Some(parent),
            children: Vec::new(),
            depth,
            height: 1,
            is_expand: true,
            label: N::default(),
        });
        self.nodes[parent.0].children.push(ix);
        ix
    }
}

impl<N> Tree<N> {
    /// The virtual root.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// First data root, if the tree holds any data.
    pub fn real_root(&self) -> Option<NodeId> {
        self.nodes[0].children.first().copied()
    }

    /// Number of nodes, including the virtual root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.real_root().is_none()
    }

    pub fn node(&self, id: NodeId) -> &TreeNode<N> {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut TreeNode<N> {
        &mut self.nodes[id.0]
    }

    pub fn label(&self, id: NodeId) -> &N {
        &self.nodes[id.0].label
    }

    pub fn label_mut(&mut self, id: NodeId) -> &mut N {
        &mut self.nodes[id.0].label
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + use<N> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// First node (in data order) with the given name.
    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name).map(NodeId)
    }

    pub fn set_expand(&mut self, id: NodeId, expand: bool) {
        self.nodes[id.0].is_expand = expand;
    }

    pub fn toggle_expand(&mut self, id: NodeId) -> bool {
        let node = &mut self.nodes[id.0];
        node.is_expand = !node.is_expand;
        node.is_expand
    }

    /// Deepest depth found in the whole hierarchy, collapsed nodes included.
    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Recomputes `depth` and `height` for every node, starting at the virtual root (depth 0).
    pub fn update_depth_and_height(&mut self) {
        let order = self.preorder();
        for &v in &order {
            let depth = match self.nodes[v.0].parent {
                Some(p) => self.nodes[p.0].depth + 1,
                None => 0,
            };
            self.nodes[v.0].depth = depth;
        }
        for &v in order.iter().rev() {
            let height = self.nodes[v.0]
                .children
                .iter()
                .map(|c| self.nodes[c.0].height)
                .max()
                .unwrap_or(0);
            self.nodes[v.0].height = height + 1;
        }
    }

    /// Full pre-order from the virtual root, ignoring expand state.
    pub fn preorder(&self) -> Vec<NodeId> {
        self.walk_before(self.root(), |n| n.children.as_slice())
    }

    /// Full post-order from the virtual root, ignoring expand state.
    pub fn postorder(&self) -> Vec<NodeId> {
        self.walk_after(self.root(), |n| n.children.as_slice())
    }

    /// Pre-order from `root`, not descending into collapsed nodes.
    pub fn expanded_preorder(&self, root: NodeId) -> Vec<NodeId> {
        self.walk_before(root, TreeNode::visible_children)
    }

    /// Post-order from `root`, not descending into collapsed nodes.
    pub fn expanded_postorder(&self, root: NodeId) -> Vec<NodeId> {
        self.walk_after(root, TreeNode::visible_children)
    }

    fn walk_before<'a, F>(&'a self, root: NodeId, children: F) -> Vec<NodeId>
    where
        F: Fn(&'a TreeNode<N>) -> &'a [NodeId],
    {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(v) = stack.pop() {
            out.push(v);
            stack.extend(children(&self.nodes[v.0]).iter().rev());
        }
        out
    }

    fn walk_after<'a, F>(&'a self, root: NodeId, children: F) -> Vec<NodeId>
    where
        F: Fn(&'a TreeNode<N>) -> &'a [NodeId],
    {
        let mut next = Vec::new();
        let mut stack = vec![root];
        while let Some(v) = stack.pop() {
            next.push(v);
            stack.extend(children(&self.nodes[v.0]).iter());
        }
        next.reverse();
        next
    }
}
