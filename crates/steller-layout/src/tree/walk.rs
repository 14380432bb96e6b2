//! Reingold-Tilford walks (Walker's O(n) formulation, as popularized by d3-hierarchy).
//!
//! The scratch state for one pass lives in a [`HierNode`] arena indexed like the tree arena.
//! Shifts produced by `apportion` are recorded lazily in `change`/`shift` and only applied
//! to intermediate siblings by `execute_shifts` when their parent is finished, which keeps
//! the whole first walk linear.

use super::{Separation, TreeNodeLayout};
use steller_graphlib::{NodeId, Tree};

pub(crate) type LayoutTree = Tree<TreeNodeLayout>;

#[derive(Debug, Clone)]
pub(crate) struct HierNode {
    pub(crate) default_ancestor: Option<NodeId>,
    pub(crate) ancestor: NodeId,
    pub(crate) prelim: f64,
    pub(crate) modifier: f64,
    pub(crate) change: f64,
    pub(crate) shift: f64,
    pub(crate) i: usize,
    pub(crate) thread: Option<NodeId>,
}

impl HierNode {
    fn new(v: NodeId, i: usize) -> Self {
        Self {
            default_ancestor: None,
            ancestor: v,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            i,
            thread: None,
        }
    }
}

/// Allocates fresh scratch state for every node reachable from `root`.
pub(crate) fn init(tree: &LayoutTree, root: NodeId) -> Vec<HierNode> {
    let mut hier: Vec<HierNode> = tree.node_ids().map(|v| HierNode::new(v, 0)).collect();
    for v in tree.expanded_preorder(root) {
        for (i, &child) in tree.node(v).visible_children().iter().enumerate() {
            hier[child.0] = HierNode::new(child, i);
        }
    }
    hier
}

/// Computes the preliminary position of `v`. Its children must already be walked.
pub(crate) fn first_walk(
    tree: &LayoutTree,
    hier: &mut [HierNode],
    v: NodeId,
    separation: &Separation,
) {
    let node = tree.node(v);
    let Some(parent) = node.parent() else {
        return;
    };
    let children = node.visible_children();
    let siblings = tree.node(parent).children();
    let i = hier[v.0].i;
    let subtree_w = (i > 0).then(|| siblings[i - 1]);

    if let (Some(&first), Some(&last)) = (children.first(), children.last()) {
        execute_shifts(tree, hier, v);
        let mid_point = (hier[first.0].prelim + hier[last.0].prelim) / 2.0;
        if let Some(w) = subtree_w {
            hier[v.0].prelim = hier[w.0].prelim + separation.between(tree, v, w);
            hier[v.0].modifier = hier[v.0].prelim - mid_point;
        } else {
            hier[v.0].prelim = mid_point;
        }
    } else if let Some(w) = subtree_w {
        hier[v.0].prelim = hier[w.0].prelim + separation.between(tree, v, w);
    }

    let default_ancestor = hier[parent.0].default_ancestor.unwrap_or(siblings[0]);
    hier[parent.0].default_ancestor = Some(apportion(
        tree,
        hier,
        v,
        subtree_w,
        default_ancestor,
        separation,
    ));
}

/// Turns `prelim` into a local x coordinate by accumulating the ancestors' modifiers.
pub(crate) fn second_walk(tree: &mut LayoutTree, hier: &mut [HierNode], v: NodeId) {
    let Some(parent) = tree.node(v).parent() else {
        return;
    };
    let parent_modifier = hier[parent.0].modifier;
    tree.label_mut(v).x = Some(hier[v.0].prelim + parent_modifier);
    hier[v.0].modifier += parent_modifier;
}

fn execute_shifts(tree: &LayoutTree, hier: &mut [HierNode], v: NodeId) {
    let mut shift = 0.0;
    let mut change = 0.0;
    for &child in tree.node(v).children().iter().rev() {
        let h = &mut hier[child.0];
        h.prelim += shift;
        h.modifier += shift;
        change += h.change;
        shift += h.shift + change;
    }
}

/// Combines the subtree rooted at `v` with the subtrees of its left siblings.
///
/// Walks the inside contours of the left forest and of `v` (and the outside contours
/// alongside them) level by level; every overlap moves `v`'s subtree right. When one side is
/// deeper, a thread is added so later contour walks can continue past the shallow side.
/// Returns the ancestor to use for the next sibling.
fn apportion(
    tree: &LayoutTree,
    hier: &mut [HierNode],
    v: NodeId,
    subtree_w: Option<NodeId>,
    mut ancestor: NodeId,
    separation: &Separation,
) -> NodeId {
    let Some(w) = subtree_w else {
        return ancestor;
    };
    let Some(parent) = tree.node(v).parent() else {
        return ancestor;
    };

    let mut out_right = v;
    let mut cur_in_right = v;
    let mut out_left = tree.node(parent).children()[0];
    let mut cur_in_left = w;

    let mut sum_out_right = hier[out_right.0].modifier;
    let mut sum_in_right = hier[cur_in_right.0].modifier;
    let mut sum_out_left = hier[out_left.0].modifier;
    let mut sum_in_left = hier[cur_in_left.0].modifier;

    let mut in_left;
    let mut in_right;
    loop {
        in_left = next_right(tree, hier, cur_in_left);
        in_right = next_left(tree, hier, cur_in_right);
        let (Some(il), Some(ir)) = (in_left, in_right) else {
            break;
        };
        cur_in_left = il;
        cur_in_right = ir;

        // Outside contours are at least as deep as the inside ones they bound.
        let (Some(or), Some(ol)) = (
            next_right(tree, hier, out_right),
            next_left(tree, hier, out_left),
        ) else {
            break;
        };
        out_right = or;
        out_left = ol;

        hier[out_right.0].ancestor = v;
        let shift = hier[il.0].prelim + sum_in_left - hier[ir.0].prelim - sum_in_right
            + separation.between(tree, il, ir);
        if shift > 0.0 {
            let wl = next_ancestor(tree, hier, il, v, ancestor);
            move_subtree(hier, wl, v, shift);
            sum_in_right += shift;
            sum_out_right += shift;
        }
        sum_in_left += hier[il.0].modifier;
        sum_in_right += hier[ir.0].modifier;
        sum_out_right += hier[out_right.0].modifier;
        sum_out_left += hier[out_left.0].modifier;
    }

    if let Some(il) = in_left {
        if next_right(tree, hier, out_right).is_none() {
            hier[out_right.0].thread = Some(il);
            hier[out_right.0].modifier += sum_in_left - sum_out_right;
        }
    }
    if let Some(ir) = in_right {
        if next_left(tree, hier, out_left).is_none() {
            hier[out_left.0].thread = Some(ir);
            hier[out_left.0].modifier += sum_in_right - sum_out_left;
            ancestor = v;
        }
    }
    ancestor
}

/// Next node on the right contour: the rightmost visible child, else the thread.
fn next_right(tree: &LayoutTree, hier: &[HierNode], v: NodeId) -> Option<NodeId> {
    match tree.node(v).visible_children().last() {
        Some(&c) => Some(c),
        None => hier[v.0].thread,
    }
}

/// Next node on the left contour: the leftmost visible child, else the thread.
fn next_left(tree: &LayoutTree, hier: &[HierNode], v: NodeId) -> Option<NodeId> {
    match tree.node(v).visible_children().first() {
        Some(&c) => Some(c),
        None => hier[v.0].thread,
    }
}

/// `in_left`'s ancestor when it is a sibling of `v`, otherwise the fallback `ancestor`.
fn next_ancestor(
    tree: &LayoutTree,
    hier: &[HierNode],
    in_left: NodeId,
    v: NodeId,
    ancestor: NodeId,
) -> NodeId {
    let candidate = hier[in_left.0].ancestor;
    if tree.node(candidate).parent() == tree.node(v).parent() {
        candidate
    } else {
        ancestor
    }
}

/// Shifts the subtree rooted at `wr` and records the spread for the siblings between
/// `wl` and `wr`, to be applied by `execute_shifts`.
fn move_subtree(hier: &mut [HierNode], wl: NodeId, wr: NodeId, shift: f64) {
    let change = shift / (hier[wr.0].i as f64 - hier[wl.0].i as f64);
    let r = &mut hier[wr.0];
    r.change -= change;
    r.shift += shift;
    r.modifier += shift;
    r.prelim += shift;
    hier[wl.0].change += change;
}
