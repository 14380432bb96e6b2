//! Tidy tree layout for node-link and radial tree diagrams.
//!
//! Positions come from a Reingold-Tilford pass (see [`walk`]) over the expanded part of the
//! hierarchy, then get normalized and scaled into the `width` x `height` view rect. Orthogonal
//! layouts map the breadth axis and the depth axis onto the rect according to [`Orient`];
//! radial layouts map breadth to an angle in `[0, 2π)` and depth to a radius.

mod walk;

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use steller_graphlib::{NodeId, Tree, TreeNode};

/// Layout output stored on each tree node. `None` until the node has been laid out, and for
/// nodes hidden under a collapsed ancestor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeNodeLayout {
    pub x: Option<f64>,
    pub y: Option<f64>,
    /// Radial only: angle in radians before the polar conversion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_x: Option<f64>,
    /// Radial only: radius before the polar conversion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_y: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeLayoutKind {
    #[default]
    Orthogonal,
    Radial,
}

impl TreeLayoutKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "orthogonal" => Some(Self::Orthogonal),
            "radial" => Some(Self::Radial),
            _ => None,
        }
    }
}

/// Direction the tree grows in, for orthogonal layouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orient {
    #[default]
    LR,
    RL,
    TB,
    BT,
}

impl Orient {
    /// Accepts the four directions plus the legacy `horizontal` (LR) and `vertical` (TB).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LR" | "horizontal" => Some(Self::LR),
            "RL" => Some(Self::RL),
            "TB" | "vertical" => Some(Self::TB),
            "BT" => Some(Self::BT),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LR => "LR",
            Self::RL => "RL",
            Self::TB => "TB",
            Self::BT => "BT",
        }
    }

    fn is_horizontal(self) -> bool {
        matches!(self, Self::LR | Self::RL)
    }
}

pub type SeparationFn = fn(&TreeNode<TreeNodeLayout>, &TreeNode<TreeNodeLayout>) -> f64;

/// Minimum distance, in breadth units, between two adjacent nodes on the same level.
#[derive(Debug, Clone, Copy, Default)]
pub enum Separation {
    /// 1 between siblings, 2 between cousins.
    #[default]
    Default,
    /// [`Separation::Default`] divided by the depth of the first node, so that outer rings
    /// (which have more circumference) pack tighter in angle.
    Radial,
    Custom(SeparationFn),
}

impl Separation {
    pub(crate) fn between(&self, tree: &Tree<TreeNodeLayout>, a: NodeId, b: NodeId) -> f64 {
        let (na, nb) = (tree.node(a), tree.node(b));
        let same_parent = || if na.parent() == nb.parent() { 1.0 } else { 2.0 };
        match self {
            Separation::Default => same_parent(),
            Separation::Radial => same_parent() / na.depth() as f64,
            Separation::Custom(f) => f(na, nb),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TreeLayoutOptions {
    pub layout: TreeLayoutKind,
    pub orient: Orient,
    /// Size of the view rect the tree is fitted into.
    pub width: f64,
    pub height: f64,
    /// Overrides the separation implied by `layout`.
    pub separation: Option<SeparationFn>,
}

impl TreeLayoutOptions {
    fn effective_separation(&self) -> Separation {
        match (self.separation, self.layout) {
            (Some(f), _) => Separation::Custom(f),
            (None, TreeLayoutKind::Radial) => Separation::Radial,
            (None, TreeLayoutKind::Orthogonal) => Separation::Default,
        }
    }
}

/// Converts a polar position (angle measured clockwise from 12 o'clock) to cartesian.
pub fn radial_coordinate(rad: f64, r: f64) -> (f64, f64) {
    let rad = rad - PI / 2.0;
    (r * rad.cos(), r * rad.sin())
}

/// Lays out the expanded part of `tree`, writing [`TreeNodeLayout`] on every visible node.
///
/// Coordinates are relative to the view rect origin. Nodes hidden under a collapsed ancestor
/// get their layout cleared. A tree without data is left untouched.
pub fn layout(tree: &mut Tree<TreeNodeLayout>, opts: &TreeLayoutOptions) {
    let Some(real_root) = tree.real_root() else {
        return;
    };
    let separation = opts.effective_separation();

    for v in tree.node_ids() {
        *tree.label_mut(v) = TreeNodeLayout::default();
    }

    let mut hier = walk::init(tree, tree.root());
    let order = tree.expanded_postorder(real_root);
    for &v in &order {
        walk::first_walk(tree, &mut hier, v, &separation);
    }
    hier[tree.root().index()].modifier = -hier[real_root.index()].prelim;
    let order = tree.expanded_preorder(real_root);
    for &v in &order {
        walk::second_walk(tree, &mut hier, v);
    }

    let local_x = |tree: &Tree<TreeNodeLayout>, v: NodeId| tree.label(v).x.unwrap_or(0.0);
    let (mut left, mut right, mut bottom) = (real_root, real_root, real_root);
    for &v in &order {
        let x = local_x(tree, v);
        if x < local_x(tree, left) {
            left = v;
        }
        if x > local_x(tree, right) {
            right = v;
        }
        if tree.node(v).depth() > tree.node(bottom).depth() {
            bottom = v;
        }
    }

    let delta = if left == right {
        1.0
    } else {
        separation.between(tree, left, right) / 2.0
    };
    let tx = delta - local_x(tree, left);
    let breadth = local_x(tree, right) + delta + tx;
    let levels = match tree.node(bottom).depth().saturating_sub(1) {
        0 => 1.0,
        n => n as f64,
    };

    tracing::debug!(
        nodes = order.len(),
        layout = ?opts.layout,
        orient = opts.orient.as_str(),
        "tree layout"
    );

    match opts.layout {
        TreeLayoutKind::Radial => {
            let kx = 2.0 * PI / breadth;
            let ky = opts.width.min(opts.height) / 2.0 / levels;
            for &v in &order {
                let coor_x = (local_x(tree, v) + tx) * kx;
                let coor_y = (tree.node(v).depth() as f64 - 1.0) * ky;
                let (x, y) = radial_coordinate(coor_x, coor_y);
                *tree.label_mut(v) = TreeNodeLayout {
                    x: Some(x),
                    y: Some(y),
                    raw_x: Some(coor_x),
                    raw_y: Some(coor_y),
                };
            }
        }
        TreeLayoutKind::Orthogonal if opts.orient.is_horizontal() => {
            let ky = opts.height / breadth;
            let kx = opts.width / levels;
            for &v in &order {
                let level = tree.node(v).depth() as f64 - 1.0;
                let y = (local_x(tree, v) + tx) * ky;
                let x = match opts.orient {
                    Orient::RL => opts.width - level * kx,
                    _ => level * kx,
                };
                let label = tree.label_mut(v);
                label.x = Some(x);
                label.y = Some(y);
            }
        }
        TreeLayoutKind::Orthogonal => {
            let kx = opts.width / breadth;
            let ky = opts.height / levels;
            for &v in &order {
                let level = tree.node(v).depth() as f64 - 1.0;
                let x = (local_x(tree, v) + tx) * kx;
                let y = match opts.orient {
                    Orient::BT => opts.height - level * ky,
                    _ => level * ky,
                };
                let label = tree.label_mut(v);
                label.x = Some(x);
                label.y = Some(y);
            }
        }
    }
}
