//! Typed series options.
//!
//! Field names follow the camelCase JSON keys. Missing keys take the chart defaults; the box
//! layout defaults are applied by [`TreeSeriesOption::box_layout_params`] and
//! [`SankeySeriesOption::box_layout_params`] so callers can still tell what was set.

use serde::Deserialize;
use serde_json::Value;
use steller_layout::{BoxLayoutParams, PositionValue};

fn default_true() -> bool {
    true
}

fn default_tree_layout() -> String {
    "orthogonal".to_string()
}

fn default_tree_orient() -> String {
    "LR".to_string()
}

fn default_initial_tree_depth() -> i64 {
    2
}

fn default_node_width() -> f64 {
    20.0
}

fn default_node_gap() -> f64 {
    8.0
}

fn default_layout_iterations() -> f64 {
    32.0
}

fn default_sankey_orient() -> String {
    "horizontal".to_string()
}

fn default_node_align() -> String {
    "justify".to_string()
}

/// Fills unset edges of `params` with the given defaults.
fn with_default_edges(
    params: &BoxLayoutParams,
    [left, top, right, bottom]: [&str; 4],
) -> BoxLayoutParams {
    let or = |v: &Option<PositionValue>, d: &str| Some(v.clone().unwrap_or_else(|| d.into()));
    BoxLayoutParams {
        left: or(&params.left, left),
        top: or(&params.top, top),
        right: or(&params.right, right),
        bottom: or(&params.bottom, bottom),
        width: params.width.clone(),
        height: params.height.clone(),
    }
}

/// Displayable name of a data item. Numbers are accepted as names.
pub(crate) fn name_of(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSeriesOption {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// `orthogonal` or `radial`.
    #[serde(default = "default_tree_layout")]
    pub layout: String,
    /// `LR`, `RL`, `TB`, `BT`, or the legacy `horizontal` / `vertical`.
    #[serde(default = "default_tree_orient")]
    pub orient: String,
    #[serde(flatten)]
    pub box_layout: BoxLayoutParams,
    #[serde(default = "default_true")]
    pub expand_and_collapse: bool,
    #[serde(default = "default_initial_tree_depth")]
    pub initial_tree_depth: i64,
    #[serde(default)]
    pub data: Vec<TreeDataItem>,
}

impl TreeSeriesOption {
    pub fn box_layout_params(&self) -> BoxLayoutParams {
        with_default_edges(&self.box_layout, ["12%", "12%", "12%", "12%"])
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TreeDataItem {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub collapsed: Option<bool>,
    #[serde(default)]
    pub children: Vec<TreeDataItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SankeySeriesOption {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_node_width")]
    pub node_width: f64,
    #[serde(default = "default_node_gap")]
    pub node_gap: f64,
    #[serde(default = "default_layout_iterations")]
    pub layout_iterations: f64,
    /// `horizontal` or `vertical`.
    #[serde(default = "default_sankey_orient")]
    pub orient: String,
    /// `left`, `right` or `justify`.
    #[serde(default = "default_node_align")]
    pub node_align: String,
    #[serde(flatten)]
    pub box_layout: BoxLayoutParams,
    #[serde(default)]
    pub data: Option<Vec<SankeyNodeItem>>,
    #[serde(default)]
    pub nodes: Option<Vec<SankeyNodeItem>>,
    #[serde(default)]
    pub links: Option<Vec<SankeyEdgeItem>>,
    #[serde(default)]
    pub edges: Option<Vec<SankeyEdgeItem>>,
}

impl SankeySeriesOption {
    pub fn box_layout_params(&self) -> BoxLayoutParams {
        with_default_edges(&self.box_layout, ["5%", "5%", "20%", "5%"])
    }

    /// `data` wins over `nodes`.
    pub fn node_items(&self) -> &[SankeyNodeItem] {
        self.data
            .as_deref()
            .or(self.nodes.as_deref())
            .unwrap_or_default()
    }

    /// `edges` wins over `links`.
    pub fn edge_items(&self) -> &[SankeyEdgeItem] {
        self.edges
            .as_deref()
            .or(self.links.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SankeyNodeItem {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub depth: Option<f64>,
}

impl SankeyNodeItem {
    /// Graph key of the node: `id` when present, else `name`.
    pub fn key(&self) -> Option<String> {
        name_of(self.id.as_ref()).or(name_of(self.name.as_ref()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SankeyEdgeItem {
    /// Node key or node index.
    #[serde(default)]
    pub source: Option<Value>,
    #[serde(default)]
    pub target: Option<Value>,
    #[serde(default)]
    pub value: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tree_defaults() {
        let opt: TreeSeriesOption = serde_json::from_value(json!({ "type": "tree" })).unwrap();
        assert_eq!(opt.layout, "orthogonal");
        assert_eq!(opt.orient, "LR");
        assert!(opt.expand_and_collapse);
        assert_eq!(opt.initial_tree_depth, 2);
        let params = opt.box_layout_params();
        assert_eq!(params.left, Some("12%".into()));
        assert_eq!(params.bottom, Some("12%".into()));
        assert_eq!(params.width, None);
    }

    #[test]
    fn explicit_edges_are_kept() {
        let opt: SankeySeriesOption =
            serde_json::from_value(json!({ "type": "sankey", "left": 30, "right": "10%" }))
                .unwrap();
        let params = opt.box_layout_params();
        assert_eq!(params.left, Some(PositionValue::Number(30.0)));
        assert_eq!(params.right, Some("10%".into()));
        assert_eq!(params.top, Some("5%".into()));
        assert_eq!(opt.node_width, 20.0);
        assert_eq!(opt.layout_iterations, 32.0);
        assert_eq!(opt.node_align, "justify");
    }

    #[test]
    fn data_and_edges_take_precedence() {
        let opt: SankeySeriesOption = serde_json::from_value(json!({
            "nodes": [{ "name": "n" }],
            "data": [{ "name": "a" }, { "id": 7, "name": "b" }],
            "links": [{ "source": "a", "target": "b" }],
            "edges": []
        }))
        .unwrap();
        let keys: Vec<_> = opt.node_items().iter().map(SankeyNodeItem::key).collect();
        assert_eq!(keys, [Some("a".to_string()), Some("7".to_string())]);
        assert!(opt.edge_items().is_empty());
    }
}
