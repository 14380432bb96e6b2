//! Layout stages and their serializable results.
//!
//! Each stage visits the series of its chart type, resolves the series' view rect against the
//! viewport, and runs the matching engine from `steller-layout` on the series data.

use serde::Serialize;
use serde_json::Value;
use steller_layout::{
    BoxLayoutParams, LayoutRect, Orient, SankeyEdgeLayout, SankeyLayoutOptions, SankeyNodeLayout,
    SankeyOrient, TreeLayoutKind, TreeLayoutOptions, TreeNodeLayout, get_layout_rect, sankey,
    tree,
};

use crate::Result;
use crate::api::ExtensionApi;
use crate::model::{GlobalModel, SankeySeriesModel, SeriesModel, TreeSeriesModel};

fn get_view_rect(params: &BoxLayoutParams, api: &dyn ExtensionApi) -> LayoutRect {
    get_layout_rect(params, api.get_width(), api.get_height())
}

/// Lays out every tree series.
pub fn tree_layout(ec_model: &mut GlobalModel, api: &dyn ExtensionApi) -> Result<()> {
    ec_model.each_series_by_type("tree", |series| {
        if let SeriesModel::Tree(model) = series {
            common_layout(model, api);
        }
        Ok(())
    })
}

fn common_layout(series_model: &mut TreeSeriesModel, api: &dyn ExtensionApi) {
    let rect = get_view_rect(&series_model.get_box_layout_params(), api);
    series_model.layout_info = Some(rect);
    let opts = TreeLayoutOptions {
        layout: series_model.layout,
        orient: series_model.orient,
        width: rect.width,
        height: rect.height,
        separation: None,
    };
    tracing::debug!(
        series_index = series_model.series_index,
        layout = ?opts.layout,
        orient = opts.orient.as_str(),
        width = rect.width,
        height = rect.height,
        "tree layout"
    );
    tree::layout(series_model.get_data_mut(), &opts);
}

/// Lays out every sankey series. Stops at the first series whose data has a cycle.
pub fn sankey_layout(ec_model: &mut GlobalModel, api: &dyn ExtensionApi) -> Result<()> {
    ec_model.each_series_by_type("sankey", |series| {
        if let SeriesModel::Sankey(model) = series {
            sankey_series_layout(model, api)?;
        }
        Ok(())
    })
}

fn sankey_series_layout(
    series_model: &mut SankeySeriesModel,
    api: &dyn ExtensionApi,
) -> Result<()> {
    let rect = get_view_rect(&series_model.get_box_layout_params(), api);
    series_model.layout_info = Some(rect);
    let opts = SankeyLayoutOptions {
        width: rect.width,
        height: rect.height,
        ..series_model.layout_options
    };
    tracing::debug!(
        series_index = series_model.series_index,
        width = rect.width,
        height = rect.height,
        iterations = opts.layout_iterations,
        "sankey layout"
    );
    sankey::layout(series_model.get_graph_mut(), &opts)?;
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChartLayout {
    pub series: Vec<SeriesLayout>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SeriesLayout {
    Tree(TreeSeriesLayout),
    Sankey(SankeySeriesLayout),
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeSeriesLayout {
    pub series_index: usize,
    pub name: Option<String>,
    pub layout_info: LayoutRect,
    pub layout: TreeLayoutKind,
    pub orient: Orient,
    /// Visible nodes in pre-order, starting at the real root.
    pub nodes: Vec<TreeNodeResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeNodeResult {
    pub name: String,
    pub data_index: usize,
    pub depth: usize,
    pub parent: Option<usize>,
    pub is_expand: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(flatten)]
    pub layout: TreeNodeLayout,
}

#[derive(Debug, Clone, Serialize)]
pub struct SankeySeriesLayout {
    pub series_index: usize,
    pub name: Option<String>,
    pub layout_info: LayoutRect,
    pub orient: SankeyOrient,
    pub nodes: Vec<SankeyNodeResult>,
    pub edges: Vec<SankeyEdgeResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SankeyNodeResult {
    pub id: String,
    #[serde(flatten)]
    pub layout: SankeyNodeLayout,
}

#[derive(Debug, Clone, Serialize)]
pub struct SankeyEdgeResult {
    pub source: String,
    pub target: String,
    pub value: f64,
    #[serde(flatten)]
    pub layout: SankeyEdgeLayout,
}

impl ChartLayout {
    /// Collects the laid-out tree and sankey series of `ec_model`, in series order.
    pub fn from_model(ec_model: &GlobalModel) -> Self {
        let series = ec_model
            .series()
            .iter()
            .filter_map(|series| match series {
                SeriesModel::Tree(m) => Some(SeriesLayout::Tree(tree_result(m))),
                SeriesModel::Sankey(m) => Some(SeriesLayout::Sankey(sankey_result(m))),
                SeriesModel::Other { .. } => None,
            })
            .collect();
        Self { series }
    }

    pub fn tree(&self, series_index: usize) -> Option<&TreeSeriesLayout> {
        self.series.iter().find_map(|s| match s {
            SeriesLayout::Tree(t) if t.series_index == series_index => Some(t),
            _ => None,
        })
    }

    pub fn sankey(&self, series_index: usize) -> Option<&SankeySeriesLayout> {
        self.series.iter().find_map(|s| match s {
            SeriesLayout::Sankey(t) if t.series_index == series_index => Some(t),
            _ => None,
        })
    }
}

impl TreeSeriesLayout {
    pub fn node(&self, name: &str) -> Option<&TreeNodeResult> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

impl SankeySeriesLayout {
    pub fn node(&self, id: &str) -> Option<&SankeyNodeResult> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

fn tree_result(m: &TreeSeriesModel) -> TreeSeriesLayout {
    let t = m.get_data();
    let virtual_root = t.root();
    let nodes = match t.real_root() {
        Some(root) => t
            .expanded_preorder(root)
            .into_iter()
            .map(|v| {
                let node = t.node(v);
                TreeNodeResult {
                    name: node.name().to_string(),
                    data_index: node.data_index(),
                    depth: node.depth(),
                    parent: node
                        .parent()
                        .filter(|&p| p != virtual_root)
                        .map(|p| t.node(p).data_index()),
                    is_expand: node.is_expand,
                    value: m.value(v).cloned(),
                    layout: node.label,
                }
            })
            .collect(),
        None => Vec::new(),
    };
    TreeSeriesLayout {
        series_index: m.series_index,
        name: m.option.name.clone(),
        layout_info: m.layout_info.unwrap_or_default(),
        layout: m.layout,
        orient: m.orient,
        nodes,
    }
}

fn sankey_result(m: &SankeySeriesModel) -> SankeySeriesLayout {
    let g = m.get_graph();
    let nodes = g
        .nodes()
        .map(|n| SankeyNodeResult {
            id: n.id().to_string(),
            layout: n.label.layout,
        })
        .collect();
    let edges = g
        .edges()
        .map(|e| SankeyEdgeResult {
            source: g.node(e.node1()).id().to_string(),
            target: g.node(e.node2()).id().to_string(),
            value: e.label.value,
            layout: e.label.layout,
        })
        .collect();
    SankeySeriesLayout {
        series_index: m.series_index,
        name: m.option.name.clone(),
        layout_info: m.layout_info.unwrap_or_default(),
        orient: m.layout_options.orient,
        nodes,
        edges,
    }
}
