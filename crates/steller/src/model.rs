//! Chart and series models built from the option JSON.
//!
//! A [`GlobalModel`] holds one [`SeriesModel`] per entry of `option.series`, in order. Tree and
//! sankey series own the hierarchy / graph their layout stage writes into; other series types
//! are kept as placeholders so series indices stay aligned with the option.

use serde_json::Value;
use steller_graphlib::{NodeId, NodeRef, Tree};
use steller_layout::{
    BoxLayoutParams, LayoutRect, NodeAlign, Orient, SankeyEdge, SankeyGraph,
    SankeyLayoutOptions, SankeyNode, SankeyOrient, TreeLayoutKind, TreeNodeLayout,
};

use crate::option::{SankeySeriesOption, TreeDataItem, TreeSeriesOption, name_of};
use crate::{Error, Result};

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidOption {
        message: message.into(),
    }
}

/// Numeric value of a data field. Numeric strings are accepted.
fn number_of(v: Option<&Value>) -> Option<f64> {
    match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct TreeSeriesModel {
    pub series_index: usize,
    pub option: TreeSeriesOption,
    pub layout: TreeLayoutKind,
    pub orient: Orient,
    /// View rect of the last layout pass.
    pub layout_info: Option<LayoutRect>,
    tree: Tree<TreeNodeLayout>,
    values: Vec<Option<Value>>,
}

impl TreeSeriesModel {
    pub fn new(series_index: usize, option: TreeSeriesOption) -> Result<Self> {
        let layout = TreeLayoutKind::parse(&option.layout).ok_or_else(|| {
            invalid(format!(
                "series[{series_index}]: unknown tree layout {:?}",
                option.layout
            ))
        })?;
        let orient = Orient::parse(&option.orient).ok_or_else(|| {
            invalid(format!(
                "series[{series_index}]: unknown tree orient {:?}",
                option.orient
            ))
        })?;

        let mut tree = Tree::new(option.name.clone().unwrap_or_default());
        let mut values = vec![None];
        let mut collapsed = vec![None];
        let root = tree.root();
        let mut stack: Vec<(NodeId, &TreeDataItem)> =
            option.data.iter().rev().map(|item| (root, item)).collect();
        while let Some((parent, item)) = stack.pop() {
            let v = tree.add_child(parent, name_of(item.name.as_ref()).unwrap_or_default());
            values.push(item.value.clone());
            collapsed.push(item.collapsed);
            stack.extend(item.children.iter().rev().map(|child| (v, child)));
        }
        tree.update_depth_and_height();

        let expand_depth = if option.expand_and_collapse && option.initial_tree_depth >= 0 {
            option.initial_tree_depth as usize
        } else {
            tree.max_depth()
        };
        for v in tree.node_ids() {
            let is_expand = match collapsed[v.index()] {
                Some(c) => !c,
                None => tree.node(v).depth() <= expand_depth,
            };
            tree.set_expand(v, is_expand);
        }

        tracing::debug!(
            series_index,
            nodes = tree.len() - 1,
            expand_depth,
            "tree series model"
        );
        Ok(Self {
            series_index,
            option,
            layout,
            orient,
            layout_info: None,
            tree,
            values,
        })
    }

    pub fn get_box_layout_params(&self) -> BoxLayoutParams {
        self.option.box_layout_params()
    }

    pub fn get_data(&self) -> &Tree<TreeNodeLayout> {
        &self.tree
    }

    pub fn get_data_mut(&mut self) -> &mut Tree<TreeNodeLayout> {
        &mut self.tree
    }

    /// Raw `value` of the data item behind `v`.
    pub fn value(&self, v: NodeId) -> Option<&Value> {
        self.values.get(v.index())?.as_ref()
    }
}

#[derive(Debug, Clone)]
pub struct SankeySeriesModel {
    pub series_index: usize,
    pub option: SankeySeriesOption,
    /// Engine options without the view size, which is only known at layout time.
    pub layout_options: SankeyLayoutOptions,
    /// View rect of the last layout pass.
    pub layout_info: Option<LayoutRect>,
    graph: SankeyGraph,
}

impl SankeySeriesModel {
    pub fn new(series_index: usize, option: SankeySeriesOption) -> Result<Self> {
        let orient = SankeyOrient::parse(&option.orient).ok_or_else(|| {
            invalid(format!(
                "series[{series_index}]: unknown sankey orient {:?}",
                option.orient
            ))
        })?;
        let node_align = NodeAlign::parse(&option.node_align).ok_or_else(|| {
            invalid(format!(
                "series[{series_index}]: unknown nodeAlign {:?}",
                option.node_align
            ))
        })?;
        let iterations = option.layout_iterations;
        if !(iterations.is_finite() && iterations >= 0.0) {
            return Err(invalid(format!(
                "series[{series_index}]: invalid layoutIterations {iterations}"
            )));
        }

        let mut graph = SankeyGraph::new();
        for (i, item) in option.node_items().iter().enumerate() {
            let key = item.key().unwrap_or_else(|| i.to_string());
            let value = number_of(item.value.as_ref());
            // Negative or non-finite depths fall back to the computed column.
            let depth = item
                .depth
                .filter(|d| d.is_finite() && *d >= 0.0)
                .map(|d| d as i64);
            graph.add_node(key, SankeyNode::new(value, depth));
        }
        for item in option.edge_items() {
            let (Some(source), Some(target)) = (
                node_ref(item.source.as_ref()),
                node_ref(item.target.as_ref()),
            ) else {
                tracing::warn!(
                    series_index,
                    "sankey edge without source or target; edge dropped"
                );
                continue;
            };
            let value = number_of(item.value.as_ref()).unwrap_or(f64::NAN);
            graph.add_edge(source, target, SankeyEdge::new(value));
        }

        tracing::debug!(
            series_index,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "sankey series model"
        );
        let layout_options = SankeyLayoutOptions {
            node_width: option.node_width,
            node_gap: option.node_gap,
            layout_iterations: iterations as usize,
            orient,
            node_align,
            ..SankeyLayoutOptions::default()
        };
        Ok(Self {
            series_index,
            option,
            layout_options,
            layout_info: None,
            graph,
        })
    }

    pub fn get_box_layout_params(&self) -> BoxLayoutParams {
        self.option.box_layout_params()
    }

    pub fn get_graph(&self) -> &SankeyGraph {
        &self.graph
    }

    pub fn get_graph_mut(&mut self) -> &mut SankeyGraph {
        &mut self.graph
    }
}

fn node_ref(v: Option<&Value>) -> Option<NodeRef<'_>> {
    match v? {
        Value::String(s) => Some(NodeRef::Id(s)),
        Value::Number(n) => n
            .as_u64()
            .and_then(|i| usize::try_from(i).ok())
            .map(NodeRef::Index),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub enum SeriesModel {
    Tree(TreeSeriesModel),
    Sankey(SankeySeriesModel),
    /// A chart type this crate does not lay out.
    Other {
        series_index: usize,
        series_type: String,
    },
}

impl SeriesModel {
    fn from_option(series_index: usize, item: &Value) -> Result<Self> {
        let series_type = item
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid(format!("series[{series_index}] has no type")))?;
        Ok(match series_type {
            "tree" => Self::Tree(TreeSeriesModel::new(
                series_index,
                serde_json::from_value(item.clone())?,
            )?),
            "sankey" => Self::Sankey(SankeySeriesModel::new(
                series_index,
                serde_json::from_value(item.clone())?,
            )?),
            other => Self::Other {
                series_index,
                series_type: other.to_string(),
            },
        })
    }

    pub fn series_type(&self) -> &str {
        match self {
            Self::Tree(_) => "tree",
            Self::Sankey(_) => "sankey",
            Self::Other { series_type, .. } => series_type,
        }
    }

    pub fn series_index(&self) -> usize {
        match self {
            Self::Tree(m) => m.series_index,
            Self::Sankey(m) => m.series_index,
            Self::Other { series_index, .. } => *series_index,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Tree(m) => m.option.name.as_deref(),
            Self::Sankey(m) => m.option.name.as_deref(),
            Self::Other { .. } => None,
        }
    }

    pub fn get_box_layout_params(&self) -> Option<BoxLayoutParams> {
        match self {
            Self::Tree(m) => Some(m.get_box_layout_params()),
            Self::Sankey(m) => Some(m.get_box_layout_params()),
            Self::Other { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GlobalModel {
    series: Vec<SeriesModel>,
}

impl GlobalModel {
    /// Builds the models of every series in `option.series` (an object or an array).
    pub fn from_option(option: &Value) -> Result<Self> {
        let Some(root) = option.as_object() else {
            return Err(invalid("chart option must be an object"));
        };
        let items: &[Value] = match root.get("series") {
            None | Some(Value::Null) => &[],
            Some(Value::Array(items)) => items,
            Some(item @ Value::Object(_)) => std::slice::from_ref(item),
            Some(_) => return Err(invalid("series must be an object or an array")),
        };
        let series = items
            .iter()
            .enumerate()
            .map(|(i, item)| SeriesModel::from_option(i, item))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { series })
    }

    pub fn series(&self) -> &[SeriesModel] {
        &self.series
    }

    /// Calls `f` on every series of the given type, in option order, stopping at the first
    /// error.
    pub fn each_series_by_type<F>(&mut self, series_type: &str, mut f: F) -> Result<()>
    where
        F: FnMut(&mut SeriesModel) -> Result<()>,
    {
        for series in self
            .series
            .iter_mut()
            .filter(|s| s.series_type() == series_type)
        {
            f(series)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree_model(option: Value) -> TreeSeriesModel {
        let model = GlobalModel::from_option(&json!({ "series": option })).unwrap();
        match &model.series()[0] {
            SeriesModel::Tree(m) => m.clone(),
            other => panic!("not a tree series: {other:?}"),
        }
    }

    #[test]
    fn tree_data_is_indexed_in_pre_order_under_a_virtual_root() {
        let m = tree_model(json!({
            "type": "tree",
            "name": "org",
            "data": [{ "name": "root", "value": 3, "children": [
                { "name": "a", "children": [{ "name": "a1" }] },
                { "name": 42 }
            ]}]
        }));
        let t = m.get_data();
        assert_eq!(t.node(t.root()).name(), "org");
        let names: Vec<&str> = t
            .preorder()
            .into_iter()
            .map(|v| t.node(v).name())
            .collect();
        assert_eq!(names, ["org", "root", "a", "a1", "42"]);
        let a1 = t.node_by_name("a1").unwrap();
        assert_eq!(t.node(a1).data_index(), 3);
        assert_eq!(t.node(a1).depth(), 3);
        assert_eq!(m.value(t.real_root().unwrap()), Some(&json!(3)));
    }

    #[test]
    fn initial_tree_depth_collapses_deep_nodes() {
        let data = json!([{ "name": "r", "children": [
            { "name": "a", "children": [{ "name": "a1", "children": [{ "name": "a11" }] }] },
            { "name": "b", "collapsed": true, "children": [{ "name": "b1" }] }
        ]}]);
        let m = tree_model(json!({ "type": "tree", "initialTreeDepth": 2, "data": data }));
        let t = m.get_data();
        let expand = |n: &str| t.node(t.node_by_name(n).unwrap()).is_expand;
        assert!(expand("r"));
        assert!(expand("a"));
        assert!(!expand("a1"));
        assert!(!expand("b"));

        let m = tree_model(json!({ "type": "tree", "initialTreeDepth": -1, "data": data }));
        let t = m.get_data();
        let expand = |n: &str| t.node(t.node_by_name(n).unwrap()).is_expand;
        assert!(expand("a1"));
        assert!(!expand("b"));

        let m = tree_model(json!({ "type": "tree", "expandAndCollapse": false, "data": data }));
        let t = m.get_data();
        assert!(t.node(t.node_by_name("a11").unwrap()).is_expand);
    }

    #[test]
    fn legacy_orient_names_are_normalized() {
        let m = tree_model(json!({ "type": "tree", "orient": "vertical" }));
        assert_eq!(m.orient, Orient::TB);
        let option = json!({ "series": { "type": "tree", "orient": "up" } });
        let err = GlobalModel::from_option(&option).unwrap_err();
        assert!(matches!(err, Error::InvalidOption { .. }));
    }

    #[test]
    fn sankey_graph_accepts_names_and_indices() {
        let model = GlobalModel::from_option(&json!({ "series": [{
            "type": "sankey",
            "data": [{ "name": "a" }, { "name": "b", "value": "4" }, { "name": "c", "depth": 2 }],
            "links": [
                { "source": "a", "target": "b", "value": 5 },
                { "source": 1, "target": 2, "value": "n/a" },
                { "source": "a", "target": "missing", "value": 1 },
                { "target": "b", "value": 1 }
            ]
        }]}))
        .unwrap();
        let SeriesModel::Sankey(m) = &model.series()[0] else {
            panic!("expected a sankey series");
        };
        let g = m.get_graph();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
        let b = g.node_by_id("b").unwrap();
        assert_eq!(g.node(b).label.value, Some(4.0));
        let c = g.node_by_id("c").unwrap();
        assert_eq!(g.node(c).label.depth, Some(2));
        assert!(g.edges().nth(1).unwrap().label.value.is_nan());
        assert_eq!(m.layout_options.layout_iterations, 32);
    }

    #[test]
    fn negative_sankey_depths_are_ignored() {
        let model = GlobalModel::from_option(&json!({ "series": { "type": "sankey", "data": [
            { "name": "a", "depth": -0.5 },
            { "name": "b", "depth": -3 },
            { "name": "c", "depth": 0 },
            { "name": "d", "depth": 1.5 }
        ]}}))
        .unwrap();
        let SeriesModel::Sankey(m) = &model.series()[0] else {
            panic!("expected a sankey series");
        };
        let g = m.get_graph();
        let depth = |id: &str| g.node(g.node_by_id(id).unwrap()).label.depth;
        assert_eq!(depth("a"), None);
        assert_eq!(depth("b"), None);
        assert_eq!(depth("c"), Some(0));
        assert_eq!(depth("d"), Some(1));
    }

    #[test]
    fn invalid_sankey_options_are_reported() {
        for bad in [
            json!({ "type": "sankey", "orient": "diagonal" }),
            json!({ "type": "sankey", "nodeAlign": "center" }),
            json!({ "type": "sankey", "layoutIterations": -3 }),
        ] {
            let err = GlobalModel::from_option(&json!({ "series": bad })).unwrap_err();
            assert!(matches!(err, Error::InvalidOption { .. }), "{err}");
        }
        let option = json!({ "series": { "type": "sankey", "nodeWidth": "wide" } });
        let err = GlobalModel::from_option(&option).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn each_series_by_type_visits_matching_series_in_order() {
        let mut model = GlobalModel::from_option(&json!({ "series": [
            { "type": "sankey" },
            { "type": "pie" },
            { "type": "sankey", "name": "second" }
        ]}))
        .unwrap();
        let mut seen = Vec::new();
        model
            .each_series_by_type("sankey", |s| {
                seen.push(s.series_index());
                Ok(())
            })
            .unwrap();
        assert_eq!(seen, [0, 2]);
        assert_eq!(model.series()[1].series_type(), "pie");
        assert_eq!(model.series()[2].name(), Some("second"));
    }
}
