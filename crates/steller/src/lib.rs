#![forbid(unsafe_code)]

//! Chart-level entry point for the tree and sankey layouts.
//!
//! [`layout_chart`] takes a chart option (the `series` part of an ECharts-style option JSON),
//! builds one model per series, runs the tree and sankey layout stages against the viewport
//! reported by an [`ExtensionApi`], and returns the resulting geometry as a [`ChartLayout`].
//! Series of other chart types are accepted and skipped.

pub mod api;
pub mod layout;
pub mod model;
pub mod option;

pub use steller_graphlib as graphlib;
pub use steller_layout as engine;

pub use api::{ExtensionApi, Viewport};
pub use layout::{
    ChartLayout, SankeyEdgeResult, SankeyNodeResult, SankeySeriesLayout, SeriesLayout,
    TreeNodeResult, TreeSeriesLayout, sankey_layout, tree_layout,
};
pub use model::{GlobalModel, SankeySeriesModel, SeriesModel, TreeSeriesModel};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("chart option JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Layout(#[from] steller_layout::Error),
    #[error("invalid chart option: {message}")]
    InvalidOption { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Lays out every tree and sankey series of `option`.
pub fn layout_chart(option: &serde_json::Value, api: &dyn ExtensionApi) -> Result<ChartLayout> {
    let mut ec_model = GlobalModel::from_option(option)?;
    tree_layout(&mut ec_model, api)?;
    sankey_layout(&mut ec_model, api)?;
    let out = ChartLayout::from_model(&ec_model);
    tracing::debug!(series = out.series.len(), "chart layout");
    Ok(out)
}

/// Same as [`layout_chart`], for an option still in JSON text form.
pub fn layout_chart_str(option: &str, api: &dyn ExtensionApi) -> Result<ChartLayout> {
    let option: serde_json::Value = serde_json::from_str(option)?;
    layout_chart(&option, api)
}
