#![forbid(unsafe_code)]

//! Headless layout engines for node-link trees and sankey flow diagrams.
//!
//! Engines operate on `steller-graphlib` containers and only write layout fields into the
//! node/edge labels; they never add or remove elements. Every call recomputes from scratch.

pub mod box_layout;
pub mod error;
pub mod sankey;
pub mod tree;

pub use steller_graphlib as graphlib;

pub use box_layout::{BoxLayoutParams, LayoutRect, PositionValue, get_layout_rect, parse_percent};
pub use error::{Error, Result};
pub use sankey::{
    NodeAlign, SankeyEdge, SankeyEdgeLayout, SankeyGraph, SankeyLayoutOptions, SankeyNode,
    SankeyNodeLayout, SankeyOrient,
};
pub use tree::{
    Orient, Separation, SeparationFn, TreeLayoutKind, TreeLayoutOptions, TreeNodeLayout,
    radial_coordinate,
};
