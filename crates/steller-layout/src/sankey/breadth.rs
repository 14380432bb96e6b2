//! Column (breadth) assignment along the main axis.

use super::{NodeAlign, SankeyGraph, SankeyLayoutOptions};
use crate::error::{Error, Result};

/// Assigns every node a column with Kahn's algorithm, applies the node alignment and writes
/// the main-axis position and thickness.
pub(super) fn compute_node_breadths(
    graph: &mut SankeyGraph,
    opts: &SankeyLayoutOptions,
) -> Result<()> {
    let mut remaining = vec![true; graph.edge_count()];
    let mut indegree: Vec<usize> = graph.node_ids().map(|v| graph.in_edges(v).len()).collect();
    let mut zero_indegrees: Vec<_> = graph.node_ids().filter(|v| indegree[v.0] == 0).collect();
    let mut next = Vec::new();
    let mut layer = 0usize;
    let mut max_node_depth: Option<usize> = None;

    while !zero_indegrees.is_empty() {
        for &v in &zero_indegrees {
            let node = &mut graph.node_mut(v).label;
            let explicit = node.explicit_depth();
            if let Some(d) = explicit {
                max_node_depth = Some(max_node_depth.map_or(d, |m| m.max(d)));
            }
            node.layout.depth = explicit.unwrap_or(layer);
            node.layout.set_main_len(opts.orient, opts.node_width);

            for &e in graph.out_edges(v) {
                remaining[e.0] = false;
                let target = graph.edge(e).node2();
                indegree[target.0] -= 1;
                if indegree[target.0] == 0 {
                    next.push(target);
                }
            }
        }
        layer += 1;
        zero_indegrees = std::mem::take(&mut next);
    }

    let remaining_edges = remaining.iter().filter(|&&r| r).count();
    if remaining_edges > 0 {
        return Err(Error::Cycle { remaining_edges });
    }

    let last_layer = layer.saturating_sub(1);
    let max_depth = max_node_depth.map_or(last_layer, |d| d.max(last_layer));
    match opts.node_align {
        NodeAlign::Left => {}
        NodeAlign::Right => align_right(graph, max_depth),
        NodeAlign::Justify => move_sinks_right(graph, max_depth),
    }

    let k = if max_depth == 0 {
        0.0
    } else {
        (opts.main_extent() - opts.node_width) / max_depth as f64
    };
    for v in graph.node_ids() {
        let layout = &mut graph.node_mut(v).label.layout;
        layout.set_main(opts.orient, layout.depth as f64 * k);
    }
    tracing::debug!(columns = max_depth + 1, k, "sankey breadths");
    Ok(())
}

/// Records each node's distance to its furthest sink, then places nodes without an explicit
/// depth that many columns before the last one.
fn align_right(graph: &mut SankeyGraph, max_depth: usize) {
    let mut remain: Vec<_> = graph.node_ids().collect();
    let mut next_seen = vec![false; graph.node_count()];
    let mut height = 0usize;
    while !remain.is_empty() {
        let mut next_source = Vec::new();
        for &v in &remain {
            graph.node_mut(v).label.layout.sk_node_height = Some(height);
            for &e in graph.in_edges(v) {
                let source = graph.edge(e).node1();
                if !next_seen[source.0] {
                    next_seen[source.0] = true;
                    next_source.push(source);
                }
            }
        }
        remain = next_source;
        next_seen.fill(false);
        height += 1;
    }

    for v in graph.node_ids() {
        let node = &mut graph.node_mut(v).label;
        if node.explicit_depth().is_none() {
            let h = node.layout.sk_node_height.unwrap_or(0);
            node.layout.depth = max_depth.saturating_sub(h);
        }
    }
}

fn move_sinks_right(graph: &mut SankeyGraph, max_depth: usize) {
    for v in graph.node_ids() {
        let is_sink = graph.out_edges(v).is_empty();
        let node = &mut graph.node_mut(v).label;
        if is_sink && node.explicit_depth().is_none() {
            node.layout.depth = max_depth;
        }
    }
}
