//! Cross-axis placement: initial stacking, collision resolution and iterative relaxation.

use steller_graphlib::{EdgeId, GraphEdge, NodeId};

use super::{SankeyEdge, SankeyGraph, SankeyLayoutOptions, SankeyOrient, f64_cmp, nan_sum};

/// Nodes grouped by main-axis position, columns in ascending order.
type Columns = Vec<Vec<NodeId>>;

pub(super) fn compute_node_depths(
    graph: &mut SankeyGraph,
    opts: &SankeyLayoutOptions,
    iterations: usize,
) {
    let mut columns = nodes_by_breadth(graph, opts.orient);
    initialize_node_depth(graph, &columns, opts);
    resolve_collisions(graph, &mut columns, opts);

    let mut alpha = 1.0;
    for iteration in 0..iterations {
        alpha *= 0.99;
        relax_right_to_left(graph, &columns, alpha, opts.orient);
        resolve_collisions(graph, &mut columns, opts);
        relax_left_to_right(graph, &columns, alpha, opts.orient);
        resolve_collisions(graph, &mut columns, opts);
        tracing::trace!(iteration, alpha, "sankey relaxation");
    }
}

fn nodes_by_breadth(graph: &SankeyGraph, orient: SankeyOrient) -> Columns {
    let main = |v: NodeId| graph.node(v).label.layout.main(orient);
    let mut order: Vec<NodeId> = graph.node_ids().collect();
    order.sort_by(|&a, &b| f64_cmp(main(a), main(b)));

    order
        .chunk_by(|&a, &b| main(a) == main(b))
        .map(<[NodeId]>::to_vec)
        .collect()
}

/// Stacks each column in data order, scaled by the tightest column's value-to-space ratio.
fn initialize_node_depth(graph: &mut SankeyGraph, columns: &Columns, opts: &SankeyLayoutOptions) {
    let extent = opts.cross_extent();
    let mut min_ky = f64::INFINITY;
    for column in columns {
        let sum: f64 = column
            .iter()
            .map(|&v| graph.node(v).label.layout.value)
            .sum();
        let ky = (extent - (column.len() as f64 - 1.0) * opts.node_gap) / sum;
        if ky < min_ky {
            min_ky = ky;
        }
    }
    // Every column is empty of flow.
    if !min_ky.is_finite() {
        min_ky = 0.0;
    }

    for column in columns {
        for (i, &v) in column.iter().enumerate() {
            let layout = &mut graph.node_mut(v).label.layout;
            layout.set_cross(opts.orient, i as f64);
            layout.set_cross_len(opts.orient, layout.value * min_ky);
        }
    }
    for e in graph.edge_ids() {
        let edge = &mut graph.edge_mut(e).label;
        edge.layout.dy = edge.value * min_ky;
    }
}

/// Sorts each column by cross position and pushes overlapping nodes apart, then pulls the
/// column back inside the view if its last node overflows.
fn resolve_collisions(graph: &mut SankeyGraph, columns: &mut Columns, opts: &SankeyLayoutOptions) {
    let orient = opts.orient;
    let gap = opts.node_gap;
    for column in columns.iter_mut() {
        column.sort_by(|&a, &b| {
            f64_cmp(
                graph.node(a).label.layout.cross(orient),
                graph.node(b).label.layout.cross(orient),
            )
        });

        let mut y0 = 0.0;
        for &v in column.iter() {
            let layout = &mut graph.node_mut(v).label.layout;
            let dy = y0 - layout.cross(orient);
            if dy > 0.0 {
                layout.set_cross(orient, layout.cross(orient) + dy);
            }
            y0 = layout.cross(orient) + layout.cross_len(orient) + gap;
        }

        let Some((&last, rest)) = column.split_last() else {
            continue;
        };
        let overflow = y0 - gap - opts.cross_extent();
        if overflow > 0.0 {
            let layout = &mut graph.node_mut(last).label.layout;
            let mut y0 = layout.cross(orient) - overflow;
            layout.set_cross(orient, y0);
            for &v in rest.iter().rev() {
                let layout = &mut graph.node_mut(v).label.layout;
                let dy = layout.cross(orient) + layout.cross_len(orient) + gap - y0;
                if dy > 0.0 {
                    layout.set_cross(orient, layout.cross(orient) - dy);
                }
                y0 = layout.cross(orient);
            }
        }
    }
}

/// Moves nodes towards the weighted center of their targets, last column first.
fn relax_right_to_left(
    graph: &mut SankeyGraph,
    columns: &Columns,
    alpha: f64,
    orient: SankeyOrient,
) {
    for column in columns.iter().rev() {
        for &v in column {
            let edges = graph.out_edges(v);
            if edges.is_empty() {
                continue;
            }
            let y = weighted_center(graph, edges, orient, GraphEdge::node2);
            shift_towards(graph, v, y, alpha, orient);
        }
    }
}

/// Moves nodes towards the weighted center of their sources, first column first.
fn relax_left_to_right(
    graph: &mut SankeyGraph,
    columns: &Columns,
    alpha: f64,
    orient: SankeyOrient,
) {
    for column in columns {
        for &v in column {
            let edges = graph.in_edges(v);
            if edges.is_empty() {
                continue;
            }
            let y = weighted_center(graph, edges, orient, GraphEdge::node1);
            shift_towards(graph, v, y, alpha, orient);
        }
    }
}

/// Value-weighted mean of the centers of the nodes at the `other` end of `edges`, falling
/// back to the plain mean when the weights do not produce a number.
fn weighted_center(
    graph: &SankeyGraph,
    edges: &[EdgeId],
    orient: SankeyOrient,
    other: fn(&GraphEdge<SankeyEdge>) -> NodeId,
) -> f64 {
    let center = |e: EdgeId| graph.node(other(graph.edge(e))).label.layout.center(orient);
    let value = |e: EdgeId| graph.edge(e).label.value;
    let weighted = nan_sum(edges.iter().map(|&e| center(e) * value(e)));
    let total = nan_sum(edges.iter().map(|&e| value(e)));
    let y = weighted / total;
    if y.is_nan() {
        nan_sum(edges.iter().map(|&e| center(e))) / edges.len() as f64
    } else {
        y
    }
}

fn shift_towards(graph: &mut SankeyGraph, v: NodeId, y: f64, alpha: f64, orient: SankeyOrient) {
    let layout = &mut graph.node_mut(v).label.layout;
    let moved = layout.cross(orient) + (y - layout.center(orient)) * alpha;
    layout.set_cross(orient, moved);
}

#[cfg(test)]
mod tests {
    use super::super::{SankeyNode, compute_node_values};
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn graph(nodes: &[(&str, f64)], edges: &[(&str, &str, f64)]) -> SankeyGraph {
        let mut g = SankeyGraph::new();
        for &(n, _) in nodes {
            g.add_node(n, SankeyNode::default());
        }
        for &(s, t, value) in edges {
            g.add_edge(s, t, SankeyEdge::new(value));
        }
        compute_node_values(&mut g);
        for (v, &(_, x)) in g.node_ids().zip(nodes) {
            g.node_mut(v).label.layout.x = x;
        }
        g
    }

    #[test]
    fn columns_are_sorted_and_keep_data_order() {
        let g = graph(&[("a", 10.0), ("b", 0.0), ("c", 10.0), ("d", 0.0)], &[]);
        let columns = nodes_by_breadth(&g, SankeyOrient::Horizontal);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0], [NodeId(1), NodeId(3)]);
        assert_eq!(columns[1], [NodeId(0), NodeId(2)]);
    }

    #[test]
    fn tightest_column_sets_the_scale() {
        // Column 0 holds 10 units on its own; column 1 splits 10 units over two nodes.
        let mut g = graph(
            &[("a", 0.0), ("b", 10.0), ("c", 10.0)],
            &[("a", "b", 4.0), ("a", "c", 6.0)],
        );
        let opts = SankeyLayoutOptions {
            width: 100.0,
            height: 108.0,
            ..Default::default()
        };
        let columns = nodes_by_breadth(&g, opts.orient);
        initialize_node_depth(&mut g, &columns, &opts);
        let dy = |n: &str| g.node(g.node_by_id(n).unwrap()).label.layout.dy;
        assert!(close(dy("a"), 100.0));
        assert!(close(dy("b"), 40.0));
        assert!(close(dy("c"), 60.0));
        assert!(close(g.edge(EdgeId(1)).label.layout.dy, 60.0));
    }

    #[test]
    fn collisions_are_pushed_apart_and_back_into_view() {
        let mut g = graph(&[("a", 0.0), ("b", 0.0), ("c", 0.0)], &[]);
        for (v, dy) in g.node_ids().zip([40.0, 40.0, 40.0]) {
            let layout = &mut g.node_mut(v).label.layout;
            layout.dy = dy;
            layout.y = 10.0;
        }
        let opts = SankeyLayoutOptions {
            width: 100.0,
            height: 120.0,
            node_gap: 5.0,
            ..Default::default()
        };
        let mut columns = nodes_by_breadth(&g, opts.orient);
        resolve_collisions(&mut g, &mut columns, &opts);
        let ys: Vec<f64> = g.nodes().map(|n| n.label.layout.y).collect();
        // Pushed down to 10, 55, 100; the last one overflows by 20 and the column shifts up.
        assert!(close(ys[2], 80.0));
        assert!(close(ys[1], 35.0));
        assert!(close(ys[0], -10.0));
    }

    #[test]
    fn zero_weights_fall_back_to_the_plain_mean() {
        let mut g = graph(
            &[("a", 0.0), ("b", 10.0), ("c", 10.0)],
            &[("a", "b", 0.0), ("a", "c", 0.0)],
        );
        for (v, y) in g.node_ids().zip([0.0, 10.0, 30.0]) {
            g.node_mut(v).label.layout.y = y;
        }
        let a = g.node_by_id("a").unwrap();
        let orient = SankeyOrient::Horizontal;
        let y = weighted_center(&g, g.out_edges(a), orient, GraphEdge::node2);
        assert!(close(y, 20.0));
    }
}
