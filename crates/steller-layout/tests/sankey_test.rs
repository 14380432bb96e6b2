use steller_layout::{
    Error, NodeAlign, SankeyEdge, SankeyGraph, SankeyLayoutOptions, SankeyNode, SankeyNodeLayout,
    SankeyOrient, sankey,
};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn build(nodes: &[&str], edges: &[(&str, &str, f64)]) -> SankeyGraph {
    let mut g = SankeyGraph::new();
    for &n in nodes {
        g.add_node(n, SankeyNode::default());
    }
    for &(s, t, value) in edges {
        g.add_edge(s, t, SankeyEdge::new(value));
    }
    g
}

/// Two sources merging into a hub that splits into three sinks.
fn energy() -> SankeyGraph {
    build(
        &["coal", "gas", "hub", "homes", "industry", "losses"],
        &[
            ("coal", "hub", 30.0),
            ("gas", "hub", 20.0),
            ("hub", "homes", 22.0),
            ("hub", "industry", 18.0),
            ("hub", "losses", 10.0),
            ("gas", "industry", 5.0),
        ],
    )
}

fn opts() -> SankeyLayoutOptions {
    SankeyLayoutOptions {
        width: 600.0,
        height: 400.0,
        ..Default::default()
    }
}

fn layout_of(g: &SankeyGraph, id: &str) -> SankeyNodeLayout {
    g.node(g.node_by_id(id).unwrap()).label.layout
}

#[test]
fn two_nodes_span_the_main_axis() {
    let mut g = build(&["A", "B"], &[("A", "B", 10.0)]);
    let o = SankeyLayoutOptions {
        width: 200.0,
        height: 120.0,
        ..Default::default()
    };
    sankey::layout(&mut g, &o).unwrap();
    let (a, b) = (layout_of(&g, "A"), layout_of(&g, "B"));
    assert_eq!((a.depth, b.depth), (0, 1));
    assert_eq!((a.x, b.x), (0.0, 180.0));
    assert!(close(a.dy, 120.0));
    assert!(close(b.dy, 120.0));
}

#[test]
fn cyclic_data_is_rejected() {
    let mut g = build(
        &["A", "B", "C"],
        &[("A", "B", 1.0), ("B", "C", 1.0), ("C", "B", 1.0)],
    );
    let err = sankey::layout(&mut g, &opts()).unwrap_err();
    assert!(matches!(err, Error::Cycle { remaining_edges: 2 }));

    let mut g = build(&["A", "B"], &[("A", "B", 1.0)]);
    assert!(sankey::layout(&mut g, &opts()).is_ok());
}

#[test]
fn flow_is_conserved_through_every_node() {
    let mut g = energy();
    sankey::layout(&mut g, &opts()).unwrap();
    for v in g.node_ids() {
        let node = g.node(v);
        let out: f64 = node
            .out_edges()
            .iter()
            .map(|&e| g.edge(e).label.layout.dy)
            .sum();
        let inc: f64 = node
            .in_edges()
            .iter()
            .map(|&e| g.edge(e).label.layout.dy)
            .sum();
        let dy = node.label.layout.dy;
        if !node.out_edges().is_empty() && !node.in_edges().is_empty() {
            assert!(close(out, inc), "{}", node.id());
        }
        assert!(close(dy, out.max(inc)), "{}", node.id());
    }
}

#[test]
fn edges_run_forward_and_stack_inside_their_nodes() {
    let mut g = energy();
    sankey::layout(&mut g, &opts()).unwrap();
    for e in g.edges() {
        let (s, t) = (g.node(e.node1()), g.node(e.node2()));
        assert!(s.label.layout.depth < t.label.layout.depth);
        let l = e.label.layout;
        assert!(l.sy + l.dy <= s.label.layout.dy + 1e-6);
        assert!(l.ty + l.dy <= t.label.layout.dy + 1e-6);
    }
    // Justify sends every sink to the last column.
    for sink in ["homes", "industry", "losses"] {
        assert_eq!(layout_of(&g, sink).depth, 2);
        assert!(close(layout_of(&g, sink).x, 580.0));
    }
}

#[test]
fn columns_stay_inside_the_view_without_overlaps() {
    let mut g = energy();
    let o = opts();
    sankey::layout(&mut g, &o).unwrap();
    let mut by_column: Vec<Vec<SankeyNodeLayout>> = vec![Vec::new(); 3];
    for n in g.nodes() {
        by_column[n.label.layout.depth].push(n.label.layout);
    }
    for column in &mut by_column {
        column.sort_by(|a, b| a.y.partial_cmp(&b.y).unwrap());
        for w in column.windows(2) {
            assert!(w[0].y + w[0].dy + o.node_gap <= w[1].y + 1e-6);
        }
        let last = column.last().unwrap();
        assert!(last.y + last.dy <= o.height + 1e-6);
    }
}

#[test]
fn vertical_orient_swaps_the_axes() {
    let mut g = build(&["A", "B"], &[("A", "B", 10.0)]);
    let o = SankeyLayoutOptions {
        orient: SankeyOrient::Vertical,
        width: 100.0,
        height: 200.0,
        ..Default::default()
    };
    sankey::layout(&mut g, &o).unwrap();
    let (a, b) = (layout_of(&g, "A"), layout_of(&g, "B"));
    assert_eq!((a.y, b.y), (0.0, 180.0));
    assert_eq!((a.dy, b.dy), (20.0, 20.0));
    assert!(close(a.dx, 100.0));
    assert!(close(a.x, 0.0));
}

#[test]
fn right_alignment_moves_short_branches_right() {
    let mut g = build(
        &["A", "B", "C", "D"],
        &[("A", "B", 1.0), ("B", "C", 1.0), ("D", "C", 1.0)],
    );
    let o = SankeyLayoutOptions {
        node_align: NodeAlign::Right,
        ..opts()
    };
    sankey::layout(&mut g, &o).unwrap();
    assert_eq!(layout_of(&g, "D").depth, 1);
    assert_eq!(layout_of(&g, "D").sk_node_height, Some(1));

    let o = SankeyLayoutOptions {
        node_align: NodeAlign::Left,
        ..opts()
    };
    sankey::layout(&mut g, &o).unwrap();
    assert_eq!(layout_of(&g, "D").depth, 0);
    assert_eq!(layout_of(&g, "D").sk_node_height, None);
}

#[test]
fn a_node_without_flow_disables_relaxation() {
    let edges = [("A", "C", 3.0), ("B", "C", 7.0)];
    let mut with_idle = build(&["A", "B", "C", "idle"], &edges);
    sankey::layout(&mut with_idle, &opts()).unwrap();
    assert_eq!(layout_of(&with_idle, "idle").value, 0.0);

    let mut frozen = build(&["A", "B", "C", "idle"], &edges);
    let o = SankeyLayoutOptions {
        layout_iterations: 0,
        ..opts()
    };
    sankey::layout(&mut frozen, &o).unwrap();
    for v in with_idle.node_ids() {
        assert_eq!(with_idle.node(v).label.layout, frozen.node(v).label.layout);
    }
}

#[test]
fn repeated_layout_is_idempotent() {
    let mut g = energy();
    sankey::layout(&mut g, &opts()).unwrap();
    let first: Vec<SankeyNodeLayout> = g.nodes().map(|n| n.label.layout).collect();
    let first_edges: Vec<_> = g.edges().map(|e| e.label.layout).collect();
    sankey::layout(&mut g, &opts()).unwrap();
    let second: Vec<SankeyNodeLayout> = g.nodes().map(|n| n.label.layout).collect();
    let second_edges: Vec<_> = g.edges().map(|e| e.label.layout).collect();
    assert_eq!(first, second);
    assert_eq!(first_edges, second_edges);
}

#[test]
fn empty_graph_is_a_no_op() {
    let mut g = SankeyGraph::new();
    assert!(sankey::layout(&mut g, &opts()).is_ok());
    assert_eq!(g.node_count(), 0);
}

#[test]
fn an_edgeless_node_in_its_own_column_keeps_the_flow_scale() {
    let mut g = build(&["A", "B", "C"], &[("A", "B", 10.0)]);
    let c = g.node_by_id("C").unwrap();
    g.node_mut(c).label.depth = Some(2);
    let o = SankeyLayoutOptions {
        width: 200.0,
        height: 100.0,
        node_align: NodeAlign::Left,
        ..Default::default()
    };
    sankey::layout(&mut g, &o).unwrap();

    let c = layout_of(&g, "C");
    assert_eq!(c.value, 0.0);
    assert!(c.value.is_sign_positive());
    assert_eq!(c.depth, 2);
    assert!(close(c.x, 180.0));
    // The empty column does not take part in the scale.
    assert!(close(layout_of(&g, "A").dy, 100.0));
    assert!(close(layout_of(&g, "B").dy, 100.0));
    assert!(close(g.edges().next().unwrap().label.layout.dy, 100.0));
}
