use cppdep_graph::report::text::{write_report, DependencyListing};
use cppdep_graph::{Analysis, DependencyGraph};
use petgraph::algo::has_path_connecting;
use petgraph::visit::EdgeRef;
use proptest::prelude::*;

fn arb_graph() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..12).prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n), 0..30)))
}

/// Like [`arb_graph`], with a random subset of nodes flagged external.
/// External nodes keep no outgoing edges.
fn arb_graph_with_externals() -> impl Strategy<Value = (usize, Vec<(usize, usize)>, Vec<bool>)> {
    (1usize..12)
        .prop_flat_map(|n| {
            (
                Just(n),
                prop::collection::vec((0..n, 0..n), 0..30),
                prop::collection::vec(any::<bool>(), n),
            )
        })
        .prop_map(|(n, edges, external)| {
            let edges = edges.into_iter().filter(|&(a, _)| !external[a]).collect();
            (n, edges, external)
        })
}

fn names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("n{i}")).collect()
}

fn graph(n: usize, edges: &[(usize, usize)]) -> DependencyGraph {
    graph_with_externals(n, edges, &vec![false; n])
}

fn graph_with_externals(n: usize, edges: &[(usize, usize)], external: &[bool]) -> DependencyGraph {
    let names = names(n);
    let nodes: Vec<&str> = names.iter().map(String::as_str).collect();
    let edges: Vec<(&str, &str)> = edges
        .iter()
        .map(|&(a, b)| (nodes[a], nodes[b]))
        .collect();
    let externals: Vec<&str> = nodes
        .iter()
        .zip(external)
        .filter(|&(_, &ext)| ext)
        .map(|(&name, _)| name)
        .collect();
    DependencyGraph::from_edges(&nodes, &edges, &externals)
}

fn report(a: &Analysis) -> String {
    let mut out = Vec::new();
    write_report(a, DependencyListing::Reduced, &mut out).expect("write");
    String::from_utf8(out).expect("utf8")
}

proptest! {
    #[test]
    fn reduction_preserves_reachability((n, edges) in arb_graph()) {
        let a = Analysis::run(graph(n, &edges)).expect("analysis");
        for u in a.original.graph.node_indices() {
            for v in a.original.graph.node_indices() {
                if u == v {
                    continue;
                }
                prop_assert_eq!(
                    has_path_connecting(&a.original.graph, u, v, None),
                    has_path_connecting(&a.reduced.graph, u, v, None),
                    "{} -> {}", a.name(u), a.name(v)
                );
            }
        }
    }

    #[test]
    fn final_graph_keeps_nodes_and_invents_no_edges((n, edges) in arb_graph()) {
        let a = Analysis::run(graph(n, &edges)).expect("analysis");
        prop_assert_eq!(a.reduced.node_count(), a.original.node_count());
        for node in a.original.graph.node_indices() {
            prop_assert_eq!(a.reduced.name(node), a.original.name(node));
        }
        for edge in a.reduced.graph.edge_references() {
            prop_assert!(a.original.graph.contains_edge(edge.source(), edge.target()));
        }
    }

    #[test]
    fn cycles_are_exactly_the_mutually_reachable_sets((n, edges) in arb_graph()) {
        let a = Analysis::run(graph(n, &edges)).expect("analysis");
        let g = &a.original.graph;
        for u in g.node_indices() {
            for v in g.node_indices() {
                if u == v {
                    continue;
                }
                let mutual = has_path_connecting(g, u, v, None) && has_path_connecting(g, v, u, None);
                let same_cycle = a.cycle_index(u).is_some() && a.cycle_index(u) == a.cycle_index(v);
                prop_assert_eq!(mutual, same_cycle, "{} / {}", a.name(u), a.name(v));
            }
        }
        for cycle in &a.cycles {
            prop_assert!(cycle.len() >= 2);
        }
    }

    #[test]
    fn self_dependencies_never_become_edges((n, edges) in arb_graph()) {
        let a = Analysis::run(graph(n, &edges)).expect("analysis");
        for edge in a.original.graph.edge_references() {
            prop_assert_ne!(edge.source(), edge.target());
        }
    }

    #[test]
    fn dependencies_sit_on_lower_levels((n, edges) in arb_graph()) {
        let a = Analysis::run(graph(n, &edges)).expect("analysis");
        for edge in a.reduced.graph.edge_references() {
            let (u, v) = (edge.source(), edge.target());
            if a.cycle_index(u).is_some() && a.cycle_index(u) == a.cycle_index(v) {
                prop_assert_eq!(a.level(u), a.level(v));
            } else {
                prop_assert!(a.level(u) > a.level(v));
            }
        }
    }

    #[test]
    fn report_is_independent_of_insertion_order((n, edges) in arb_graph()) {
        let mut reversed = edges.clone();
        reversed.reverse();
        let a = Analysis::run(graph(n, &edges)).expect("analysis");
        let b = Analysis::run(graph(n, &reversed)).expect("analysis");
        prop_assert_eq!(report(&a), report(&b));
    }

    #[test]
    fn adding_an_edge_never_lowers_ccd((n, edges) in arb_graph(), extra in (0usize..12, 0usize..12)) {
        let extra = (extra.0 % n, extra.1 % n);
        let before = Analysis::run(graph(n, &edges)).expect("analysis");
        let mut more = edges.clone();
        more.push(extra);
        let after = Analysis::run(graph(n, &more)).expect("analysis");
        prop_assert!(after.summary.ccd >= before.summary.ccd);
    }

    #[test]
    fn external_nodes_sit_at_level_zero_outside_cycles((n, edges, external) in arb_graph_with_externals()) {
        let a = Analysis::run(graph_with_externals(n, &edges, &external)).expect("analysis");
        for node in a.original.graph.node_indices() {
            if a.original.is_external(node) {
                prop_assert_eq!(a.level(node), 0, "{}", a.name(node));
                prop_assert_eq!(a.cycle_index(node), None);
                prop_assert_eq!(a.cd(node), 1);
            } else {
                prop_assert!(a.level(node) >= 1, "{}", a.name(node));
            }
        }
        let internal = external.iter().filter(|&&ext| !ext).count();
        prop_assert_eq!(a.summary.components, internal);
    }

    #[test]
    fn cd_counts_every_reachable_node((n, edges, external) in arb_graph_with_externals()) {
        let a = Analysis::run(graph_with_externals(n, &edges, &external)).expect("analysis");
        let g = &a.original.graph;
        for u in g.node_indices() {
            let reachable = g
                .node_indices()
                .filter(|&v| v == u || has_path_connecting(g, u, v, None))
                .count();
            prop_assert_eq!(a.cd(u), reachable, "{}", a.name(u));
        }
    }

    #[test]
    fn reduction_with_externals_keeps_nodes_and_reachability((n, edges, external) in arb_graph_with_externals()) {
        let a = Analysis::run(graph_with_externals(n, &edges, &external)).expect("analysis");
        prop_assert_eq!(a.reduced.node_count(), a.original.node_count());
        for edge in a.reduced.graph.edge_references() {
            prop_assert!(a.original.graph.contains_edge(edge.source(), edge.target()));
        }
        for u in a.original.graph.node_indices() {
            for v in a.original.graph.node_indices() {
                if u != v {
                    prop_assert_eq!(
                        has_path_connecting(&a.original.graph, u, v, None),
                        has_path_connecting(&a.reduced.graph, u, v, None)
                    );
                }
            }
        }
        for edge in a.reduced.graph.edge_references() {
            let (u, v) = (edge.source(), edge.target());
            if a.cycle_index(u).is_none() || a.cycle_index(u) != a.cycle_index(v) {
                prop_assert!(a.level(u) > a.level(v));
            }
        }
    }

    #[test]
    fn report_with_externals_is_independent_of_insertion_order((n, edges, external) in arb_graph_with_externals()) {
        let mut reversed = edges.clone();
        reversed.reverse();
        let a = Analysis::run(graph_with_externals(n, &edges, &external)).expect("analysis");
        let b = Analysis::run(graph_with_externals(n, &reversed, &external)).expect("analysis");
        prop_assert_eq!(report(&a), report(&b));
    }
}
