//! Cumulative Component Dependency (Lakos, *Large-Scale C++ Software Design*).
//!
//! # Definitions
//!
//! - **CD(u)**: number of components `u` needs in order to be tested,
//!   itself included: `weight(u) + Σ weight(v)` over the descendants of `u`.
//!   Every member of a cycle depends on every other member, so a cycle
//!   representative counts its full member count.
//! - **CCD**: `Σ weight(u) × CD(u)`; a cycle's CD is charged once per member.
//!   External nodes count like ordinary ones here.
//! - **ACCD**: `CCD / N` where `N` is the number of internal components.
//! - **NCCD**: `CCD / CCD_btree(N)` with
//!   `CCD_btree(N) = (N + 1) · log2(N + 1) − N`, the CCD of a fully balanced
//!   binary tree of `N` components. Values in [`TYPICAL_NCCD_RANGE`] are
//!   usual; much larger values flag excessive coupling.
//!
//! For `N ≤ 1` there is nothing to average or normalize against and both
//! ACCD and NCCD are reported as CCD itself.

use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use crate::graph::reduce::descendant_sets;

/// The NCCD interval a healthy design usually falls into.
pub const TYPICAL_NCCD_RANGE: (f64, f64) = (0.85, 1.10);

// ---------------------------------------------------------------------------
// Per-node CD
// ---------------------------------------------------------------------------

/// Compute CD for every node of a condensed DAG.
///
/// `weights` and the result are indexed by `NodeIndex::index()`; `topo` is a
/// topological order of `g`.
#[must_use]
pub fn component_dependencies<N, E>(
    g: &DiGraph<N, E>,
    topo: &[NodeIndex],
    weights: &[usize],
) -> Vec<usize> {
    let descendants = descendant_sets(g, topo);
    g.node_indices()
        .map(|u| {
            weights[u.index()]
                + descendants[u.index()]
                    .ones()
                    .map(|v| weights[v])
                    .sum::<usize>()
        })
        .collect()
}

/// CCD of the whole graph: `Σ weight × CD`.
#[must_use]
pub fn cumulative(cd: &[usize], weights: &[usize]) -> usize {
    cd.iter().zip(weights).map(|(cd, w)| cd * w).sum()
}

/// CCD of a fully balanced binary tree with `n` nodes.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn ccd_balanced_binary_tree(n: usize) -> f64 {
    let n = n as f64;
    (n + 1.0).mul_add((n + 1.0).log2(), -n)
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Aggregate metrics of one analyzed graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Number of internal components (cycle members counted individually).
    pub components: usize,
    /// Number of dependency cycles.
    pub cycles: usize,
    /// Highest level in the graph.
    pub levels: usize,
    /// Cumulative Component Dependency.
    pub ccd: usize,
    /// Average Component Dependency.
    pub accd: f64,
    /// Normalized Cumulative Component Dependency.
    pub nccd: f64,
}

impl Summary {
    /// Derive ACCD and NCCD from the raw counts.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(components: usize, cycles: usize, levels: usize, ccd: usize) -> Self {
        let (accd, nccd) = if components <= 1 {
            (ccd as f64, ccd as f64)
        } else {
            (
                ccd as f64 / components as f64,
                ccd as f64 / ccd_balanced_binary_tree(components),
            )
        };
        Self {
            components,
            cycles,
            levels,
            ccd,
            accd,
            nccd,
        }
    }

    /// Return `true` if NCCD lies inside [`TYPICAL_NCCD_RANGE`].
    #[must_use]
    pub fn nccd_is_typical(&self) -> bool {
        (TYPICAL_NCCD_RANGE.0..=TYPICAL_NCCD_RANGE.1).contains(&self.nccd)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::reduce::topological_order;

    #[test]
    fn chain_cd() {
        // A → B → C: CD = 3, 2, 1; CCD = 6
        let mut g: DiGraph<(), ()> = DiGraph::new();
        let a = g.add_node(());
        let b = g.add_node(());
        let c = g.add_node(());
        g.add_edge(a, b, ());
        g.add_edge(b, c, ());
        let topo = topological_order(&g).expect("acyclic");
        let weights = [1, 1, 1];
        let cd = component_dependencies(&g, &topo, &weights);
        assert_eq!(cd, [3, 2, 1]);
        assert_eq!(cumulative(&cd, &weights), 6);
    }

    #[test]
    fn weighted_cycle_node_counts_members() {
        // A → [cycle of 3]
        let mut g: DiGraph<(), ()> = DiGraph::new();
        let a = g.add_node(());
        let cyc = g.add_node(());
        g.add_edge(a, cyc, ());
        let topo = topological_order(&g).expect("acyclic");
        let weights = [1, 3];
        let cd = component_dependencies(&g, &topo, &weights);
        assert_eq!(cd, [4, 3]);
        assert_eq!(cumulative(&cd, &weights), 4 + 9);
    }

    #[test]
    fn external_node_counts_once() {
        // a → ext: ext weighs 1 like any node outside a cycle.
        let mut g: DiGraph<(), ()> = DiGraph::new();
        let a = g.add_node(());
        let ext = g.add_node(());
        g.add_edge(a, ext, ());
        let topo = topological_order(&g).expect("acyclic");
        let weights = [1, 1];
        let cd = component_dependencies(&g, &topo, &weights);
        assert_eq!(cd, [2, 1]);
        assert_eq!(cumulative(&cd, &weights), 3);
    }

    #[test]
    fn balanced_tree_reference_values() {
        // N = 1: 2·1 − 1 = 1; N = 3: 4·2 − 3 = 5; N = 7: 8·3 − 7 = 17
        assert!((ccd_balanced_binary_tree(1) - 1.0).abs() < 1e-12);
        assert!((ccd_balanced_binary_tree(3) - 5.0).abs() < 1e-12);
        assert!((ccd_balanced_binary_tree(7) - 17.0).abs() < 1e-12);
    }

    #[test]
    fn balanced_tree_graph_has_nccd_one() {
        let s = Summary::new(7, 0, 3, 17);
        assert!((s.nccd - 1.0).abs() < 1e-12);
        assert!(s.nccd_is_typical());
    }

    #[test]
    fn summary_of_reference_fixture() {
        let s = Summary::new(12, 3, 5, 45);
        assert!((s.accd - 3.75).abs() < 1e-12);
        assert!((s.nccd - 1.2464).abs() < 1e-3, "nccd = {}", s.nccd);
        assert!(!s.nccd_is_typical());
    }

    #[test]
    fn degenerate_sizes_do_not_divide_by_zero() {
        let empty = Summary::new(0, 0, 0, 0);
        assert!(empty.accd.abs() < f64::EPSILON);
        assert!(empty.nccd.abs() < f64::EPSILON);

        let single = Summary::new(1, 0, 1, 1);
        assert!((single.accd - 1.0).abs() < f64::EPSILON);
        assert!((single.nccd - 1.0).abs() < f64::EPSILON);
    }
}
