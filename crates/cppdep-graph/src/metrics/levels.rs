//! Levelization of the condensed dependency DAG.
//!
//! `level(u) = weight(u) + max(level(v))` over the successors `v` of `u`
//! (the max of nothing is 0). With the weights from [`crate::metrics`]:
//!
//! - external nodes sit at level 0 and add nothing to their dependents,
//! - an ordinary component with only external (or no) dependencies is level 1,
//! - a cycle of `k` components adds `k`, so all its members share a level at
//!   least `k` above everything the cycle depends on.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

/// Compute the level of every node of a condensed DAG.
///
/// `weights` and the result are indexed by `NodeIndex::index()`; `topo` is a
/// topological order of `g`. Processed sinks first, without recursion.
#[must_use]
pub fn levels<N, E>(g: &DiGraph<N, E>, topo: &[NodeIndex], weights: &[usize]) -> Vec<usize> {
    let mut level = vec![0; g.node_count()];
    for &u in topo.iter().rev() {
        let deepest = g
            .neighbors_directed(u, Direction::Outgoing)
            .map(|v| level[v.index()])
            .max()
            .unwrap_or(0);
        level[u.index()] = weights[u.index()] + deepest;
    }
    level
}
