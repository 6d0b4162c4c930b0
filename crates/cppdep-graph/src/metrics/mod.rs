//! Lakos dependency metrics for the condensed dependency DAG.
//!
//! # Overview
//!
//! All metrics run on the transitively-reduced condensed graph from
//! [`crate::graph::reduce`]. Each condensed node carries two weights:
//!
//! | node                  | CD weight      | level weight   |
//! |-----------------------|----------------|----------------|
//! | external node         | 1              | 0              |
//! | ordinary node         | 1              | 1              |
//! | cycle representative  | member count   | member count   |
//!
//! An external node is still something a component needs in order to be
//! built, so it counts in CD and CCD. It is not part of the analyzed scope,
//! so it adds nothing to levels and stays out of the component count `N`.
//!
//! - **CD / CCD / ACCD / NCCD** (`ccd`): how much of the system each node
//!   drags along, summed and normalized.
//! - **Levels** (`levels`): longest weighted path to a sink.
//!
//! Per-node results are indexed by condensed `NodeIndex::index()`;
//! [`crate::graph::analysis::Analysis`] maps them back to original nodes.

pub mod ccd;
pub mod levels;

use petgraph::graph::NodeIndex;

use crate::graph::build::DependencyGraph;
use crate::graph::condense::{CondensedNode, Condensation};

pub use ccd::Summary;

/// CD weight of a condensed node: the number of original nodes it stands for.
#[must_use]
pub fn node_weight(condensation: &Condensation, node: NodeIndex) -> usize {
    match condensation.graph[node] {
        CondensedNode::Single(_) => 1,
        CondensedNode::Cycle => condensation.cycles.get(&node).map_or(0, |c| c.len()),
    }
}

/// Level weight of a condensed node: like [`node_weight`], but 0 for
/// external nodes.
#[must_use]
pub fn level_weight(original: &DependencyGraph, condensation: &Condensation, node: NodeIndex) -> usize {
    match condensation.graph[node] {
        CondensedNode::Single(idx) if original.is_external(idx) => 0,
        _ => node_weight(condensation, node),
    }
}

/// CD weights of every condensed node, indexed by `NodeIndex::index()`.
#[must_use]
pub fn node_weights(condensation: &Condensation) -> Vec<usize> {
    condensation
        .graph
        .node_indices()
        .map(|idx| node_weight(condensation, idx))
        .collect()
}

/// Level weights of every condensed node, indexed by `NodeIndex::index()`.
#[must_use]
pub fn level_weights(original: &DependencyGraph, condensation: &Condensation) -> Vec<usize> {
    condensation
        .graph
        .node_indices()
        .map(|idx| level_weight(original, condensation, idx))
        .collect()
}
