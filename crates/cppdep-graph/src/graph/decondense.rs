//! Reverting the condensation after reduction.
//!
//! The final graph has exactly the original node set. Its edges are:
//!
//! - every edge strictly inside a cycle (cycles are never reduced),
//! - every boundary edge whose condensed counterpart survived reduction,
//! - every edge between two non-cycle nodes that survived reduction.
//!
//! An edge the reducer removed stays removed, and no edge absent from the
//! input can appear.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::{debug, instrument};

use crate::graph::build::DependencyGraph;
use crate::graph::condense::{CondensedNode, Condensation};

/// Expand `reduced` (a reduced view of `condensation.graph`) back onto the
/// nodes of `original`.
///
/// Node indices of the returned graph match those of `original`.
#[must_use]
#[instrument(skip_all, fields(cycles = condensation.cycle_count()))]
pub fn decondense(
    original: &DependencyGraph,
    condensation: &Condensation,
    reduced: &DiGraph<CondensedNode, ()>,
) -> DependencyGraph {
    let mut result = DependencyGraph {
        graph: DiGraph::with_capacity(original.node_count(), original.edge_count()),
        node_map: original.node_map.clone(),
    };
    for node in original.graph.node_weights() {
        result.graph.add_node(node.clone());
    }

    let survived = |u: NodeIndex, v: NodeIndex| {
        reduced.contains_edge(condensation.condensed_of(u), condensation.condensed_of(v))
    };

    for cycle in condensation.cycles.values() {
        for &(u, v) in &cycle.edges {
            result.add_edge(u, v);
        }
        for &(u, v) in cycle.incoming.iter().chain(&cycle.outgoing) {
            if survived(u, v) {
                // An edge between two cycles is listed by both; add_edge dedupes.
                result.add_edge(u, v);
            }
        }
    }

    for edge in original.graph.edge_references() {
        let (u, v) = (edge.source(), edge.target());
        if condensation.cycle_of(u).is_none()
            && condensation.cycle_of(v).is_none()
            && survived(u, v)
        {
            result.add_edge(u, v);
        }
    }

    debug!(
        nodes = result.node_count(),
        edges = result.edge_count(),
        removed = original.edge_count() - result.edge_count(),
        "graph decondensed"
    );
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
