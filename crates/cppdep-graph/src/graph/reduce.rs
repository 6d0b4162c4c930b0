//! Transitive reduction of the condensed dependency DAG.
//!
//! An edge `A → C` is redundant if there is already a path `A → B → C`.
//! Removing all such edges gives the minimal graph with the same
//! reachability, which is what Lakos levelization and the "reduced"
//! dependency listing are defined over.

use fixedbitset::FixedBitSet;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use tracing::{debug, instrument};

use crate::error::GraphError;

/// Return a topological order of `g` (dependents before dependencies).
///
/// # Errors
///
/// Returns [`GraphError::ResidualCycle`] if `g` is not acyclic.
pub fn topological_order<N, E>(g: &DiGraph<N, E>) -> Result<Vec<NodeIndex>, GraphError> {
    toposort(g, None).map_err(|cycle| GraphError::ResidualCycle {
        node: format!("node #{}", cycle.node_id().index()),
    })
}

/// Compute the descendant set of every node of a DAG.
///
/// `topo` must be a topological order of `g`. Nodes are processed sinks
/// first, so each set is the union of the successors' sets plus the
/// successors themselves. No recursion; the result is indexed by
/// `NodeIndex::index()` and never contains the node itself.
#[must_use]
pub fn descendant_sets<N, E>(g: &DiGraph<N, E>, topo: &[NodeIndex]) -> Vec<FixedBitSet> {
    let n = g.node_count();
    let mut sets = vec![FixedBitSet::with_capacity(n); n];

    for &u in topo.iter().rev() {
        let mut reach = FixedBitSet::with_capacity(n);
        for v in g.neighbors_directed(u, Direction::Outgoing) {
            reach.insert(v.index());
            reach.union_with(&sets[v.index()]);
        }
        sets[u.index()] = reach;
    }

    sets
}

/// Compute the transitive reduction of a DAG.
///
/// Returns a new graph with the same nodes (and node indices) but only the
/// edges needed to preserve reachability. An edge `(u, v)` is removed when
/// `v` is reachable from some other direct successor of `u`.
///
/// # Errors
///
/// Returns [`GraphError::ResidualCycle`] if `g` contains a cycle. The
/// condensed graph is acyclic by construction, so this indicates a bug in
/// an earlier stage.
#[instrument(skip_all, fields(nodes = g.node_count(), edges = g.edge_count()))]
pub fn transitive_reduction<N: Clone, E>(g: &DiGraph<N, E>) -> Result<DiGraph<N, ()>, GraphError> {
    let topo = topological_order(g)?;
    let reachable = descendant_sets(g, &topo);
    let n = g.node_count();

    // For every u, the union of everything reachable *through* a successor.
    // In a DAG no node reaches itself, so a successor v found in that union is
    // reachable from some other successor and the direct edge is redundant.
    let mut to_remove: Vec<(NodeIndex, NodeIndex)> = Vec::new();
    for u in g.node_indices() {
        let mut through = FixedBitSet::with_capacity(n);
        for w in g.neighbors_directed(u, Direction::Outgoing) {
            through.union_with(&reachable[w.index()]);
        }
        to_remove.extend(
            g.edges(u)
                .filter(|e| through.contains(e.target().index()))
                .map(|e| (e.source(), e.target())),
        );
    }

    let mut reduced = g.map(|_, w| w.clone(), |_, _| ());
    for (src, tgt) in &to_remove {
        if let Some(edge_idx) = reduced.find_edge(*src, *tgt) {
            reduced.remove_edge(edge_idx);
        }
    }

    debug!(removed = to_remove.len(), "transitive reduction applied");
    Ok(reduced)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
