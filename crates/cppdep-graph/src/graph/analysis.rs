//! One complete analysis of one dependency graph.
//!
//! [`Analysis::run`] owns every piece of intermediate state for the duration
//! of the call: the condensation (cycles and boundary edges) lives only until
//! decondensation, after which only the report data survives. Separate
//! analyses share nothing.

use std::cmp::Ordering;

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use tracing::{debug, instrument};

use crate::error::GraphError;
use crate::graph::build::DependencyGraph;
use crate::graph::condense::{Condensation, Cycle};
use crate::graph::decondense::decondense;
use crate::graph::reduce::{topological_order, transitive_reduction};
use crate::metrics::ccd::{component_dependencies, cumulative};
use crate::metrics::levels::levels;
use crate::metrics::{level_weights, node_weights, Summary};

/// The finished analysis of a [`DependencyGraph`].
///
/// All per-node accessors take node indices of the original graph, which are
/// also valid in [`Analysis::reduced`].
#[derive(Debug, Clone)]
pub struct Analysis {
    /// The input graph, unchanged.
    pub original: DependencyGraph,
    /// The transitively reduced, decondensed graph over the original nodes.
    pub reduced: DependencyGraph,
    /// Cycles ordered by their stable index.
    pub cycles: Vec<Cycle>,
    /// Aggregate metrics.
    pub summary: Summary,
    cycle_of: Vec<Option<usize>>,
    level: Vec<usize>,
    cd: Vec<usize>,
}

impl Analysis {
    /// Condense, reduce, measure, and decondense `original`.
    ///
    /// A graph without nodes yields an empty analysis.
    ///
    /// # Errors
    ///
    /// Returns a [`GraphError`] if `original` breaks the builder invariants
    /// (self-loops, external nodes with successors) or if a cycle survives
    /// condensation. These are programming errors, not input conditions.
    #[instrument(skip_all, fields(nodes = original.node_count(), edges = original.edge_count()))]
    pub fn run(original: DependencyGraph) -> Result<Self, GraphError> {
        original.validate()?;

        let condensation = Condensation::condense(&original);
        let reduced = transitive_reduction(&condensation.graph)?;
        let topo = topological_order(&reduced)?;

        let weights = node_weights(&condensation);
        let condensed_cd = component_dependencies(&reduced, &topo, &weights);
        let condensed_level = levels(&reduced, &topo, &level_weights(&original, &condensation));
        let ccd = cumulative(&condensed_cd, &weights);

        let mut cycle_of = vec![None; original.node_count()];
        let mut level = vec![0; original.node_count()];
        let mut cd = vec![0; original.node_count()];
        for node in original.graph.node_indices() {
            let rep = condensation.condensed_of(node);
            cycle_of[node.index()] = condensation.cycles.get(&rep).map(|c| c.index);
            level[node.index()] = condensed_level[rep.index()];
            cd[node.index()] = condensed_cd[rep.index()];
        }

        let final_graph = decondense(&original, &condensation, &reduced);
        let cycles: Vec<Cycle> = condensation.cycles_in_order().into_iter().cloned().collect();

        let summary = Summary::new(
            original.internal_count(),
            cycles.len(),
            level.iter().copied().max().unwrap_or(0),
            ccd,
        );
        debug!(
            components = summary.components,
            cycles = summary.cycles,
            levels = summary.levels,
            ccd = summary.ccd,
            "analysis complete"
        );

        Ok(Self {
            original,
            reduced: final_graph,
            cycles,
            summary,
            cycle_of,
            level,
            cd,
        })
    }

    /// Return `true` if the analyzed graph had no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }

    /// Level of `node`; cycle members share their cycle's level.
    #[must_use]
    pub fn level(&self, node: NodeIndex) -> usize {
        self.level[node.index()]
    }

    /// Component dependency of `node`; cycle members share their cycle's CD.
    #[must_use]
    pub fn cd(&self, node: NodeIndex) -> usize {
        self.cd[node.index()]
    }

    /// Highest level in the graph.
    #[must_use]
    pub fn max_level(&self) -> usize {
        self.summary.levels
    }

    /// Stable index of the cycle `node` belongs to, if any.
    #[must_use]
    pub fn cycle_index(&self, node: NodeIndex) -> Option<usize> {
        self.cycle_of[node.index()]
    }

    /// The cycle `node` belongs to, if any.
    #[must_use]
    pub fn cycle(&self, node: NodeIndex) -> Option<&Cycle> {
        self.cycle_index(node).map(|i| &self.cycles[i])
    }

    /// Name of a node.
    #[must_use]
    pub fn name(&self, node: NodeIndex) -> &str {
        self.original.name(node)
    }

    /// All nodes in report order: by level, then by the smallest name of the
    /// node's cycle (its own name if acyclic), then by name.
    #[must_use]
    pub fn nodes_by_level(&self) -> Vec<NodeIndex> {
        let mut nodes: Vec<NodeIndex> = self.original.graph.node_indices().collect();
        nodes.sort_by(|&a, &b| self.level_order(a, b));
        nodes
    }

    /// Nodes at exactly `level`, in report order.
    #[must_use]
    pub fn nodes_at_level(&self, level: usize) -> Vec<NodeIndex> {
        self.nodes_by_level()
            .into_iter()
            .filter(|&n| self.level(n) == level)
            .collect()
    }

    /// Edges of the input graph that transitive reduction removed, sorted by
    /// source name, then target name.
    #[must_use]
    pub fn redundant_edges(&self) -> Vec<(NodeIndex, NodeIndex)> {
        let mut edges: Vec<(NodeIndex, NodeIndex)> = self
            .original
            .graph
            .edge_references()
            .map(|e| (e.source(), e.target()))
            .filter(|&(a, b)| !self.reduced.graph.contains_edge(a, b))
            .collect();
        edges.sort_by(|&(a1, b1), &(a2, b2)| {
            self.name(a1)
                .cmp(self.name(a2))
                .then_with(|| self.name(b1).cmp(self.name(b2)))
        });
        edges
    }

    /// Ordering used for dependency listings: by level, then by name.
    #[must_use]
    pub fn dependency_order(&self, a: NodeIndex, b: NodeIndex) -> Ordering {
        self.level(a)
            .cmp(&self.level(b))
            .then_with(|| self.name(a).cmp(self.name(b)))
    }

    fn stable_key(&self, node: NodeIndex) -> &str {
        self.cycle(node)
            .map_or_else(|| self.name(node), |c| self.name(c.first_member()))
    }

    fn level_order(&self, a: NodeIndex, b: NodeIndex) -> Ordering {
        self.level(a)
            .cmp(&self.level(b))
            .then_with(|| self.stable_key(a).cmp(self.stable_key(b)))
            .then_with(|| self.name(a).cmp(self.name(b)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
