//! SCC condensation of the dependency graph.
//!
//! # Overview
//!
//! Components that include each other (directly or transitively) form a
//! cycle. Lakos treats every member of such a cycle as depending on every
//! other member, so for levelization and CCD the cycle behaves like one big
//! node. This module collapses every strongly connected component with more
//! than one member into a single representative node, producing a DAG.
//!
//! # Bookkeeping
//!
//! Condensation has to be exactly reversible (see
//! [`crate::graph::decondense`]), so each [`Cycle`] records:
//!
//! - its members and the edges strictly between them,
//! - every incoming boundary edge (outside → member),
//! - every outgoing boundary edge (member → outside).
//!
//! Cycles live in a map keyed by their representative in the condensed graph.
//!
//! # Stable numbering
//!
//! Cycle indices come from sorting cycles by their lexicographically smallest
//! member name. Reports are therefore identical across runs regardless of
//! hash-map iteration order or node insertion order.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, HashMap};

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::{debug, instrument};

use crate::graph::build::DependencyGraph;

// ---------------------------------------------------------------------------
// Cycle
// ---------------------------------------------------------------------------

/// A dependency cycle: a maximal set of at least two mutually reachable nodes.
///
/// All node indices refer to the original [`DependencyGraph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    /// Stable index (cycles sorted by smallest member name).
    pub index: usize,
    /// Member nodes, sorted by name.
    pub members: Vec<NodeIndex>,
    /// Edges strictly between members.
    pub edges: Vec<(NodeIndex, NodeIndex)>,
    /// Boundary edges `outside → member`.
    pub incoming: Vec<(NodeIndex, NodeIndex)>,
    /// Boundary edges `member → outside`.
    pub outgoing: Vec<(NodeIndex, NodeIndex)>,
}

impl Cycle {
    /// Number of member nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Companion of [`Self::len`]; a cycle has at least two members, so
    /// this is `false` for every cycle the condenser produces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Return `true` if `node` is a member of this cycle.
    #[must_use]
    pub fn contains(&self, node: NodeIndex) -> bool {
        self.members.contains(&node)
    }

    /// The member that gives the cycle its name and sort key.
    #[must_use]
    pub fn first_member(&self) -> NodeIndex {
        self.members[0]
    }
}

// ---------------------------------------------------------------------------
// Condensation
// ---------------------------------------------------------------------------

/// Node weight in the condensed graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CondensedNode {
    /// An original node that is not part of any cycle.
    Single(NodeIndex),
    /// The representative of a cycle; details live in [`Condensation::cycles`].
    Cycle,
}

/// The condensed (acyclic) view of a [`DependencyGraph`].
#[derive(Debug, Clone)]
pub struct Condensation {
    /// Condensed DAG: non-cycle nodes plus one representative per cycle.
    pub graph: DiGraph<CondensedNode, ()>,
    /// Cycles keyed by their representative node in [`Self::graph`].
    pub cycles: BTreeMap<NodeIndex, Cycle>,
    /// Original node index → condensed node index.
    representative_of: Vec<NodeIndex>,
}

impl Condensation {
    /// Collapse every strongly connected component with more than one member.
    ///
    /// Uses Kosaraju's algorithm, which petgraph implements iteratively, so
    /// deep include chains cannot overflow the stack.
    #[must_use]
    #[instrument(skip_all, fields(nodes = original.node_count()))]
    pub fn condense(original: &DependencyGraph) -> Self {
        let g = &original.graph;

        let mut components: Vec<Vec<NodeIndex>> = kosaraju_scc(g)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .collect();
        for members in &mut components {
            members.sort_by(|a, b| g[*a].name.cmp(&g[*b].name));
        }
        components.sort_by(|a, b| g[a[0]].name.cmp(&g[b[0]].name));

        let mut graph: DiGraph<CondensedNode, ()> = DiGraph::new();
        let mut cycles: BTreeMap<NodeIndex, Cycle> = BTreeMap::new();
        let mut member_of: HashMap<NodeIndex, NodeIndex> = HashMap::new();

        for (index, members) in components.into_iter().enumerate() {
            let rep = graph.add_node(CondensedNode::Cycle);
            member_of.extend(members.iter().map(|&m| (m, rep)));
            cycles.insert(
                rep,
                Cycle {
                    index,
                    members,
                    edges: Vec::new(),
                    incoming: Vec::new(),
                    outgoing: Vec::new(),
                },
            );
        }

        let representative_of: Vec<NodeIndex> = g
            .node_indices()
            .map(|idx| {
                member_of
                    .get(&idx)
                    .copied()
                    .unwrap_or_else(|| graph.add_node(CondensedNode::Single(idx)))
            })
            .collect();

        for edge in g.edge_references() {
            let (u, v) = (edge.source(), edge.target());
            let (cu, cv) = (representative_of[u.index()], representative_of[v.index()]);

            if cu == cv {
                if let Some(cycle) = cycles.get_mut(&cu) {
                    cycle.edges.push((u, v));
                }
                continue;
            }

            if let Some(cycle) = cycles.get_mut(&cv) {
                cycle.incoming.push((u, v));
            }
            if let Some(cycle) = cycles.get_mut(&cu) {
                cycle.outgoing.push((u, v));
            }
            // update_edge keeps a single edge per condensed pair.
            graph.update_edge(cu, cv, ());
        }

        let by_name = |a: &(NodeIndex, NodeIndex), b: &(NodeIndex, NodeIndex)| {
            (&g[a.0].name, &g[a.1].name).cmp(&(&g[b.0].name, &g[b.1].name))
        };
        for cycle in cycles.values_mut() {
            cycle.edges.sort_by(by_name);
            cycle.incoming.sort_by(by_name);
            cycle.outgoing.sort_by(by_name);
        }

        debug!(
            cycles = cycles.len(),
            condensed_nodes = graph.node_count(),
            condensed_edges = graph.edge_count(),
            "graph condensed"
        );

        Self {
            graph,
            cycles,
            representative_of,
        }
    }

    /// Return the condensed node standing for original node `node`.
    #[must_use]
    pub fn condensed_of(&self, node: NodeIndex) -> NodeIndex {
        self.representative_of[node.index()]
    }

    /// Return the cycle `node` (an original index) belongs to, if any.
    #[must_use]
    pub fn cycle_of(&self, node: NodeIndex) -> Option<&Cycle> {
        self.cycles.get(&self.condensed_of(node))
    }

    /// Number of cycles found.
    #[must_use]
    pub fn cycle_count(&self) -> usize {
        self.cycles.len()
    }

    /// Cycles ordered by their stable index.
    #[must_use]
    pub fn cycles_in_order(&self) -> Vec<&Cycle> {
        let mut ordered: Vec<&Cycle> = self.cycles.values().collect();
        ordered.sort_by_key(|c| c.index);
        ordered
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn names(original: &DependencyGraph, nodes: &[NodeIndex]) -> Vec<String> {
        nodes.iter().map(|&n| original.name(n).to_string()).collect()
    }

    #[test]
    fn empty_graph_is_a_no_op() {
        let original = DependencyGraph::new();
        let c = Condensation::condense(&original);
        assert_eq!(c.graph.node_count(), 0);
        assert_eq!(c.cycle_count(), 0);
    }

    #[test]
    fn linear_chain_each_node_is_own_node() {
        let original = DependencyGraph::from_edges(&[], &[("A", "B"), ("B", "C")], &[]);
        let c = Condensation::condense(&original);
        assert_eq!(c.graph.node_count(), 3);
        assert_eq!(c.graph.edge_count(), 2);
        assert_eq!(c.cycle_count(), 0);
    }

    #[test]
    fn simple_cycle_condensed_to_one_node() {
        let original = DependencyGraph::from_edges(&[], &[("A", "B"), ("B", "A")], &[]);
        let c = Condensation::condense(&original);
        assert_eq!(c.graph.node_count(), 1);
        assert_eq!(c.graph.edge_count(), 0);
        assert_eq!(c.cycle_count(), 1);

        let cycle = c.cycles_in_order()[0];
        assert_eq!(names(&original, &cycle.members), ["A", "B"]);
        assert_eq!(cycle.len(), 2);
        assert!(!cycle.is_empty());
        assert_eq!(cycle.edges.len(), 2);
        assert!(cycle.incoming.is_empty());
        assert!(cycle.outgoing.is_empty());
    }

    #[test]
    fn boundary_edges_are_recorded_and_mapped() {
        // X → A ⇄ B → Y, X → B
        let original = DependencyGraph::from_edges(
            &[],
            &[("X", "A"), ("X", "B"), ("A", "B"), ("B", "A"), ("B", "Y")],
            &[],
        );
        let c = Condensation::condense(&original);
        assert_eq!(c.cycle_count(), 1);
        assert_eq!(c.graph.node_count(), 3, "X, Y, and the cycle");
        assert_eq!(c.graph.edge_count(), 2, "X→cycle collapses to one edge");

        let a = original.node_index("A").expect("A");
        let cycle = c.cycle_of(a).expect("A is cyclic");
        assert_eq!(cycle.incoming.len(), 2);
        assert_eq!(cycle.outgoing.len(), 1);

        let x = original.node_index("X").expect("X");
        let y = original.node_index("Y").expect("Y");
        let rep = c.condensed_of(a);
        assert!(c.graph.contains_edge(c.condensed_of(x), rep));
        assert!(c.graph.contains_edge(rep, c.condensed_of(y)));
        assert!(c.cycle_of(x).is_none());
    }

    #[test]
    fn edges_between_two_cycles_are_boundary_edges_of_both() {
        let original = DependencyGraph::from_edges(
            &[],
            &[("A", "B"), ("B", "A"), ("B", "C"), ("C", "D"), ("D", "C")],
            &[],
        );
        let c = Condensation::condense(&original);
        let ordered = c.cycles_in_order();
        assert_eq!(ordered.len(), 2);
        assert_eq!(ordered[0].outgoing.len(), 1);
        assert_eq!(ordered[1].incoming.len(), 1);
        assert_eq!(c.graph.edge_count(), 1);
    }

    #[test]
    fn cycle_indices_follow_smallest_member_name() {
        // "11" < "2" < "3" as strings.
        let original = DependencyGraph::from_edges(
            &[],
            &[
                ("3", "8"),
                ("8", "9"),
                ("9", "3"),
                ("2", "6"),
                ("6", "2"),
                ("11", "12"),
                ("12", "11"),
            ],
            &[],
        );
        let c = Condensation::condense(&original);
        let ordered = c.cycles_in_order();
        assert_eq!(names(&original, &ordered[0].members), ["11", "12"]);
        assert_eq!(names(&original, &ordered[1].members), ["2", "6"]);
        assert_eq!(names(&original, &ordered[2].members), ["3", "8", "9"]);
        assert_eq!(
            ordered.iter().map(|c| c.index).collect::<Vec<_>>(),
            [0, 1, 2]
        );
    }

    #[test]
    fn external_nodes_never_join_cycles() {
        let original =
            DependencyGraph::from_edges(&[], &[("A", "B"), ("B", "A"), ("A", "ext")], &["ext"]);
        let c = Condensation::condense(&original);
        let ext = original.node_index("ext").expect("ext");
        assert!(c.cycle_of(ext).is_none());
        assert_eq!(c.cycle_count(), 1);
    }
}
