//! Graph construction from dependency items.
//!
//! # Overview
//!
//! The engine never sees components, packages, or package groups directly.
//! Callers adapt whatever they analyze to [`DependencyItem`] (a printable
//! name plus the names of its direct dependencies) and supply an
//! `is_external` predicate. [`DependencyGraph::build`] turns that into a
//! [`petgraph`] directed graph.
//!
//! ## Edge Direction
//!
//! An edge `A → B` means "A **depends on** B" (A includes B).
//!
//! ## Self-dependencies
//!
//! A header trivially depends on itself, and package-level views fold many
//! components into one node, so self-dependencies are common in the input.
//! They are dropped silently: the built graph never has a self-loop.
//!
//! ## External nodes
//!
//! Items are always internal. A node reached only as somebody's dependency is
//! external if the predicate says so. External nodes have no successors, never
//! take part in cycles, sit at level 0, and are excluded from component
//! counts.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use tracing::{instrument, trace, warn};

use crate::error::GraphError;

// ---------------------------------------------------------------------------
// DependencyItem
// ---------------------------------------------------------------------------

/// Anything that can be a node in a dependency graph.
///
/// Implementations exist in the project model for components, packages, and
/// package groups; tests use plain tuples.
pub trait DependencyItem {
    /// Stable printable identity, unique within one graph.
    fn name(&self) -> String;

    /// Names of the direct dependencies, already resolved.
    fn dependencies(&self) -> Vec<String>;
}

impl DependencyItem for (String, Vec<String>) {
    fn name(&self) -> String {
        self.0.clone()
    }

    fn dependencies(&self) -> Vec<String> {
        self.1.clone()
    }
}

impl DependencyItem for (&str, &[&str]) {
    fn name(&self) -> String {
        self.0.to_string()
    }

    fn dependencies(&self) -> Vec<String> {
        self.1.iter().map(|d| (*d).to_string()).collect()
    }
}

// ---------------------------------------------------------------------------
// GraphNode
// ---------------------------------------------------------------------------

/// Node weight in a [`DependencyGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphNode {
    /// Printable identity.
    pub name: String,
    /// `true` for nodes outside the analyzed scope.
    pub external: bool,
}

// ---------------------------------------------------------------------------
// DependencyGraph
// ---------------------------------------------------------------------------

/// A directed dependency graph without self-loops or multi-edges.
///
/// This is the input of [`crate::graph::analysis::Analysis::run`]; it may
/// contain cycles.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Directed graph: nodes = identities, edges = "depends on".
    pub graph: DiGraph<GraphNode, ()>,
    /// Mapping from node name to petgraph `NodeIndex`.
    pub node_map: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from dependency items.
    ///
    /// Every item becomes an internal node. Every dependency name that is not
    /// itself an item becomes a node whose external flag is `is_external(name)`.
    /// Self-dependencies are skipped; duplicate dependencies collapse.
    #[instrument(skip_all)]
    pub fn build<I, T, F>(items: I, is_external: F) -> Self
    where
        I: IntoIterator<Item = T>,
        T: DependencyItem,
        F: Fn(&str) -> bool,
    {
        let items: Vec<(String, Vec<String>)> = items
            .into_iter()
            .map(|item| (item.name(), item.dependencies()))
            .collect();

        let mut graph = Self::new();

        // Items first, so an item that also shows up as a dependency is never
        // flagged external regardless of iteration order.
        for (name, _) in &items {
            if is_external(name) {
                warn!(node = %name, "item flagged external; treating as internal");
            }
            graph.ensure_node(name, false);
        }

        for (name, dependencies) in &items {
            let from = graph.node_map[name.as_str()];
            for dependency in dependencies {
                // Existing nodes keep their flag; only new ones consult the predicate.
                let to = graph.ensure_node(dependency, is_external(dependency));
                graph.add_edge(from, to);
            }
        }

        trace!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "dependency graph built"
        );
        graph
    }

    /// Build a graph from explicit node and edge lists.
    ///
    /// Nodes named in `externals` are flagged external. Nodes mentioned only in
    /// `edges` are added implicitly.
    #[must_use]
    pub fn from_edges(nodes: &[&str], edges: &[(&str, &str)], externals: &[&str]) -> Self {
        let mut graph = Self::new();
        for name in nodes {
            graph.ensure_node(name, externals.contains(name));
        }
        for (from, to) in edges {
            let a = graph.ensure_node(from, externals.contains(from));
            let b = graph.ensure_node(to, externals.contains(to));
            graph.add_edge(a, b);
        }
        graph
    }

    /// Return the index of `name`, adding the node if it does not exist yet.
    pub fn ensure_node(&mut self, name: &str, external: bool) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(GraphNode {
            name: name.to_string(),
            external,
        });
        self.node_map.insert(name.to_string(), idx);
        idx
    }

    /// Add `from → to` unless it is a self-loop or already present.
    ///
    /// Returns `true` if an edge was added.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) -> bool {
        if from == to {
            trace!(node = %self.graph[from].name, "self-dependency dropped");
            return false;
        }
        if self.graph.contains_edge(from, to) {
            return false;
        }
        self.graph.add_edge(from, to, ());
        true
    }

    /// Return the number of nodes (internal and external).
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Return `true` if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Look up the `NodeIndex` for a node name.
    #[must_use]
    pub fn node_index(&self, name: &str) -> Option<NodeIndex> {
        self.node_map.get(name).copied()
    }

    /// Return the name of a node.
    #[must_use]
    pub fn name(&self, idx: NodeIndex) -> &str {
        &self.graph[idx].name
    }

    /// Return `true` if the node is external.
    #[must_use]
    pub fn is_external(&self, idx: NodeIndex) -> bool {
        self.graph[idx].external
    }

    /// Return the number of internal (non-external) nodes.
    #[must_use]
    pub fn internal_count(&self) -> usize {
        self.graph.node_weights().filter(|n| !n.external).count()
    }

    /// Direct dependencies of `idx`.
    pub fn successors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(idx, Direction::Outgoing)
    }

    /// Check the structural preconditions of the analysis pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::SelfLoop`] or
    /// [`GraphError::ExternalWithSuccessors`] when the graph was assembled by
    /// hand and breaks them.
    pub fn validate(&self) -> Result<(), GraphError> {
        for edge in self.graph.edge_references() {
            let source = &self.graph[edge.source()];
            if edge.source() == edge.target() {
                return Err(GraphError::SelfLoop {
                    node: source.name.clone(),
                });
            }
            if source.external {
                return Err(GraphError::ExternalWithSuccessors {
                    node: source.name.clone(),
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
