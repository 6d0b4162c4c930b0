//! Graphviz DOT export.
//!
//! Each analysis produces three files next to each other:
//!
//! | File                  | Content                                         |
//! |-----------------------|-------------------------------------------------|
//! | `<basename>_orig.dot`   | the input graph                               |
//! | `<basename>_cycles.dot` | the subgraph induced by cycle members, if any |
//! | `<basename>_final.dot`  | the reduced, decondensed graph                |
//!
//! Nodes and edges are emitted sorted by name so that diffs between runs are
//! meaningful. External nodes are drawn dashed.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use petgraph::visit::EdgeRef;
use tracing::{debug, instrument};

use crate::graph::analysis::Analysis;
use crate::graph::build::DependencyGraph;

/// File extension of the written graphs.
pub const DOT_EXTENSION: &str = "dot";

/// Render `g` as a DOT digraph called `name`.
#[must_use]
pub fn to_dot(g: &DependencyGraph, name: &str) -> String {
    let mut nodes: Vec<_> = g.graph.node_indices().collect();
    nodes.sort_by(|&a, &b| g.name(a).cmp(g.name(b)));

    let mut edges: Vec<(&str, &str)> = g
        .graph
        .edge_references()
        .map(|e| (g.name(e.source()), g.name(e.target())))
        .collect();
    edges.sort_unstable();

    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "digraph {} {{", quote(name));
    for node in nodes {
        if g.is_external(node) {
            let _ = writeln!(out, "    {} [style=dashed];", quote(g.name(node)));
        } else {
            let _ = writeln!(out, "    {};", quote(g.name(node)));
        }
    }
    for (from, to) in edges {
        let _ = writeln!(out, "    {} -> {};", quote(from), quote(to));
    }
    out.push_str("}\n");
    out
}

/// The subgraph of `analysis.original` induced by all cycle members.
///
/// Returns `None` for acyclic graphs.
#[must_use]
pub fn cycles_subgraph(analysis: &Analysis) -> Option<DependencyGraph> {
    if analysis.cycles.is_empty() {
        return None;
    }
    let original = &analysis.original;
    let mut sub = DependencyGraph::new();
    for cycle in &analysis.cycles {
        for &member in &cycle.members {
            sub.ensure_node(original.name(member), false);
        }
    }
    for cycle in &analysis.cycles {
        for &(u, v) in cycle.edges.iter().chain(&cycle.outgoing) {
            // Only edges between members of (possibly different) cycles.
            if let (Some(a), Some(b)) = (
                sub.node_index(original.name(u)),
                sub.node_index(original.name(v)),
            ) {
                sub.add_edge(a, b);
            }
        }
    }
    Some(sub)
}

/// Write the original, cycle, and final graphs of `analysis` into `dir`.
///
/// The cycle graph is skipped when there are no cycles. Returns the paths
/// written, in that order.
///
/// # Errors
///
/// Returns an I/O error if `dir` cannot be created or a file cannot be
/// written.
#[instrument(skip(analysis))]
pub fn write_graphs(analysis: &Analysis, dir: &Path, basename: &str) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut graphs = vec![("orig", analysis.original.clone())];
    if let Some(sub) = cycles_subgraph(analysis) {
        graphs.push(("cycles", sub));
    }
    graphs.push(("final", analysis.reduced.clone()));

    let mut written = Vec::with_capacity(graphs.len());
    for (suffix, graph) in graphs {
        let path = dir.join(format!("{basename}_{suffix}.{DOT_EXTENSION}"));
        fs::write(&path, to_dot(&graph, &format!("{basename}_{suffix}")))?;
        debug!(path = %path.display(), "graph written");
        written.push(path);
    }
    Ok(written)
}

/// Quote a DOT identifier.
fn quote(id: &str) -> String {
    let mut out = String::with_capacity(id.len() + 2);
    out.push('"');
    for ch in id.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
