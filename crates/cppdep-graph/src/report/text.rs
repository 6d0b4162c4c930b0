//! Plain-text report: cycles, levels, redundant edges, summary.
//!
//! Sections are written in a fixed order, each introduced by an 80-column
//! `=` rule, to any [`std::io::Write`] sink. The cycle and redundant-edge
//! sections are left out when empty. Nothing here mutates the analysis.
//!
//! ```text
//! ================================================================================
//! 1 cycles detected:
//!
//! cycle #0 (2 nodes): a, b
//! cycle #0 (2 edges): a->b b->a
//!
//! ================================================================================
//! 3 level(s):
//!
//! level 0:
//! level 1:
//!     c
//! level 2:
//! level 3:
//!     a <0>
//!     b <0>
//! ================================================================================
//! SUMMARY:
//! Components: 3    Cycles: 1   Levels: 3
//! CCD: 7   ACCD: 2.33  NCCD: 1.40 (typical range is [0.85, 1.10])
//! ```

use std::io::{self, Write};

use petgraph::graph::NodeIndex;

use crate::graph::analysis::Analysis;
use crate::graph::build::DependencyGraph;
use crate::metrics::ccd::TYPICAL_NCCD_RANGE;

/// Width of the section separator.
pub const RULE_WIDTH: usize = 80;

/// Which dependencies, if any, to list under each node in the level report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DependencyListing {
    /// Only node names.
    #[default]
    None,
    /// Dependencies remaining after transitive reduction.
    Reduced,
    /// All direct dependencies of the input graph.
    Unreduced,
}

/// Write the section separator.
pub fn rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:=<width$}", "", width = RULE_WIDTH)
}

/// Write the full report. An empty analysis writes nothing.
pub fn write_report(
    analysis: &Analysis,
    listing: DependencyListing,
    w: &mut dyn Write,
) -> io::Result<()> {
    if analysis.is_empty() {
        return Ok(());
    }
    write_cycles(analysis, w)?;
    write_levels(analysis, listing, w)?;
    write_redundant_edges(analysis, w)?;
    write_summary(analysis, w)
}

/// Write every cycle under its stable index. Acyclic graphs write nothing.
pub fn write_cycles(analysis: &Analysis, w: &mut dyn Write) -> io::Result<()> {
    if analysis.cycles.is_empty() {
        return Ok(());
    }
    rule(w)?;
    writeln!(w, "{} cycles detected:", analysis.cycles.len())?;
    writeln!(w)?;
    for cycle in &analysis.cycles {
        let members: Vec<&str> = cycle.members.iter().map(|&n| analysis.name(n)).collect();
        writeln!(
            w,
            "cycle #{} ({} nodes): {}",
            cycle.index,
            members.len(),
            members.join(", ")
        )?;
        let edges: Vec<String> = cycle
            .edges
            .iter()
            .map(|&(a, b)| format!("{}->{}", analysis.name(a), analysis.name(b)))
            .collect();
        writeln!(
            w,
            "cycle #{} ({} edges): {}",
            cycle.index,
            edges.len(),
            edges.join(" ")
        )?;
        writeln!(w)?;
    }
    Ok(())
}

/// Write nodes level by level, from 0 to the highest level.
pub fn write_levels(
    analysis: &Analysis,
    listing: DependencyListing,
    w: &mut dyn Write,
) -> io::Result<()> {
    rule(w)?;
    writeln!(w, "{} level(s):", analysis.max_level())?;
    writeln!(w)?;

    let mut next_level = 0;
    for node in analysis.nodes_by_level() {
        let level = analysis.level(node);
        while next_level <= level {
            writeln!(w, "level {next_level}:")?;
            next_level += 1;
        }
        writeln!(w, "\t{}", annotated(analysis, node))?;
        write_dependencies(analysis, node, listing, w)?;
    }
    Ok(())
}

/// Write the edges removed by transitive reduction. Writes nothing if the
/// input was already minimal.
pub fn write_redundant_edges(analysis: &Analysis, w: &mut dyn Write) -> io::Result<()> {
    let edges: Vec<String> = analysis
        .redundant_edges()
        .into_iter()
        .map(|(a, b)| format!("{}->{}", analysis.name(a), analysis.name(b)))
        .collect();
    if edges.is_empty() {
        return Ok(());
    }
    rule(w)?;
    writeln!(w, "{} redundant edges stripped:", edges.len())?;
    writeln!(w)?;
    writeln!(w, "{}", edges.join(" "))
}

/// Write the aggregate metrics.
pub fn write_summary(analysis: &Analysis, w: &mut dyn Write) -> io::Result<()> {
    let s = &analysis.summary;
    rule(w)?;
    writeln!(w, "SUMMARY:")?;
    writeln!(
        w,
        "Components: {}\t Cycles: {}\t Levels: {}",
        s.components, s.cycles, s.levels
    )?;
    writeln!(
        w,
        "CCD: {}\t ACCD: {:.2}\t NCCD: {:.2} (typical range is [{:.2}, {:.2}])",
        s.ccd, s.accd, s.nccd, TYPICAL_NCCD_RANGE.0, TYPICAL_NCCD_RANGE.1
    )
}

/// Direct dependencies of `node` for `listing`, in dependency order.
#[must_use]
pub fn dependencies_of(
    analysis: &Analysis,
    node: NodeIndex,
    listing: DependencyListing,
) -> Vec<NodeIndex> {
    let source: &DependencyGraph = match listing {
        DependencyListing::None => return Vec::new(),
        DependencyListing::Reduced => &analysis.reduced,
        DependencyListing::Unreduced => &analysis.original,
    };
    let mut deps: Vec<NodeIndex> = source.successors(node).collect();
    deps.sort_by(|&a, &b| analysis.dependency_order(a, b));
    deps
}

fn write_dependencies(
    analysis: &Analysis,
    node: NodeIndex,
    listing: DependencyListing,
    w: &mut dyn Write,
) -> io::Result<()> {
    if analysis.original.is_external(node) {
        return Ok(());
    }
    for dep in dependencies_of(analysis, node, listing) {
        writeln!(w, "\t\t{}. {}", analysis.level(dep), annotated(analysis, dep))?;
    }
    Ok(())
}

/// Node name, followed by ` <i>` for members of cycle `i`.
fn annotated(analysis: &Analysis, node: NodeIndex) -> String {
    analysis.cycle_index(node).map_or_else(
        || analysis.name(node).to_string(),
        |i| format!("{} <{i}>", analysis.name(node)),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
