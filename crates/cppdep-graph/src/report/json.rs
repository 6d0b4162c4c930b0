//! Machine-readable report.
//!
//! [`AnalysisReport`] carries the same information as the text report
//! (cycles, levels with optional dependency lists, redundant edges, summary)
//! as plain serializable data.

use serde::Serialize;

use crate::graph::analysis::Analysis;
use crate::metrics::Summary;
use crate::report::text::{dependencies_of, DependencyListing};

/// One cycle, by member names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub index: usize,
    pub members: Vec<String>,
    pub edges: Vec<(String, String)>,
}

/// One node at some level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeReport {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<usize>,
    pub external: bool,
    /// Component dependency of the node.
    pub cd: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

/// All nodes at one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelReport {
    pub level: usize,
    pub nodes: Vec<NodeReport>,
}

/// The whole report for one analyzed graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// What was analyzed, e.g. `system` or a package name.
    pub name: String,
    pub cycles: Vec<CycleReport>,
    pub levels: Vec<LevelReport>,
    /// Input edges removed by transitive reduction.
    pub redundant_edges: Vec<(String, String)>,
    pub summary: Summary,
}

impl AnalysisReport {
    /// Collect the report data of `analysis`.
    #[must_use]
    pub fn new(name: &str, analysis: &Analysis, listing: DependencyListing) -> Self {
        let cycles = analysis
            .cycles
            .iter()
            .map(|c| CycleReport {
                index: c.index,
                members: c
                    .members
                    .iter()
                    .map(|&m| analysis.name(m).to_string())
                    .collect(),
                edges: c
                    .edges
                    .iter()
                    .map(|&(a, b)| (analysis.name(a).to_string(), analysis.name(b).to_string()))
                    .collect(),
            })
            .collect();

        let mut levels: Vec<LevelReport> = Vec::new();
        if !analysis.is_empty() {
            levels = (0..=analysis.max_level())
                .map(|level| LevelReport {
                    level,
                    nodes: Vec::new(),
                })
                .collect();
        }
        for node in analysis.nodes_by_level() {
            let dependencies = if analysis.original.is_external(node) {
                Vec::new()
            } else {
                dependencies_of(analysis, node, listing)
                    .into_iter()
                    .map(|d| analysis.name(d).to_string())
                    .collect()
            };
            levels[analysis.level(node)].nodes.push(NodeReport {
                name: analysis.name(node).to_string(),
                cycle: analysis.cycle_index(node),
                external: analysis.original.is_external(node),
                cd: analysis.cd(node),
                dependencies,
            });
        }

        let redundant_edges = analysis
            .redundant_edges()
            .into_iter()
            .map(|(a, b)| (analysis.name(a).to_string(), analysis.name(b).to_string()))
            .collect();

        Self {
            name: name.to_string(),
            cycles,
            levels,
            redundant_edges,
            summary: analysis.summary.clone(),
        }
    }

    /// Serialize as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build::DependencyGraph;

    #[test]
    fn report_groups_nodes_by_level() {
        let a = Analysis::run(DependencyGraph::from_edges(
            &[],
            &[("a", "b"), ("b", "a"), ("b", "c"), ("c", "ext")],
            &["ext"],
        ))
        .expect("analysis");
        let report = AnalysisReport::new("pkg", &a, DependencyListing::Reduced);

        assert_eq!(report.levels.len(), 4);
        assert_eq!(report.levels[0].nodes[0].name, "ext");
        assert!(report.levels[0].nodes[0].external);
        assert_eq!(report.levels[1].nodes[0].dependencies, ["ext"]);
        // c needs itself and ext.
        assert_eq!(report.levels[1].nodes[0].cd, 2);
        assert_eq!(report.levels[0].nodes[0].cd, 1);
        assert!(report.levels[2].nodes.is_empty());
        assert_eq!(report.levels[3].nodes.len(), 2);
        assert_eq!(report.levels[3].nodes[0].cycle, Some(0));
        assert_eq!(report.cycles[0].members, ["a", "b"]);
        assert!(report.redundant_edges.is_empty());
    }

    #[test]
    fn redundant_edges_are_reported_by_name() {
        let a = Analysis::run(DependencyGraph::from_edges(
            &[],
            &[("a", "b"), ("b", "c"), ("a", "c")],
            &[],
        ))
        .expect("analysis");
        let json = AnalysisReport::new("g", &a, DependencyListing::None)
            .to_json()
            .expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(value["redundant_edges"], serde_json::json!([["a", "c"]]));
    }

    #[test]
    fn json_has_summary_fields() {
        let a = Analysis::run(DependencyGraph::from_edges(&[], &[("x", "y")], &[]))
            .expect("analysis");
        let json = AnalysisReport::new("g", &a, DependencyListing::None)
            .to_json()
            .expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(value["name"], "g");
        assert_eq!(value["summary"]["ccd"], 3);
        assert_eq!(value["summary"]["levels"], 2);
        assert!(value["levels"][1]["nodes"][0].get("dependencies").is_none());
    }
}
