//! Rendering an [`Analysis`](crate::graph::Analysis).
//!
//! - [`text`]: the human-readable report (cycles, levels, summary)
//! - [`dot`]: Graphviz files for the original, cycle, and final graphs
//! - [`json`]: the same data as the text report, serializable

pub mod dot;
pub mod json;
pub mod text;

pub use dot::{to_dot, write_graphs};
pub use json::AnalysisReport;
pub use text::{write_report, DependencyListing, RULE_WIDTH};
