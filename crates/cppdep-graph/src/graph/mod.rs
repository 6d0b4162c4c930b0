//! Dependency graph construction and normalization.
//!
//! # Overview
//!
//! This module turns resolved dependency items into a petgraph-based
//! directed graph and normalizes it for levelization and CCD metrics.
//!
//! ## Pipeline
//!
//! ```text
//! DependencyItem + is_external
//!        ↓  build::DependencyGraph::build()
//! DependencyGraph (DiGraph with possible cycles)
//!        ↓  condense::Condensation::condense()
//! Condensation (cycles collapsed to representatives, DAG)
//!        ↓  reduce::transitive_reduction()
//! reduced DAG (minimum edges, same reachability)
//!        ↓  crate::metrics
//! per-node CD and levels
//!        ↓  decondense::decondense()
//! reduced DependencyGraph over the original nodes
//! ```
//!
//! ## Typical Usage
//!
//! ```rust,ignore
//! use cppdep_graph::{Analysis, DependencyGraph};
//!
//! let graph = DependencyGraph::build(items, |name| externals.contains(name));
//! let analysis = Analysis::run(graph)?;
//!
//! println!("levels={} ccd={} nccd={:.2}",
//!     analysis.summary.levels, analysis.summary.ccd, analysis.summary.nccd);
//! ```

pub mod analysis;
pub mod build;
pub mod condense;
pub mod decondense;
pub mod reduce;

// Re-export primary types at module level for convenience.
pub use analysis::Analysis;
pub use build::{DependencyGraph, DependencyItem, GraphNode};
pub use condense::{Condensation, CondensedNode, Cycle};
pub use reduce::transitive_reduction;
