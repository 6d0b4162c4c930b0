#![forbid(unsafe_code)]
//! cppdep-graph library.
//!
//! The dependency-graph analysis engine: cycle condensation, transitive
//! reduction, levelization, and the Lakos CCD family of metrics.
//!
//! # Conventions
//!
//! - **Errors**: Engine invariant violations surface as [`GraphError`].
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//!
//! # Pipeline
//!
//! ```text
//! items + is_external
//!        ↓  build::DependencyGraph::build()
//! DependencyGraph (DiGraph, may contain cycles)
//!        ↓  condense::Condensation::condense()
//! Condensation (DAG, cycles keyed by representative)
//!        ↓  reduce::transitive_reduction()
//! reduced DAG
//!        ↓  metrics::ccd / metrics::levels
//! per-node CD and level
//!        ↓  decondense::decondense()
//! final graph over the original nodes
//! ```
//!
//! [`Analysis::run`] drives all of the above and owns the results.

pub mod error;
pub mod graph;
pub mod metrics;
pub mod report;

pub use error::GraphError;
pub use graph::{Analysis, Cycle, DependencyGraph, DependencyItem, GraphNode};
pub use metrics::Summary;
