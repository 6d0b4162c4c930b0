#![forbid(unsafe_code)]
//! cppdep-core library.
//!
//! The project model of a C/C++ code base, as seen by a physical dependency
//! analysis: package groups contain packages, packages contain components,
//! and components depend on each other through `#include` directives.
//!
//! # Conventions
//!
//! - **Errors**: Fallible operations return [`Result`] with [`Error`].
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//!   Include hygiene problems in the analyzed sources are warnings, never errors.
//!
//! The graph work itself lives in `cppdep_graph`; this crate only feeds it.

pub mod component;
pub mod config;
pub mod error;
pub mod include;
pub mod model;
pub mod path;
pub mod project;
pub mod view;

pub use config::{Config, DEFAULT_CONFIG_FILE};
pub use error::{Error, ErrorCode, Result};
pub use project::{Project, ReportOptions};
pub use view::View;

/// Release version, printed by `cppdep --version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
