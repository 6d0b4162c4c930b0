use std::fmt;
use std::io;
use std::path::PathBuf;

use cppdep_graph::GraphError;

/// Machine-readable error codes for scripted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigReadFailed,
    ConfigParseError,
    InvalidArgument,
    InvalidPattern,
    UnassociatedHeader,
    ReportWriteFailed,
    GraphInvariant,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigReadFailed => "E1001",
            Self::ConfigParseError => "E1002",
            Self::InvalidArgument => "E1003",
            Self::InvalidPattern => "E1004",
            Self::UnassociatedHeader => "E2001",
            Self::ReportWriteFailed => "E5001",
            Self::GraphInvariant => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigReadFailed => "IO error",
            Self::ConfigParseError => "Malformed configuration file",
            Self::InvalidArgument => "Invalid argument",
            Self::InvalidPattern => "Invalid pattern",
            Self::UnassociatedHeader => "Analysis (configuration) error",
            Self::ReportWriteFailed => "Report write failed",
            Self::GraphInvariant => "Internal graph error",
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigReadFailed => Some("Check the path given with --config (default .cppdep.yml)."),
            Self::ConfigParseError => Some("Fix the YAML syntax or remove unknown keys and retry."),
            Self::InvalidArgument => {
                Some("Group paths and include/alias directories must exist inside their group.")
            }
            Self::InvalidPattern => Some("Fix the regex in `pattern` or the glob in `src`/`ignore`."),
            Self::UnassociatedHeader => {
                Some("Add the header's directory as an `include` or `alias` of an external package.")
            }
            Self::ReportWriteFailed => Some("Check disk space and write permissions."),
            Self::GraphInvariant => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors that stop an analysis run.
///
/// Include problems in the analyzed sources (missing headers, duplicates, and
/// the like) are not errors; they are logged as warnings.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A file could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid YAML or does not match the schema.
    #[error("malformed configuration {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The configuration is well-formed but describes an impossible layout.
    #[error("{0}")]
    InvalidArgument(String),

    /// A regex or glob in the configuration does not compile.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A located header cannot be associated with any component.
    #[error("cannot associate {} with any component", .path.display())]
    Unassociated { path: PathBuf },

    /// Writing the report or a graph file failed.
    #[error("cannot write report: {0}")]
    Output(#[from] io::Error),

    /// The engine rejected a graph.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl Error {
    /// Return the machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } => ErrorCode::ConfigReadFailed,
            Self::Yaml { .. } => ErrorCode::ConfigParseError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::InvalidPattern { .. } => ErrorCode::InvalidPattern,
            Self::Unassociated { .. } => ErrorCode::UnassociatedHeader,
            Self::Output(_) => ErrorCode::ReportWriteFailed,
            Self::Graph(_) => ErrorCode::GraphInvariant,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
