//! Engine error type.
//!
//! The engine operates on an already-validated graph. Every variant here is
//! an internal invariant violation: the caller built a graph the engine
//! cannot analyze, or a stage left the graph in a state the next stage does
//! not accept. None of them is meant to be recovered from.

/// Machine-readable codes for [`GraphError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphErrorCode {
    /// A cycle survived condensation.
    ResidualCycle,
    /// A node carries an edge to itself.
    SelfLoop,
    /// An external node was given successors.
    ExternalWithSuccessors,
}

impl GraphErrorCode {
    /// Stable code identifier (`E9###`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ResidualCycle => "E9101",
            Self::SelfLoop => "E9102",
            Self::ExternalWithSuccessors => "E9103",
        }
    }
}

/// Fatal internal errors raised by the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The condensed graph still contains a cycle through `node`.
    #[error("condensed graph is not acyclic: cycle through {node}")]
    ResidualCycle {
        /// A node on the residual cycle (representatives print as `cycle #i`).
        node: String,
    },

    /// The input graph contains an edge from `node` to itself.
    #[error("self-loop on {node}")]
    SelfLoop {
        /// The offending node.
        node: String,
    },

    /// An external node has outgoing edges.
    #[error("external node {node} has dependencies")]
    ExternalWithSuccessors {
        /// The offending node.
        node: String,
    },
}

impl GraphError {
    /// Return the machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> GraphErrorCode {
        match self {
            Self::ResidualCycle { .. } => GraphErrorCode::ResidualCycle,
            Self::SelfLoop { .. } => GraphErrorCode::SelfLoop,
            Self::ExternalWithSuccessors { .. } => GraphErrorCode::ExternalWithSuccessors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct_and_machine_friendly() {
        let all = [
            GraphErrorCode::ResidualCycle,
            GraphErrorCode::SelfLoop,
            GraphErrorCode::ExternalWithSuccessors,
        ];
        let mut seen = std::collections::HashSet::new();
        for code in all {
            let s = code.code();
            assert!(seen.insert(s), "duplicate code {s}");
            assert_eq!(s.len(), 5);
            assert!(s.starts_with('E'));
        }
    }

    #[test]
    fn error_maps_to_code() {
        let err = GraphError::SelfLoop {
            node: "a".to_string(),
        };
        assert_eq!(err.code(), GraphErrorCode::SelfLoop);
        assert_eq!(err.to_string(), "self-loop on a");
    }
}
