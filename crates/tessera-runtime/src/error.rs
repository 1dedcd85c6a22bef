//! Graph and pipeline error types.

use thiserror::Error;

use crate::engine::RunMode;
use crate::graph::NodeId;

/// Type alias for boxed dynamic errors raised by transformation payloads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for graph and pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or running a feature graph.
#[derive(Debug, Error)]
pub enum Error {
    /// Two nodes in the same graph share a name.
    #[error("node name `{name}` is already used in this graph")]
    DuplicateName {
        /// The conflicting name.
        name: String,
    },

    /// A dependency cycle was found.
    #[error("dependency cycle detected at node `{node}`")]
    Cycle {
        /// Name of the node that closes the cycle.
        node: String,
    },

    /// A required input node has no supplied value.
    #[error("no value supplied for input node `{name}`")]
    MissingInput {
        /// Name of the input node.
        name: String,
    },

    /// A transformation payload failed.
    #[error("node `{node}` failed during {mode}: {source}")]
    Evaluation {
        /// Name of the failing node.
        node: String,
        /// Run mode the failure happened in.
        mode: RunMode,
        /// Error raised by the payload.
        #[source]
        source: BoxedError,
    },

    /// A node handle does not belong to this graph.
    #[error("node {0} does not exist in this graph")]
    UnknownNode(NodeId),

    /// The graph was used in a way its structure does not allow.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// Supplied inputs or persisted state are not acceptable.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Wraps a payload failure with the node name and run mode.
    pub fn evaluation(node: impl Into<String>, mode: RunMode, source: BoxedError) -> Self {
        Self::Evaluation {
            node: node.into(),
            mode,
            source,
        }
    }

    /// Returns the name of the node this error is about, if any.
    pub fn node_name(&self) -> Option<&str> {
        match self {
            Self::DuplicateName { name } | Self::MissingInput { name } => Some(name),
            Self::Cycle { node } | Self::Evaluation { node, .. } => Some(node),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_error_message() {
        let error = Error::evaluation("scaled", RunMode::Fit, "division by zero".into());
        assert_eq!(
            error.to_string(),
            "node `scaled` failed during fit: division by zero"
        );
        assert_eq!(error.node_name(), Some("scaled"));
    }

    #[test]
    fn test_node_name_is_absent_for_structural_errors() {
        let error = Error::InvalidGraph("output nodes take exactly one upstream".into());
        assert!(error.node_name().is_none());
    }
}
