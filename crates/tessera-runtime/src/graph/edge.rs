//! Edge data stored in the underlying petgraph.

use serde::{Deserialize, Serialize};

/// Data carried by an edge from an upstream node to its consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeData {
    /// Zero-based argument position the upstream value is passed at.
    pub position: usize,
}
