//! Serializable graph definition.

use serde::{Deserialize, Serialize};

use super::mode::GraphMode;
use super::node::NodeKind;
use super::NodeId;

/// Read-only, serializable view of a graph's structure.
///
/// Produced by [`Graph::to_definition`](super::Graph::to_definition) for
/// tools that draw or inspect a pipeline without touching node state.
/// Payloads are opaque and are not part of the definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDefinition {
    /// Evaluation mode of the graph.
    pub mode: GraphMode,
    /// Nodes in insertion order.
    pub nodes: Vec<NodeDefinition>,
}

/// Structure of a single node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDefinition {
    /// Node identity.
    pub id: NodeId,
    /// Node name, unique within the graph.
    pub name: String,
    /// Node role.
    pub kind: NodeKind,
    /// Expected output shape.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<Vec<usize>>,
    /// Names of the upstream nodes, in argument order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inbound: Vec<String>,
}

impl GraphDefinition {
    /// Returns a node definition by name.
    pub fn node(&self, name: &str) -> Option<&NodeDefinition> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Serializes the definition to pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
