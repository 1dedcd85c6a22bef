//! Feature graph structures and node types.
//!
//! This module provides the graph representation of a feature pipeline:
//! - [`Graph`]: The owning registry of nodes and edges, eager or lazy
//! - [`Node`]: A vertex holding a name, role, payload and eager value
//! - [`NodeId`]: Unique identity handle for nodes
//! - [`NodeKind`]: The role of a node (input, transformation, output)
//! - [`GraphMode`]: When nodes are evaluated
//! - [`GraphDefinition`]: Serializable read-only view for exporters

mod definition;
mod edge;
mod graph;
mod id;
mod mode;
mod node;

pub use definition::{GraphDefinition, NodeDefinition};
pub use edge::EdgeData;
pub use graph::Graph;
pub use id::NodeId;
pub use mode::GraphMode;
pub use node::{Node, NodeKind};

/// Tracing target for graph construction.
pub(crate) const TRACING_TARGET: &str = "tessera_runtime::graph";
