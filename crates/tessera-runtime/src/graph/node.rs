//! Graph nodes and their roles.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, IntoStaticStr};

use super::NodeId;
use crate::engine::RunMode;
use crate::error::{Error, Result};
use crate::transform::Transformation;

/// Role of a node in the data flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NodeKind {
    /// Source node seeded from an externally supplied value.
    Input,
    /// Node computed by applying a payload to its inbound values.
    Transformation,
    /// Marker node forwarding the value of its single upstream node.
    Output,
}

/// What a node does when it is evaluated.
pub(crate) enum Payload<V> {
    Input,
    Transformation(Box<dyn Transformation<V>>),
    Output,
}

/// A vertex of a feature graph.
///
/// Nodes are owned by their [`Graph`](super::Graph); edges live in the graph
/// and are read through [`Graph::inbound_nodes`](super::Graph::inbound_nodes)
/// and [`Graph::outbound_nodes`](super::Graph::outbound_nodes).
pub struct Node<V> {
    id: NodeId,
    name: String,
    payload: Payload<V>,
    cached_output: Option<V>,
    shape: Option<Vec<usize>>,
}

impl<V> Node<V> {
    pub(crate) fn input(name: String) -> Self {
        Self::with_payload(name, Payload::Input).with_shape(vec![1])
    }

    pub(crate) fn transformation(name: String, payload: Box<dyn Transformation<V>>) -> Self {
        Self::with_payload(name, Payload::Transformation(payload))
    }

    pub(crate) fn output(name: String) -> Self {
        Self::with_payload(name, Payload::Output)
    }

    fn with_payload(name: String, payload: Payload<V>) -> Self {
        Self {
            id: NodeId::new(),
            name,
            payload,
            cached_output: None,
            shape: None,
        }
    }

    fn with_shape(mut self, shape: Vec<usize>) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Returns the node's identity.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the node's name, unique within its graph.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the node's role.
    pub fn kind(&self) -> NodeKind {
        match self.payload {
            Payload::Input => NodeKind::Input,
            Payload::Transformation(_) => NodeKind::Transformation,
            Payload::Output => NodeKind::Output,
        }
    }

    /// Returns whether this is an input node.
    pub fn is_input(&self) -> bool {
        matches!(self.payload, Payload::Input)
    }

    /// Returns the expected output shape, if known.
    pub fn shape(&self) -> Option<&[usize]> {
        self.shape.as_deref()
    }

    /// Returns the value materialized by eager construction, if any.
    pub fn cached_output(&self) -> Option<&V> {
        self.cached_output.as_ref()
    }

    /// Returns whether the payload carries learned parameters.
    pub fn is_stateful(&self) -> bool {
        match &self.payload {
            Payload::Transformation(payload) => payload.is_stateful(),
            _ => false,
        }
    }

    pub(crate) fn set_shape(&mut self, shape: Option<Vec<usize>>) {
        self.shape = shape;
    }

    pub(crate) fn set_cached_output(&mut self, value: Option<V>) {
        self.cached_output = value;
    }

    pub(crate) fn payload(&self) -> Option<&dyn Transformation<V>> {
        match &self.payload {
            Payload::Transformation(payload) => Some(payload.as_ref()),
            _ => None,
        }
    }

    pub(crate) fn payload_mut(&mut self) -> Option<&mut (dyn Transformation<V> + 'static)> {
        match &mut self.payload {
            Payload::Transformation(payload) => Some(payload.as_mut()),
            _ => None,
        }
    }
}

impl<V: Clone> Node<V> {
    /// Evaluates the node against the positional values of its inbound nodes.
    ///
    /// Input nodes ignore `inputs` and return the value supplied at
    /// construction. In [`RunMode::Fit`] a transformation learns from
    /// `inputs` before producing its output; in [`RunMode::Transform`] it
    /// only applies what it has already learned.
    pub fn evaluate(&mut self, inputs: &[&V], mode: RunMode) -> Result<V> {
        let result = match (&mut self.payload, mode) {
            (Payload::Input, _) => {
                return self.cached_output.clone().ok_or_else(|| Error::MissingInput {
                    name: self.name.clone(),
                });
            }
            (Payload::Transformation(payload), RunMode::Fit) => payload.fit_transform(inputs),
            (Payload::Transformation(payload), RunMode::Transform) => payload.transform(inputs),
            (Payload::Output, _) => match inputs {
                [value] => Ok((*value).clone()),
                _ => Err(format!("output node expects 1 input, got {}", inputs.len()).into()),
            },
        };

        result.map_err(|source| Error::evaluation(self.name.clone(), mode, source))
    }
}

impl<V> std::fmt::Debug for Node<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("shape", &self.shape)
            .field("materialized", &self.cached_output.is_some())
            .finish()
    }
}
