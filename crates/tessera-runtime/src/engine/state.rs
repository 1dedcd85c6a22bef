//! Persisted parameters of fitted transformations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Learned parameters of stateful transformations, keyed by node name.
///
/// Saved after a `fit` run so that later `transform`-only runs can start
/// from the same parameters, possibly in another process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FittedState {
    params: BTreeMap<String, serde_json::Value>,
}

impl FittedState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the parameters of a node.
    pub fn insert(&mut self, node: impl Into<String>, params: serde_json::Value) {
        self.params.insert(node.into(), params);
    }

    /// Returns the parameters of a node.
    pub fn get(&self, node: &str) -> Option<&serde_json::Value> {
        self.params.get(node)
    }

    /// Returns an iterator over node names and their parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.params.iter().map(|(name, params)| (name.as_str(), params))
    }

    /// Returns the number of nodes with stored parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns whether no parameters are stored.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Serializes the state to JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserializes a state from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
