//! Run-scoped execution state.

use std::collections::HashMap;

use super::RunMode;
use crate::graph::NodeId;

/// Values produced during a single pipeline run.
///
/// The context is created at the start of a run and dropped at its end, so
/// values never leak from one run into the next and a failed run leaves
/// nothing behind.
#[derive(Debug)]
pub struct ExecutionContext<V> {
    /// Mode of this run.
    mode: RunMode,
    /// Value of every node evaluated so far.
    values: HashMap<NodeId, V>,
    /// Number of non-input nodes evaluated in this run.
    evaluated: usize,
}

impl<V> ExecutionContext<V> {
    /// Creates an empty context for a run in the given mode.
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            values: HashMap::new(),
            evaluated: 0,
        }
    }

    /// Returns the mode of this run.
    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Stores the raw value of an input node.
    pub fn seed(&mut self, id: NodeId, value: V) {
        self.values.insert(id, value);
    }

    /// Stores the value produced by evaluating a node.
    pub fn record(&mut self, id: NodeId, value: V) {
        self.values.insert(id, value);
        self.evaluated += 1;
    }

    /// Returns the value of a node, if it has been produced.
    pub fn get(&self, id: NodeId) -> Option<&V> {
        self.values.get(&id)
    }

    /// Removes and returns the value of a node.
    pub fn take(&mut self, id: NodeId) -> Option<V> {
        self.values.remove(&id)
    }

    /// Returns the number of non-input nodes evaluated so far.
    pub fn evaluated(&self) -> usize {
        self.evaluated
    }
}
