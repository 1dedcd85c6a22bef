//! Pipeline run modes.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// Whether a run may update the learned parameters of its transformations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunMode {
    /// Stateful transformations learn from the inputs, then transform them.
    Fit,
    /// Transformations apply previously learned parameters unchanged.
    Transform,
}

/// Classification of a node relative to a set of requested outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NodeRole {
    /// Source node seeded from raw inputs.
    Input,
    /// Node evaluated only to feed other nodes.
    Intermediate,
    /// One of the requested outputs.
    Output,
}
