//! Graph evaluation mode.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// Controls when a graph evaluates the nodes added to it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GraphMode {
    /// Nodes are evaluated as soon as all of their upstream nodes hold values.
    Eager,
    /// Nodes only record structure until a pipeline run is requested.
    #[default]
    Lazy,
}

impl GraphMode {
    /// Returns whether this is eager mode.
    pub const fn is_eager(&self) -> bool {
        matches!(self, GraphMode::Eager)
    }

    /// Returns whether this is lazy mode.
    pub const fn is_lazy(&self) -> bool {
        matches!(self, GraphMode::Lazy)
    }
}
