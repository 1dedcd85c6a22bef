//! Prelude module for convenient imports.
//!
//! This module re-exports commonly used types for ergonomic imports:
//!
//! ```rust
//! use tessera_runtime::prelude::*;
//! ```

pub use crate::engine::{FittedState, NodeRole, Pipeline, PipelineConfig, RunMode};
pub use crate::error::{BoxedError, Error, Result};
pub use crate::graph::{Graph, GraphMode, Node, NodeId, NodeKind};
pub use crate::transform::{Identity, Lambda, Transformation};
