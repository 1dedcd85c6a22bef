//! Pipeline execution engine.
//!
//! This module provides the runtime for evaluating feature graphs:
//! - [`Pipeline`]: Runs a graph in fit or transform mode
//! - [`PipelineConfig`]: Configuration options
//! - [`order`]: Topological ordering of the nodes a run needs
//! - [`ExecutionContext`]: Run-scoped value cache
//! - [`FittedState`]: Persisted parameters of stateful transformations

mod config;
mod context;
mod mode;
mod pipeline;
mod scheduler;
mod state;

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use context::ExecutionContext;
pub use mode::{NodeRole, RunMode};
pub use pipeline::Pipeline;
pub use scheduler::{Dependencies, order};
pub use state::FittedState;

/// Tracing target for pipeline runs.
pub(crate) const TRACING_TARGET: &str = "tessera_runtime::engine";
