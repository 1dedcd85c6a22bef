#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod adapter;
pub mod engine;
mod error;
pub mod graph;
pub mod transform;

#[doc(hidden)]
pub mod prelude;

pub use error::{BoxedError, Error, Result};

/// Tracing target for runtime operations.
pub const TRACING_TARGET: &str = "tessera_runtime";
