//! Transformation payloads.
//!
//! The engine treats every transformation as an opaque callable over the
//! values of a node's inbound nodes. This module provides:
//! - [`Transformation`]: The payload contract, with fit and transform phases
//! - [`Lambda`]: A stateless payload wrapping a closure
//! - [`Identity`]: A payload forwarding its single input unchanged

mod identity;
mod lambda;

pub use identity::Identity;
pub use lambda::Lambda;

use crate::error::BoxedError;

/// A computation applied to the positional outputs of a node's inbound nodes.
///
/// Stateless payloads only implement [`transform`](Self::transform). Payloads
/// that learn parameters from data (scalers, encoders) also override
/// [`fit`](Self::fit), and report it through [`is_stateful`](Self::is_stateful)
/// so their parameters can be persisted by node name.
pub trait Transformation<V>: Send {
    /// Learns or updates internal parameters from the given inputs.
    fn fit(&mut self, inputs: &[&V]) -> Result<(), BoxedError> {
        let _ = inputs;
        Ok(())
    }

    /// Produces an output from the given inputs using the current parameters.
    fn transform(&self, inputs: &[&V]) -> Result<V, BoxedError>;

    /// Fits on the inputs, then transforms them.
    fn fit_transform(&mut self, inputs: &[&V]) -> Result<V, BoxedError> {
        self.fit(inputs)?;
        self.transform(inputs)
    }

    /// Returns whether this payload carries learned parameters.
    fn is_stateful(&self) -> bool {
        false
    }

    /// Exports the learned parameters, if any.
    fn save_state(&self) -> Option<serde_json::Value> {
        None
    }

    /// Restores previously exported parameters.
    fn load_state(&mut self, state: serde_json::Value) -> Result<(), BoxedError> {
        let _ = state;
        Err("transformation does not accept fitted state".into())
    }

    /// Forgets learned parameters, returning the payload to its unfitted
    /// state. Stateful payloads should override this.
    fn reset(&mut self) {}
}

/// Checks that a payload received exactly `expected` positional inputs.
pub fn expect_arity<V>(inputs: &[&V], expected: usize) -> Result<(), BoxedError> {
    if inputs.len() != expected {
        return Err(format!("expected {expected} input(s), got {}", inputs.len()).into());
    }
    Ok(())
}
