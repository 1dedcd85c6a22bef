use super::{Transformation, expect_arity};
use crate::error::BoxedError;

/// Forwards its single input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<V: Clone> Transformation<V> for Identity {
    fn transform(&self, inputs: &[&V]) -> Result<V, BoxedError> {
        expect_arity(inputs, 1)?;
        Ok(inputs[0].clone())
    }
}
