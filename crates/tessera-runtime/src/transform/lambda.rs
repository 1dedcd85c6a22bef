//! Closure-backed transformation.

use super::Transformation;
use crate::error::BoxedError;

/// A stateless transformation backed by a closure.
///
/// `fit` is a no-op, so fit and transform runs always agree.
pub struct Lambda<F> {
    func: F,
}

impl<F> Lambda<F> {
    /// Wraps a closure over positional inputs.
    pub fn new<V>(func: F) -> Self
    where
        F: Fn(&[&V]) -> Result<V, BoxedError> + Send,
    {
        Self { func }
    }
}

impl<V, F> Transformation<V> for Lambda<F>
where
    F: Fn(&[&V]) -> Result<V, BoxedError> + Send,
{
    fn transform(&self, inputs: &[&V]) -> Result<V, BoxedError> {
        (self.func)(inputs)
    }
}

impl<F> std::fmt::Debug for Lambda<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lambda").finish_non_exhaustive()
    }
}
