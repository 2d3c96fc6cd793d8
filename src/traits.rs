use crate::error::ModelError;
use crate::graph::{ParamId, ParameterStore};

/// Defines the interface for optimization algorithms.
///
/// An optimizer reads the gradient stored next to each learnable tensor and
/// updates the tensor in place. Gradients are produced by running a gradient
/// plan on a `TapeMachine` beforehand.
pub trait Optimizer {
    /// Applies one update step to every parameter in `learnables`.
    ///
    /// # Parameters
    ///
    /// - `params` - Store holding parameter values and their gradients
    /// - `learnables` - Parameters to update, in a stable order
    ///
    /// # Returns
    ///
    /// - `Ok(())` - If every parameter was updated
    /// - `Err(ModelError::Optimizer)` - If a gradient is not finite or the update would make a value non-finite
    fn step(&mut self, params: &mut ParameterStore, learnables: &[ParamId])
    -> Result<(), ModelError>;

    /// Name of the algorithm, used in logs
    fn name(&self) -> &str;
}
