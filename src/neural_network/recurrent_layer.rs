/// Gate weights and their bound graph nodes
pub mod gate;
/// Input validation functions for recurrent layers
mod input_validation_function;
/// One LSTM cell wired into an expression graph
pub mod lstm;
/// Layers of LSTM cells stepped together
pub mod stack;

pub use gate::*;
pub use lstm::*;
pub use stack::*;

use crate::error::ModelError;
use crate::graph::{ExprGraph, NodeId, ParamId, ParameterStore, Tensor};
use input_validation_function::*;
use ndarray::{Array, IxDyn};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Draws a tensor of the given shape from `dist`
pub(crate) fn gaussian_tensor<R: Rng + ?Sized>(
    shape: &[usize],
    dist: &Normal<f32>,
    rng: &mut R,
) -> Tensor {
    Array::from_shape_simple_fn(IxDyn(shape), || dist.sample(rng))
}

/// Builds the zero-mean normal distribution used for weight initialization
pub(crate) fn weight_distribution(stddev: f32) -> Result<Normal<f32>, ModelError> {
    validate_stddev(stddev)?;
    Normal::new(0.0, stddev).map_err(|e| {
        ModelError::InputValidationError(format!("invalid weight distribution: {}", e))
    })
}
