/// AdaGrad optimizer implementation
pub mod ada_grad;
/// Adam optimizer implementation
pub mod adam;
/// Input validation functions for optimizers
mod input_validation_function;
/// RMSprop optimizer implementation
pub mod rms_prop;
/// SGD optimizer implementation
pub mod sgd;

pub use ada_grad::*;
pub use adam::*;
pub use rms_prop::*;
pub use sgd::*;

use crate::error::ModelError;
use crate::graph::{ParamId, Parameter, ParameterStore, Tensor};
use crate::traits::Optimizer;
use input_validation_function::*;
use ndarray::Zip;

/// Gradient clipping value to prevent exploding gradients in recurrent layers
const GRADIENT_CLIP_VALUE: f32 = 5.0;

/// Parameters with at least this many elements are updated with rayon's parallel zip
const PARALLEL_THRESHOLD: usize = 1024;

/// Fails if a parameter's gradient holds a NaN or infinity
fn validate_gradient(param: &Parameter) -> Result<(), ModelError> {
    if param.grad().iter().any(|g| !g.is_finite()) {
        return Err(ModelError::Optimizer(format!(
            "gradient of '{}' is not finite",
            param.name()
        )));
    }
    Ok(())
}

/// Fails if an update left a parameter holding a NaN or infinity
fn validate_updated_value(param: &Parameter) -> Result<(), ModelError> {
    if param.value().iter().any(|v| !v.is_finite()) {
        return Err(ModelError::Optimizer(format!(
            "update made '{}' non-finite",
            param.name()
        )));
    }
    Ok(())
}

#[inline]
fn clip(g: f32) -> f32 {
    g.clamp(-GRADIENT_CLIP_VALUE, GRADIENT_CLIP_VALUE)
}

/// Per-parameter optimizer state, indexed by `ParamId`
///
/// Moments are allocated lazily on the first update of each parameter and
/// reallocated if the parameter's shape changed since.
#[derive(Debug, Clone, Default)]
struct MomentCache {
    moments: Vec<Option<Tensor>>,
}

impl MomentCache {
    fn get_or_init(&mut self, id: ParamId, like: &Tensor) -> &mut Tensor {
        if self.moments.len() <= id.index() {
            self.moments.resize(id.index() + 1, None);
        }
        let slot = &mut self.moments[id.index()];
        if slot.as_ref().map(|m| m.shape() != like.shape()).unwrap_or(true) {
            *slot = Some(Tensor::zeros(like.raw_dim()));
        }
        slot.get_or_insert_with(|| Tensor::zeros(like.raw_dim()))
    }
}

/// Runs `f` over each element of (value, moment, grad) in parallel for large tensors
fn zip_update_with_moment<F>(value: &mut Tensor, moment: &mut Tensor, grad: &Tensor, f: F)
where
    F: Fn(&mut f32, &mut f32, f32) + Sync + Send,
{
    let zip = Zip::from(value).and(moment).and(grad);
    if grad.len() >= PARALLEL_THRESHOLD {
        zip.par_for_each(|w, m, &g| f(w, m, g));
    } else {
        zip.for_each(|w, m, &g| f(w, m, g));
    }
}
