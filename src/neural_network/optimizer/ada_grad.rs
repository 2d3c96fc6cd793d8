use super::*;

/// AdaGrad. The per-element step shrinks with the total squared gradient seen
/// so far, which never decays.
pub struct AdaGrad {
    learning_rate: f32,
    epsilon: f32,
    accumulator: MomentCache,
}

impl AdaGrad {
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `learning_rate` or `epsilon` is not positive and finite
    pub fn new(learning_rate: f32, epsilon: f32) -> Result<Self, ModelError> {
        validate_learning_rate(learning_rate)?;
        validate_epsilon(epsilon)?;

        Ok(Self {
            learning_rate,
            epsilon,
            accumulator: MomentCache::default(),
        })
    }
}

impl Optimizer for AdaGrad {
    fn step(
        &mut self,
        params: &mut ParameterStore,
        learnables: &[ParamId],
    ) -> Result<(), ModelError> {
        let (lr, epsilon) = (self.learning_rate, self.epsilon);
        for &id in learnables {
            let param = params.get_mut(id)?;
            validate_gradient(param)?;
            let (value, grad) = param.value_and_grad_mut();
            let acc = self.accumulator.get_or_init(id, grad);
            zip_update_with_moment(value, acc, grad, |w, a, g| {
                let g = clip(g);
                *a += g * g;
                *w -= lr * g / (a.sqrt() + epsilon);
            });
            validate_updated_value(param)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "AdaGrad"
    }
}
