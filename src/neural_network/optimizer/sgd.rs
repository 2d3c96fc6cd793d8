use super::*;

/// Plain gradient descent: `w -= learning_rate * clip(g)` for every element.
pub struct SGD {
    learning_rate: f32,
}

impl SGD {
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `learning_rate` is not positive and finite
    pub fn new(learning_rate: f32) -> Result<Self, ModelError> {
        validate_learning_rate(learning_rate)?;
        Ok(Self { learning_rate })
    }
}

impl Optimizer for SGD {
    fn step(
        &mut self,
        params: &mut ParameterStore,
        learnables: &[ParamId],
    ) -> Result<(), ModelError> {
        let lr = self.learning_rate;
        for &id in learnables {
            let param = params.get_mut(id)?;
            validate_gradient(param)?;
            let (value, grad) = param.value_and_grad_mut();
            let zip = Zip::from(value).and(grad);
            if grad.len() >= PARALLEL_THRESHOLD {
                zip.par_for_each(|w, &g| *w -= lr * clip(g));
            } else {
                zip.for_each(|w, &g| *w -= lr * clip(g));
            }
            validate_updated_value(param)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "SGD"
    }
}
