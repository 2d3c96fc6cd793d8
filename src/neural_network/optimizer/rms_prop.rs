use super::*;

/// Root-mean-square propagation.
///
/// `cache` holds a decaying average of each element's squared gradient. The
/// update is the clipped gradient divided by the root of that average.
pub struct RMSprop {
    learning_rate: f32,
    rho: f32,
    epsilon: f32,
    cache: MomentCache,
}

impl RMSprop {
    /// `rho` must lie in `[0, 1)`. `learning_rate` and `epsilon` must be positive.
    pub fn new(learning_rate: f32, rho: f32, epsilon: f32) -> Result<Self, ModelError> {
        validate_learning_rate(learning_rate)?;
        validate_decay_rate(rho, "rho")?;
        validate_epsilon(epsilon)?;

        Ok(Self {
            learning_rate,
            rho,
            epsilon,
            cache: MomentCache::default(),
        })
    }
}

impl Optimizer for RMSprop {
    fn step(
        &mut self,
        params: &mut ParameterStore,
        learnables: &[ParamId],
    ) -> Result<(), ModelError> {
        let (lr, rho, epsilon) = (self.learning_rate, self.rho, self.epsilon);
        for &id in learnables {
            let param = params.get_mut(id)?;
            validate_gradient(param)?;
            let (value, grad) = param.value_and_grad_mut();
            let cache = self.cache.get_or_init(id, grad);
            zip_update_with_moment(value, cache, grad, |w, c, g| {
                let g = clip(g);
                *c = rho * *c + (1.0 - rho) * g * g;
                *w -= lr * g / (c.sqrt() + epsilon);
            });
            validate_updated_value(param)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "RMSprop"
    }
}
