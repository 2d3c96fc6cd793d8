use super::*;

/// Adam with bias-corrected moment estimates.
///
/// Each learnable keeps a running mean of its clipped gradient (`m`) and of the
/// squared gradient (`v`). The step divides the corrected mean by the root of the
/// corrected second moment.
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    /// Updates applied so far, used for the bias correction
    t: i32,
    m: MomentCache,
    v: MomentCache,
}

impl Adam {
    /// # Parameters
    ///
    /// - `learning_rate` - Scale of every update
    /// - `beta1` - Decay of the gradient mean, 0.9 in the default run configuration
    /// - `beta2` - Decay of the squared-gradient mean, 0.999 by default
    /// - `epsilon` - Added to the denominator, 1e-8 by default
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If a rate is outside its range
    pub fn new(learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Result<Self, ModelError> {
        validate_learning_rate(learning_rate)?;
        validate_decay_rate(beta1, "beta1")?;
        validate_decay_rate(beta2, "beta2")?;
        validate_epsilon(epsilon)?;

        Ok(Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            t: 0,
            m: MomentCache::default(),
            v: MomentCache::default(),
        })
    }

    /// Number of update steps applied so far
    pub fn timestep(&self) -> i32 {
        self.t
    }
}

impl Optimizer for Adam {
    fn step(
        &mut self,
        params: &mut ParameterStore,
        learnables: &[ParamId],
    ) -> Result<(), ModelError> {
        self.t = self.t.saturating_add(1);
        let (lr, beta1, beta2, epsilon) = (self.learning_rate, self.beta1, self.beta2, self.epsilon);
        let bias_correction1 = 1.0 - beta1.powi(self.t);
        let bias_correction2 = 1.0 - beta2.powi(self.t);

        for &id in learnables {
            let param = params.get_mut(id)?;
            validate_gradient(param)?;
            let (value, grad) = param.value_and_grad_mut();
            let m = self.m.get_or_init(id, grad);
            let v = self.v.get_or_init(id, grad);

            let update = |w: &mut f32, m: &mut f32, v: &mut f32, g: f32| {
                let g = clip(g);
                *m = beta1 * *m + (1.0 - beta1) * g;
                *v = beta2 * *v + (1.0 - beta2) * g * g;
                let m_hat = *m / bias_correction1;
                let v_hat = *v / bias_correction2;
                *w -= lr * m_hat / (v_hat.sqrt() + epsilon);
            };

            let zip = Zip::from(value).and(m).and(v).and(grad);
            if grad.len() >= PARALLEL_THRESHOLD {
                zip.par_for_each(|w, m, v, &g| update(w, m, v, g));
            } else {
                zip.for_each(|w, m, v, &g| update(w, m, v, g));
            }
            validate_updated_value(param)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "Adam"
    }
}
