use super::*;

/// How the decoder picks the next symbol
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SamplingPolicy {
    /// Draw from the distribution rescaled to `p^(1/temperature)`
    Stochastic { temperature: f64 },
    /// Take the most probable symbol
    Greedy,
}

/// Output of `CharRnn::predict`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub sampled: String,
    pub greedy: String,
}

/// Draws an index from `probs` after temperature scaling.
///
/// The distribution is rescaled to `p_i^(1/T)` and renormalized, which equals
/// `softmax(logits / T)`. Zero probabilities are never drawn.
///
/// # Errors
///
/// - `ModelError::InputValidationError` - If `temperature` is not positive and finite
///   or `probs` has no positive entry
pub fn sample<R: Rng + ?Sized>(
    probs: &Tensor,
    temperature: f64,
    rng: &mut R,
) -> Result<usize, ModelError> {
    if !(temperature > 0.0 && temperature.is_finite()) {
        return Err(ModelError::InputValidationError(format!(
            "temperature must be positive and finite, got {}",
            temperature
        )));
    }

    let logs: Vec<f64> = probs.iter().map(|&p| f64::from(p).ln()).collect();
    let max = logs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return Err(ModelError::InputValidationError(
            "cannot sample from a distribution without positive probabilities".to_string(),
        ));
    }

    let weights: Vec<f64> = logs.iter().map(|&l| ((l - max) / temperature).exp()).collect();
    let total: f64 = weights.iter().sum();
    let threshold = rng.random::<f64>() * total;

    let mut cumulative = 0.0;
    let mut last_positive = 0;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        cumulative += w;
        last_positive = i;
        if threshold < cumulative {
            return Ok(i);
        }
    }
    Ok(last_positive)
}

/// Index of the largest probability, the first one on ties
///
/// # Errors
///
/// - `ModelError::InputValidationError` - If `probs` is empty
pub fn argmax(probs: &Tensor) -> Result<usize, ModelError> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &p) in probs.iter().enumerate() {
        if best.map_or(true, |(_, b)| p > b) {
            best = Some((i, p));
        }
    }
    best.map(|(i, _)| i).ok_or_else(|| {
        ModelError::InputValidationError("cannot take the argmax of an empty vector".to_string())
    })
}

impl CharRnn {
    /// Generates symbols one at a time from a zero carry.
    ///
    /// Each step feeds the previously emitted symbol (an all-zero vector before
    /// the first one), selects the next symbol by `policy` and carries the new
    /// state forward. Generation stops at END or once `max_len` symbols have
    /// been emitted. END is never part of the output.
    ///
    /// # Errors
    ///
    /// - `ModelError::InvalidMode` - If `mode_inference` has not been called
    /// - `ModelError::Execution` - If a node fails during a run
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        policy: SamplingPolicy,
        max_len: usize,
        rng: &mut R,
    ) -> Result<String, ModelError> {
        let window = self.inference.as_mut().ok_or_else(|| {
            ModelError::InvalidMode("call mode_inference before generating".to_string())
        })?;
        window.reset_state()?;
        window.reset_machine();

        let end = self.vocabulary.end_index();
        let mut output = String::new();
        let mut emitted = 0;
        let mut previous = None;

        while emitted < max_len {
            window.set_input(0, previous)?;
            window.run(&mut self.model)?;

            let probs = window.probs(0)?;
            let next = match policy {
                SamplingPolicy::Stochastic { temperature } => sample(probs, temperature, rng)?,
                SamplingPolicy::Greedy => argmax(probs)?,
            };
            if next == end {
                break;
            }
            let symbol = self.vocabulary.symbol(next).ok_or_else(|| {
                ModelError::InputValidationError(format!(
                    "selected index {} is outside the vocabulary",
                    next
                ))
            })?;
            output.push(symbol);
            emitted += 1;
            previous = Some(next);

            window.feedback(0)?;
            window.reset_machine();
        }
        window.reset_machine();

        info!(?policy, length = emitted, "generation finished");
        Ok(output)
    }

    /// Generates once with temperature sampling and once greedily
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If the configuration is invalid
    /// - Any error of `generate`
    pub fn predict<R: Rng + ?Sized>(
        &mut self,
        config: &GenerationConfig,
        rng: &mut R,
    ) -> Result<Prediction, ModelError> {
        config.validate()?;
        let sampled = self.generate(
            SamplingPolicy::Stochastic {
                temperature: config.temperature,
            },
            config.max_len,
            rng,
        )?;
        let greedy = self.generate(SamplingPolicy::Greedy, config.max_len, rng)?;
        Ok(Prediction { sampled, greedy })
    }
}
