use super::*;

/// Per-window records of a `learn` call, in window order
///
/// # Fields
///
/// - `cost` - Total cross-entropy of each window
/// - `perplexity` - `2^(sum of -log2 p / (n - 1))` of each window, where `n` is the sequence length
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingHistory {
    pub cost: Vec<f64>,
    pub perplexity: Vec<f64>,
}

impl TrainingHistory {
    pub fn len(&self) -> usize {
        self.cost.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cost.is_empty()
    }
}

impl CharRnn {
    /// Trains on one sequence with truncated backpropagation through time.
    ///
    /// A window of `steps - 1` symbol pairs slides over `sequence` with stride 1.
    /// Every window runs forward and backward once and is followed by one
    /// optimizer step. The state after the window's first step is carried into
    /// the next window. Each of the `iterations` passes starts from a zero carry.
    ///
    /// # Parameters
    ///
    /// - `sequence` - Symbols to train on, usually ending with END
    /// - `iterations` - Number of full passes over `sequence`
    /// - `optimizer` - Update rule applied after every window
    ///
    /// # Returns
    ///
    /// - `Ok(TrainingHistory)` - One cost and perplexity entry per window per pass
    /// - `Err(ModelError::InvalidMode)` - If `mode_learn` has not been called
    /// - `Err(ModelError::InputValidationError)` - If `sequence` holds a symbol outside the vocabulary
    /// - `Err(ModelError::Execution)` - If a node fails during a run
    /// - `Err(ModelError::Optimizer)` - If an update step fails
    pub fn learn<O: Optimizer + ?Sized>(
        &mut self,
        sequence: &[char],
        iterations: usize,
        optimizer: &mut O,
    ) -> Result<TrainingHistory, ModelError> {
        let window = self.learning.as_mut().ok_or_else(|| {
            ModelError::InvalidMode("call mode_learn before learn".to_string())
        })?;
        let indices = self.vocabulary.encode(sequence)?;

        let mut history = TrainingHistory::default();
        let steps = window.steps();
        let n = indices.len();
        if n < steps {
            warn!(
                length = n,
                steps, "sequence is shorter than the window, nothing to learn"
            );
            return Ok(history);
        }

        let pairs = steps - 1;
        let windows = n - steps + 1;
        let normalizer = (n - 1) as f64;
        let learnables = self.model.learnables();

        for pass in 0..iterations {
            window.reset_state()?;
            window.reset_machine();
            let mut pass_cost = 0.0;

            for offset in 0..windows {
                for j in 0..pairs {
                    window.set_pair(j, indices[offset + j], indices[offset + j + 1])?;
                }

                window.run(&mut self.model)?;
                optimizer.step(self.model.store_mut(), &learnables)?;

                let cost = f64::from(window.cost_value()?);
                let perplexity = 2f64.powf(f64::from(window.perplexity_value()?) / normalizer);
                debug!(pass, offset, cost, perplexity, "window trained");
                history.cost.push(cost);
                history.perplexity.push(perplexity);
                pass_cost += cost;

                window.feedback(0)?;
                window.reset_machine();
            }

            info!(
                pass,
                windows,
                cost = pass_cost,
                optimizer = optimizer.name(),
                "training pass finished"
            );
        }

        Ok(history)
    }
}
