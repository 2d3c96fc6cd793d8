/// Autoregressive generation
pub mod decoder;
/// Carry state between windows and generation steps
pub mod state_bridge;
/// Truncated BPTT training loop
pub mod training;
/// Unrolled windows of model timesteps
pub mod unroller;

pub use decoder::*;
pub use state_bridge::*;
pub use training::*;
pub use unroller::*;

use crate::config::{GenerationConfig, ModelConfig};
use crate::error::ModelError;
use crate::graph::{
    ExecutionPlan, ExprGraph, NodeId, SlotId, SlotStore, TapeMachine, Tensor,
};
use crate::neural_network::model_parameters::ModelParameters;
use crate::neural_network::recurrent_layer::{LayerState, LstmStack};
use crate::traits::Optimizer;
use crate::vocabulary::Vocabulary;
use rand::Rng;
use tracing::{debug, info, warn};

/// Character-level language model built on stacked LSTM cells.
///
/// The model owns its parameters and vocabulary. `mode_learn` and
/// `mode_inference` build the unrolled windows used by `learn` and `predict`;
/// both windows read the same parameter tensors.
///
/// # Example
/// ```rust
/// use rustyrnn::prelude::*;
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let vocabulary = Vocabulary::new(&['a', 'b']).unwrap();
/// let mut rng = StdRng::seed_from_u64(7);
/// let params = ModelParameters::new(vocabulary.len(), 3, vocabulary.len(), &[4], 0.08, &mut rng).unwrap();
/// let mut rnn = CharRnn::new(params, vocabulary).unwrap();
///
/// rnn.mode_learn(3).unwrap();
/// rnn.mode_inference().unwrap();
///
/// let mut optimizer = SGD::new(0.1).unwrap();
/// let sequence = Vocabulary::sequence_with_end("abab");
/// let history = rnn.learn(&sequence, 1, &mut optimizer).unwrap();
/// assert_eq!(history.cost.len(), 3);
///
/// let config = GenerationConfig { max_len: 5, ..GenerationConfig::default() };
/// let prediction = rnn.predict(&config, &mut rng).unwrap();
/// assert!(prediction.greedy.chars().count() <= 5);
/// ```
pub struct CharRnn {
    model: ModelParameters,
    vocabulary: Vocabulary,
    learning: Option<UnrolledWindow>,
    inference: Option<UnrolledWindow>,
}

impl CharRnn {
    /// Creates a model over `vocabulary`.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If the parameters' input or output size differs from the vocabulary size
    pub fn new(model: ModelParameters, vocabulary: Vocabulary) -> Result<Self, ModelError> {
        if model.input_size() != vocabulary.len() || model.output_size() != vocabulary.len() {
            return Err(ModelError::InputValidationError(format!(
                "parameters map {} inputs to {} outputs but the vocabulary has {} symbols",
                model.input_size(),
                model.output_size(),
                vocabulary.len()
            )));
        }
        Ok(Self {
            model,
            vocabulary,
            learning: None,
            inference: None,
        })
    }

    /// Creates freshly initialized parameters for `vocabulary` and wraps them
    pub fn from_config(config: &ModelConfig, vocabulary: Vocabulary) -> Result<Self, ModelError> {
        let model = ModelParameters::from_config(config, vocabulary.len())?;
        Self::new(model, vocabulary)
    }

    /// Builds the training window of `steps - 1` (input, target) pairs
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `steps` is less than 2
    pub fn mode_learn(&mut self, steps: usize) -> Result<(), ModelError> {
        let window = UnrolledWindow::for_learning(&self.model, steps)?;
        info!(
            steps,
            nodes = window.graph().len(),
            parameters = self.model.store().scalar_count(),
            "built training window"
        );
        self.learning = Some(window);
        Ok(())
    }

    /// Builds the single-step generation window
    pub fn mode_inference(&mut self) -> Result<(), ModelError> {
        let window = UnrolledWindow::for_inference(&self.model)?;
        info!(nodes = window.graph().len(), "built inference window");
        self.inference = Some(window);
        Ok(())
    }

    pub fn model(&self) -> &ModelParameters {
        &self.model
    }

    /// Mutable access to the parameters, e.g. to load saved weights.
    ///
    /// Built windows stay valid as long as tensor shapes are kept.
    pub fn model_mut(&mut self) -> &mut ModelParameters {
        &mut self.model
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Window length of the training window, if built
    pub fn steps(&self) -> Option<usize> {
        self.learning.as_ref().map(UnrolledWindow::steps)
    }

    pub fn learning_window(&self) -> Option<&UnrolledWindow> {
        self.learning.as_ref()
    }

    pub fn inference_window(&self) -> Option<&UnrolledWindow> {
        self.inference.as_ref()
    }

    /// Zeroes the carry state of every built window
    pub fn reset(&mut self) -> Result<(), ModelError> {
        for window in self.learning.iter_mut().chain(self.inference.iter_mut()) {
            window.reset_state()?;
        }
        Ok(())
    }
}
