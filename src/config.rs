//! Serde-backed configuration for model construction, training and generation.

use crate::error::ModelError;
use crate::neural_network::optimizer::{AdaGrad, Adam, RMSprop, SGD};
use crate::traits::Optimizer;
use serde::{Deserialize, Serialize};
use serde_json::from_reader;

fn default_stddev() -> f32 {
    0.08
}

fn default_embedding_size() -> usize {
    32
}

fn default_hidden_sizes() -> Vec<usize> {
    vec![64, 64]
}

fn default_steps() -> usize {
    4
}

fn default_iterations() -> usize {
    1
}

fn default_temperature() -> f64 {
    1.0
}

fn default_max_len() -> usize {
    100
}

/// Architecture and initialization of the model.
///
/// # Fields
///
/// - `embedding_size` - Length of the embedded input fed to the first layer
/// - `hidden_sizes` - Units per layer, bottom layer first
/// - `stddev` - Standard deviation of the Gaussian weight initialization
/// - `seed` - Seed for weight initialization. `None` seeds from the operating system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_embedding_size")]
    pub embedding_size: usize,
    #[serde(default = "default_hidden_sizes")]
    pub hidden_sizes: Vec<usize>,
    #[serde(default = "default_stddev")]
    pub stddev: f32,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            embedding_size: default_embedding_size(),
            hidden_sizes: default_hidden_sizes(),
            stddev: default_stddev(),
            seed: None,
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.embedding_size == 0 {
            return Err(ModelError::InputValidationError(
                "embedding_size must be greater than 0".to_string(),
            ));
        }
        if self.hidden_sizes.is_empty() || self.hidden_sizes.contains(&0) {
            return Err(ModelError::InputValidationError(format!(
                "hidden_sizes must be non-empty with every size greater than 0, got {:?}",
                self.hidden_sizes
            )));
        }
        if !(self.stddev > 0.0 && self.stddev.is_finite()) {
            return Err(ModelError::InputValidationError(format!(
                "stddev must be positive and finite, got {}",
                self.stddev
            )));
        }
        Ok(())
    }
}

/// Optimizer selection and hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptimizerConfig {
    Sgd {
        learning_rate: f32,
    },
    Adam {
        learning_rate: f32,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
    },
    RmsProp {
        learning_rate: f32,
        rho: f32,
        epsilon: f32,
    },
    AdaGrad {
        learning_rate: f32,
        epsilon: f32,
    },
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig::Adam {
            learning_rate: 0.01,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

impl OptimizerConfig {
    /// Builds the configured optimizer
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If a hyperparameter is out of range
    pub fn build(&self) -> Result<Box<dyn Optimizer>, ModelError> {
        Ok(match *self {
            OptimizerConfig::Sgd { learning_rate } => Box::new(SGD::new(learning_rate)?),
            OptimizerConfig::Adam {
                learning_rate,
                beta1,
                beta2,
                epsilon,
            } => Box::new(Adam::new(learning_rate, beta1, beta2, epsilon)?),
            OptimizerConfig::RmsProp {
                learning_rate,
                rho,
                epsilon,
            } => Box::new(RMSprop::new(learning_rate, rho, epsilon)?),
            OptimizerConfig::AdaGrad {
                learning_rate,
                epsilon,
            } => Box::new(AdaGrad::new(learning_rate, epsilon)?),
        })
    }
}

/// Truncated BPTT window and pass count.
///
/// # Fields
///
/// - `steps` - Window length. A window covers `steps - 1` (input, target) pairs
/// - `iterations` - Full passes over each training sequence
/// - `optimizer` - Update rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_steps")]
    pub steps: usize,
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            iterations: default_iterations(),
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.steps < 2 {
            return Err(ModelError::InputValidationError(format!(
                "steps must be at least 2, got {}",
                self.steps
            )));
        }
        if self.iterations == 0 {
            return Err(ModelError::InputValidationError(
                "iterations must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Decoding parameters.
///
/// # Fields
///
/// - `temperature` - Sampling temperature. Below 1 sharpens the distribution, above 1 flattens it
/// - `max_len` - Maximum number of emitted symbols
/// - `seed` - Seed for the sampling generator used by the CLI. `None` seeds from the operating system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_len")]
    pub max_len: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_len: default_max_len(),
            seed: None,
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), ModelError> {
        if !(self.temperature > 0.0 && self.temperature.is_finite()) {
            return Err(ModelError::InputValidationError(format!(
                "temperature must be positive and finite, got {}",
                self.temperature
            )));
        }
        Ok(())
    }
}

/// Complete run configuration as read from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl RunConfig {
    /// Reads and validates a configuration file
    ///
    /// # Errors
    ///
    /// - `ModelError::Io` - If the file cannot be opened
    /// - `ModelError::Json` - If the content is not a valid configuration
    /// - `ModelError::InputValidationError` - If a value is out of range
    pub fn from_path(path: &str) -> Result<Self, ModelError> {
        let reader = ModelError::load_in_buf_reader(path)?;
        let config: RunConfig = from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        self.model.validate()?;
        self.training.validate()?;
        self.generation.validate()
    }
}
