/// JSON persistence of model parameters
pub mod serialize_weight;

pub use serialize_weight::*;

use crate::config::ModelConfig;
use crate::error::ModelError;
use crate::graph::{ParamId, ParameterStore, Tensor};
use crate::neural_network::recurrent_layer::{GateWeights, gaussian_tensor, weight_distribution};
use ndarray::IxDyn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Input and hidden size of one layer.
///
/// `prev_size` is the embedding size for layer 0 and the previous layer's
/// hidden size otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSpec {
    pub prev_size: usize,
    pub hidden_size: usize,
}

/// Every learnable tensor of the model, together with the store that owns them.
///
/// # Fields
///
/// - `store` - Owning store of every tensor below
/// - `layers` - Gate weights per layer, bottom layer first
/// - `specs` - Sizes per layer, parallel to `layers`
/// - `whd` - Decoder matrix with shape (output_size, top hidden size)
/// - `bias_d` - Decoder bias with shape (output_size)
/// - `embedding` - Embedding matrix with shape (embedding_size, input_size)
#[derive(Debug, Clone)]
pub struct ModelParameters {
    store: ParameterStore,
    layers: Vec<GateWeights>,
    specs: Vec<LayerSpec>,
    whd: ParamId,
    bias_d: ParamId,
    embedding: ParamId,
    input_size: usize,
    embedding_size: usize,
    output_size: usize,
}

impl ModelParameters {
    /// Creates freshly initialized parameters.
    ///
    /// Weight matrices are drawn from a Gaussian with mean 0 and standard deviation
    /// `stddev`. Biases start at zero.
    ///
    /// # Parameters
    ///
    /// - `input_size` - Length of the one-hot input vectors
    /// - `embedding_size` - Length of the embedded input fed to layer 0
    /// - `output_size` - Length of the output distribution
    /// - `hidden_sizes` - Number of units per layer, bottom layer first
    /// - `stddev` - Standard deviation of the weight initialization
    /// - `rng` - Random source
    ///
    /// # Returns
    ///
    /// - `Result<Self, ModelError>` - Initialized parameters
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If a size is 0, `hidden_sizes` is empty or `stddev` is invalid
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        embedding_size: usize,
        output_size: usize,
        hidden_sizes: &[usize],
        stddev: f32,
        rng: &mut R,
    ) -> Result<Self, ModelError> {
        if hidden_sizes.is_empty() {
            return Err(ModelError::InputValidationError(
                "hidden_sizes must name at least one layer".to_string(),
            ));
        }
        for (name, value) in [
            ("input_size", input_size),
            ("embedding_size", embedding_size),
            ("output_size", output_size),
        ] {
            if value == 0 {
                return Err(ModelError::InputValidationError(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }

        let dist = weight_distribution(stddev)?;
        let mut store = ParameterStore::new();
        let mut layers = Vec::with_capacity(hidden_sizes.len());
        let mut specs = Vec::with_capacity(hidden_sizes.len());

        let mut prev_size = embedding_size;
        for (layer, &hidden_size) in hidden_sizes.iter().enumerate() {
            layers.push(GateWeights::new(
                &mut store,
                layer,
                prev_size,
                hidden_size,
                &dist,
                rng,
            )?);
            specs.push(LayerSpec {
                prev_size,
                hidden_size,
            });
            prev_size = hidden_size;
        }

        let whd = store.insert("whd", gaussian_tensor(&[output_size, prev_size], &dist, rng))?;
        let bias_d = store.insert("bias_d", Tensor::zeros(IxDyn(&[output_size])))?;
        let embedding = store.insert(
            "embedding",
            gaussian_tensor(&[embedding_size, input_size], &dist, rng),
        )?;

        Ok(Self {
            store,
            layers,
            specs,
            whd,
            bias_d,
            embedding,
            input_size,
            embedding_size,
            output_size,
        })
    }

    /// Creates parameters for a vocabulary of `vocab_size` symbols from a config.
    ///
    /// A configured seed gives reproducible weights. Without one the generator is
    /// seeded from the operating system.
    pub fn from_config(config: &ModelConfig, vocab_size: usize) -> Result<Self, ModelError> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(
            vocab_size,
            config.embedding_size,
            vocab_size,
            &config.hidden_sizes,
            config.stddev,
            &mut rng,
        )
    }

    /// Every learnable tensor in update order.
    ///
    /// Per layer `wix, wih, bias_i, wfx, wfh, bias_f, wox, woh, bias_o, wcx, wch, bias_c`,
    /// then `whd, bias_d, embedding`.
    pub fn learnables(&self) -> Vec<ParamId> {
        let mut out: Vec<ParamId> = self.layers.iter().flat_map(|l| l.learnables()).collect();
        out.extend([self.whd, self.bias_d, self.embedding]);
        out
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ParameterStore {
        &mut self.store
    }

    pub fn layers(&self) -> &[GateWeights] {
        &self.layers
    }

    pub fn specs(&self) -> &[LayerSpec] {
        &self.specs
    }

    pub fn whd(&self) -> ParamId {
        self.whd
    }

    pub fn bias_d(&self) -> ParamId {
        self.bias_d
    }

    pub fn embedding(&self) -> ParamId {
        self.embedding
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn embedding_size(&self) -> usize {
        self.embedding_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// Hidden size of every layer, bottom layer first
    pub fn hidden_sizes(&self) -> Vec<usize> {
        self.specs.iter().map(|s| s.hidden_size).collect()
    }
}
