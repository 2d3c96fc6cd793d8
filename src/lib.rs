/// Module `error` defines the crate-wide `ModelError` type.
///
/// Every fallible operation returns `Result<T, ModelError>`. Execution failures
/// carry the implicated graph node and a bounded dependency trace.
pub mod error;

/// Module `config` provides serde-backed configuration for model construction,
/// training and generation, readable from JSON files.
///
/// # Example
/// ```rust
/// use rustyrnn::config::RunConfig;
///
/// let config = RunConfig::default();
/// assert_eq!(config.training.steps, 4);
/// assert_eq!(config.generation.max_len, 100);
/// ```
pub mod config;

/// Module `vocabulary` maps characters to one-hot indices, with a reserved END symbol.
pub mod vocabulary;

/// Module `graph` is a small differentiable computation engine.
///
/// It is made of four parts:
///
/// - `ExprGraph` - A static, arena-indexed dataflow graph built once per topology
/// - `ParameterStore` - Owner of every learnable tensor and its gradient
/// - `SlotStore` - Owner of caller-written buffers such as one-hot inputs and carry state
/// - `TapeMachine` - Executes a graph forward, and for gradient plans backward, then is
///   reset and run again without rebuilding
///
/// # Supported operations
/// - Matrix-vector product, elementwise addition and multiplication
/// - Sigmoid, tanh, negation, natural and base-2 logarithm
/// - Softmax over a vector, vector dot product
pub mod graph;

/// Module `neural_network` holds the character-level recurrent language model.
///
/// # Core Components
///
/// ## Recurrent layers
/// - **GateWeights**: the twelve learnable tensors of one LSTM layer
/// - **LstmCell**: one LSTM timestep wired into a graph
/// - **LstmStack**: layers of cells, the first one fed by the embedded input
///
/// ## Model
/// - **ModelParameters**: every learnable tensor, with Gaussian initialization and JSON persistence
/// - **CharRnn**: truncated-BPTT training with `learn`, sampled and greedy generation with `predict`
///
/// ## Optimizers
/// - **SGD**, **Adam**, **RMSprop**, **AdaGrad**
///
/// # Example
/// ```rust
/// use rustyrnn::prelude::*;
///
/// let text = "hello";
/// let vocabulary = Vocabulary::from_text(text);
/// let config = ModelConfig {
///     embedding_size: 4,
///     hidden_sizes: vec![8],
///     seed: Some(42),
///     ..ModelConfig::default()
/// };
/// let mut rnn = CharRnn::from_config(&config, vocabulary).unwrap();
/// rnn.mode_learn(4).unwrap();
///
/// let mut optimizer = Adam::new(0.01, 0.9, 0.999, 1e-8).unwrap();
/// let history = rnn
///     .learn(&Vocabulary::sequence_with_end(text), 2, &mut optimizer)
///     .unwrap();
/// assert_eq!(history.cost.len(), 2 * 3);
/// ```
pub mod neural_network;

/// Module `traits` defines the `Optimizer` trait implemented by every update rule.
pub mod traits;

/// A convenience module that re-exports the most commonly used types.
///
/// # Example
/// ```rust
/// use rustyrnn::prelude::*;
///
/// let vocabulary = Vocabulary::new(&['x', 'y']).unwrap();
/// assert_eq!(vocabulary.len(), 3);
/// ```
pub mod prelude;
