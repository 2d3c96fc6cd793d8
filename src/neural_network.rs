/// Module that contains the character-level language model
pub mod char_rnn;
/// Module that contains the learnable tensors of the model
pub mod model_parameters;
/// Module that contains optimization algorithms for training
pub mod optimizer;
/// Module that contains the LSTM cell and stack
pub mod recurrent_layer;

pub use char_rnn::*;
pub use model_parameters::*;
pub use optimizer::*;
pub use recurrent_layer::*;

pub use crate::graph::Tensor;
pub use crate::traits::Optimizer;
