pub use crate::config::{GenerationConfig, ModelConfig, OptimizerConfig, RunConfig, TrainingConfig};
pub use crate::error::ModelError;
pub use crate::graph::{
    ExecutionPlan, ExprGraph, NodeId, ParamId, ParameterStore, SlotId, SlotStore, TapeMachine,
    Tensor,
};
pub use crate::neural_network::char_rnn::{
    CarryState, CharRnn, Prediction, SamplingPolicy, TrainingHistory, UnrolledWindow, argmax,
    sample,
};
pub use crate::neural_network::model_parameters::{LayerSpec, ModelParameters};
pub use crate::neural_network::optimizer::{AdaGrad, Adam, RMSprop, SGD};
pub use crate::neural_network::recurrent_layer::{
    CellOutput, GateParams, GateWeights, LayerState, LstmCell, LstmStack, StackOutput,
};
pub use crate::traits::Optimizer;
pub use crate::vocabulary::{END, Vocabulary};
