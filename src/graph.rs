/// Builder for the static dataflow graph
pub mod expr_graph;
/// Shape validation used while wiring graph nodes
mod input_validation_function;
/// Node identifiers and operation kinds
pub mod node;
/// Arena of learnable tensors and their gradients
pub mod parameter_store;
/// Arena of externally written input and state buffers
pub mod slot_store;
/// Execution plan and value arena for running a graph
pub mod tape_machine;

pub use expr_graph::ExprGraph;
pub use node::{Node, NodeId, Op};
pub use parameter_store::{ParamId, Parameter, ParameterStore};
pub use slot_store::{SlotId, SlotStore};
pub use tape_machine::{ExecutionPlan, TapeMachine};

use crate::error::ModelError;
use input_validation_function::*;
use ndarray::{ArrayD, ArrayViewD, Axis, Ix1, Ix2, IxDyn};

/// Type alias for n-dimensional arrays used as tensor values throughout the graph
pub type Tensor = ArrayD<f32>;

/// Creates a zero-dimensional tensor holding `value`
#[inline]
pub fn scalar_tensor(value: f32) -> Tensor {
    ArrayD::from_elem(IxDyn(&[]), value)
}

/// Reads the single element of a zero-dimensional tensor
#[inline]
fn scalar_of(tensor: &ArrayViewD<f32>) -> f32 {
    tensor.iter().next().copied().unwrap_or(0.0)
}
