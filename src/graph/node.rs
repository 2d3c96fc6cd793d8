use super::*;

/// Index of a node inside an `ExprGraph`
///
/// Nodes are appended in dependency order, so every operand of a node has a
/// smaller index than the node itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the node in the graph arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// Operation computed by a graph node
///
/// # Variants
///
/// - `Parameter` - Reads a learnable tensor from the `ParameterStore`
/// - `Slot` - Reads a tensor written by the caller into the `SlotStore`
/// - `MatVec` - Matrix `[m, k]` times vector `[k]`, producing `[m]`
/// - `Add` - Elementwise sum of two tensors of equal shape
/// - `HadamardProd` - Elementwise product of two tensors of equal shape
/// - `Sigmoid` - Elementwise logistic function
/// - `Tanh` - Elementwise hyperbolic tangent
/// - `Neg` - Elementwise negation
/// - `Log` - Elementwise natural logarithm
/// - `Log2` - Elementwise base-2 logarithm
/// - `SoftMax` - Normalized exponential over a vector
/// - `Dot` - Inner product of two vectors, producing a scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Parameter(ParamId),
    Slot(SlotId),
    MatVec { matrix: NodeId, vector: NodeId },
    Add(NodeId, NodeId),
    HadamardProd(NodeId, NodeId),
    Sigmoid(NodeId),
    Tanh(NodeId),
    Neg(NodeId),
    Log(NodeId),
    Log2(NodeId),
    SoftMax(NodeId),
    Dot(NodeId, NodeId),
}

impl Op {
    /// Operand nodes of this operation, in argument order
    pub fn inputs(&self) -> Vec<NodeId> {
        match *self {
            Op::Parameter(_) | Op::Slot(_) => Vec::new(),
            Op::MatVec { matrix, vector } => vec![matrix, vector],
            Op::Add(a, b) | Op::HadamardProd(a, b) | Op::Dot(a, b) => vec![a, b],
            Op::Sigmoid(a)
            | Op::Tanh(a)
            | Op::Neg(a)
            | Op::Log(a)
            | Op::Log2(a)
            | Op::SoftMax(a) => vec![a],
        }
    }

    /// Short name of the operation used in diagnostics
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Op::Parameter(_) => "param",
            Op::Slot(_) => "slot",
            Op::MatVec { .. } => "matvec",
            Op::Add(..) => "add",
            Op::HadamardProd(..) => "hadamard",
            Op::Sigmoid(_) => "sigmoid",
            Op::Tanh(_) => "tanh",
            Op::Neg(_) => "neg",
            Op::Log(_) => "log",
            Op::Log2(_) => "log2",
            Op::SoftMax(_) => "softmax",
            Op::Dot(..) => "dot",
        }
    }

    /// Whether the node's value is read from a store instead of being computed
    pub fn is_leaf(&self) -> bool {
        matches!(self, Op::Parameter(_) | Op::Slot(_))
    }
}

/// A single node of the dataflow graph
///
/// # Fields
///
/// - `op` - The operation producing this node's value
/// - `shape` - Shape of the value, fixed when the node is created
/// - `name` - Optional human readable name used in diagnostics
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) op: Op,
    pub(crate) shape: Vec<usize>,
    pub(crate) name: Option<String>,
}

impl Node {
    pub fn op(&self) -> &Op {
        &self.op
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
