use super::*;

/// Learnable tensors of a single LSTM gate.
///
/// # Fields
///
/// - `kernel` - Input-to-hidden matrix with shape (hidden_size, prev_size)
/// - `recurrent_kernel` - Hidden-to-hidden matrix with shape (hidden_size, hidden_size)
/// - `bias` - Bias vector with shape (hidden_size)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateParams {
    pub kernel: ParamId,
    pub recurrent_kernel: ParamId,
    pub bias: ParamId,
}

impl GateParams {
    /// Registers the three tensors of one gate in `store`.
    ///
    /// Matrices are drawn from `dist` and the bias starts at zero. Tensors are named
    /// `w{tag}x_{layer}`, `w{tag}h_{layer}` and `bias_{tag}_{layer}`.
    ///
    /// # Parameters
    ///
    /// - `store` - Parameter store receiving the tensors
    /// - `tag` - One-letter gate tag (`i`, `f`, `o` or `c`)
    /// - `layer` - Layer index used in the tensor names
    /// - `prev_size` - Length of the gate's input vector
    /// - `hidden_size` - Number of units in the gate
    /// - `dist` - Distribution for the weight matrices
    /// - `rng` - Random source
    ///
    /// # Returns
    ///
    /// - `Result<Self, ModelError>` - Handles of the registered tensors
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `prev_size` or `hidden_size` is 0
    /// - `ModelError::GraphConstruction` - If a tensor with the same name is already registered
    pub fn new<R: Rng + ?Sized>(
        store: &mut ParameterStore,
        tag: char,
        layer: usize,
        prev_size: usize,
        hidden_size: usize,
        dist: &Normal<f32>,
        rng: &mut R,
    ) -> Result<Self, ModelError> {
        validate_dimension_greater_than_zero(prev_size, "prev_size")?;
        validate_dimension_greater_than_zero(hidden_size, "hidden_size")?;

        let kernel = store.insert(
            &format!("w{}x_{}", tag, layer),
            gaussian_tensor(&[hidden_size, prev_size], dist, rng),
        )?;
        let recurrent_kernel = store.insert(
            &format!("w{}h_{}", tag, layer),
            gaussian_tensor(&[hidden_size, hidden_size], dist, rng),
        )?;
        let bias = store.insert(
            &format!("bias_{}_{}", tag, layer),
            Tensor::zeros(IxDyn(&[hidden_size])),
        )?;

        Ok(Self {
            kernel,
            recurrent_kernel,
            bias,
        })
    }

    /// Tensors in update order: kernel, recurrent kernel, bias
    pub fn learnables(&self) -> [ParamId; 3] {
        [self.kernel, self.recurrent_kernel, self.bias]
    }

    /// Binds the gate to parameter nodes of `graph`
    pub fn bind(&self, graph: &mut ExprGraph, store: &ParameterStore) -> Result<Gate, ModelError> {
        Ok(Gate {
            kernel: graph.parameter(store, self.kernel)?,
            recurrent_kernel: graph.parameter(store, self.recurrent_kernel)?,
            bias: graph.parameter(store, self.bias)?,
        })
    }
}

/// A gate bound to the parameter nodes of one graph.
///
/// Binding the same `GateParams` twice into a graph yields the same nodes, so every
/// timestep reads the same tensors.
#[derive(Debug, Clone, Copy)]
pub struct Gate {
    kernel: NodeId,
    recurrent_kernel: NodeId,
    bias: NodeId,
}

impl Gate {
    /// Adds `kernel·x + recurrent_kernel·h + bias` to the graph and returns the pre-activation
    pub fn compute_gate_value(
        &self,
        graph: &mut ExprGraph,
        x: NodeId,
        h: NodeId,
    ) -> Result<NodeId, ModelError> {
        let wx = graph.mat_vec(self.kernel, x)?;
        let wh = graph.mat_vec(self.recurrent_kernel, h)?;
        let sum = graph.add(wx, wh)?;
        graph.add(sum, self.bias)
    }
}

/// The four gates of one LSTM layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateWeights {
    pub input: GateParams,
    pub forget: GateParams,
    pub output: GateParams,
    pub cell: GateParams,
}

impl GateWeights {
    /// Registers the twelve tensors of layer `layer`, gate by gate in the order i, f, o, c
    pub fn new<R: Rng + ?Sized>(
        store: &mut ParameterStore,
        layer: usize,
        prev_size: usize,
        hidden_size: usize,
        dist: &Normal<f32>,
        rng: &mut R,
    ) -> Result<Self, ModelError> {
        let mut gate =
            |tag| GateParams::new(store, tag, layer, prev_size, hidden_size, dist, &mut *rng);
        let input = gate('i')?;
        let forget = gate('f')?;
        let output = gate('o')?;
        let cell = gate('c')?;
        Ok(Self {
            input,
            forget,
            output,
            cell,
        })
    }

    /// All twelve tensors: `wix, wih, bias_i, wfx, wfh, bias_f, wox, woh, bias_o, wcx, wch, bias_c`
    pub fn learnables(&self) -> Vec<ParamId> {
        [self.input, self.forget, self.output, self.cell]
            .iter()
            .flat_map(|g| g.learnables())
            .collect()
    }
}
