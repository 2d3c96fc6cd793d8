use super::*;

/// Nodes produced by one application of an LSTM cell.
///
/// # Fields
///
/// - `hidden` - New hidden state `h = o ⊙ tanh(c)`
/// - `cell` - New cell state `c = f ⊙ c_prev + i ⊙ g`
/// - `input_gate` - Input gate activation `i`
/// - `forget_gate` - Forget gate activation `f`
/// - `output_gate` - Output gate activation `o`
/// - `cell_write` - Candidate cell values `g`
#[derive(Debug, Clone, Copy)]
pub struct CellOutput {
    pub hidden: NodeId,
    pub cell: NodeId,
    pub input_gate: NodeId,
    pub forget_gate: NodeId,
    pub output_gate: NodeId,
    pub cell_write: NodeId,
}

/// Long Short-Term Memory cell bound to one expression graph.
///
/// The cell holds graph handles only. Each call to `fwd` appends the nodes of one
/// timestep, reading the same parameter nodes as every other timestep.
#[derive(Debug, Clone)]
pub struct LstmCell {
    input_gate: Gate,
    forget_gate: Gate,
    output_gate: Gate,
    cell_gate: Gate,
    prev_size: usize,
    hidden_size: usize,
}

impl LstmCell {
    /// Binds the gates of one layer into `graph`.
    ///
    /// # Parameters
    ///
    /// - `graph` - Graph receiving the parameter nodes
    /// - `store` - Store holding the layer's tensors
    /// - `weights` - Handles of the layer's twelve tensors
    /// - `prev_size` - Length of the layer input
    /// - `hidden_size` - Number of units
    pub fn bind(
        graph: &mut ExprGraph,
        store: &ParameterStore,
        weights: &GateWeights,
        prev_size: usize,
        hidden_size: usize,
    ) -> Result<Self, ModelError> {
        validate_dimension_greater_than_zero(prev_size, "prev_size")?;
        validate_dimension_greater_than_zero(hidden_size, "hidden_size")?;

        Ok(Self {
            input_gate: weights.input.bind(graph, store)?,
            forget_gate: weights.forget.bind(graph, store)?,
            output_gate: weights.output.bind(graph, store)?,
            cell_gate: weights.cell.bind(graph, store)?,
            prev_size,
            hidden_size,
        })
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    pub fn prev_size(&self) -> usize {
        self.prev_size
    }

    /// Appends one timestep to the graph.
    ///
    /// `h_prev` and `c_prev` are only read. The returned hidden and cell nodes are new.
    ///
    /// # Errors
    ///
    /// - `ModelError::GraphConstruction` - If `x`, `h_prev` or `c_prev` has the wrong length
    pub fn fwd(
        &self,
        graph: &mut ExprGraph,
        x: NodeId,
        h_prev: NodeId,
        c_prev: NodeId,
    ) -> Result<CellOutput, ModelError> {
        validate_vector_node(graph, x, self.prev_size, "cell input")?;
        validate_vector_node(graph, h_prev, self.hidden_size, "previous hidden state")?;
        validate_vector_node(graph, c_prev, self.hidden_size, "previous cell state")?;

        let i_pre = self.input_gate.compute_gate_value(graph, x, h_prev)?;
        let input_gate = graph.sigmoid(i_pre)?;
        let f_pre = self.forget_gate.compute_gate_value(graph, x, h_prev)?;
        let forget_gate = graph.sigmoid(f_pre)?;
        let o_pre = self.output_gate.compute_gate_value(graph, x, h_prev)?;
        let output_gate = graph.sigmoid(o_pre)?;
        let g_pre = self.cell_gate.compute_gate_value(graph, x, h_prev)?;
        let cell_write = graph.tanh(g_pre)?;

        let retained = graph.hadamard_prod(forget_gate, c_prev)?;
        let written = graph.hadamard_prod(input_gate, cell_write)?;
        let cell = graph.add(retained, written)?;

        let squashed = graph.tanh(cell)?;
        let hidden = graph.hadamard_prod(output_gate, squashed)?;

        Ok(CellOutput {
            hidden,
            cell,
            input_gate,
            forget_gate,
            output_gate,
            cell_write,
        })
    }
}
