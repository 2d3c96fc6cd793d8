use super::*;
use crate::neural_network::model_parameters::ModelParameters;

/// Hidden and cell nodes of one layer at one timestep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerState {
    pub hidden: NodeId,
    pub cell: NodeId,
}

/// Result of one `LstmStack::step`
///
/// # Fields
///
/// - `states` - New state of every layer, bottom layer first
/// - `top_hidden` - Hidden output of the last layer
#[derive(Debug, Clone)]
pub struct StackOutput {
    pub states: Vec<LayerState>,
    pub top_hidden: NodeId,
}

/// Stacked LSTM cells.
///
/// Layer 0 consumes the embedded input and layer k consumes the new hidden
/// output of layer k-1.
#[derive(Debug, Clone)]
pub struct LstmStack {
    cells: Vec<LstmCell>,
}

impl LstmStack {
    /// Binds every layer of `params` into `graph`
    pub fn bind(graph: &mut ExprGraph, params: &ModelParameters) -> Result<Self, ModelError> {
        let cells = params
            .layers()
            .iter()
            .zip(params.specs())
            .map(|(weights, spec)| {
                LstmCell::bind(
                    graph,
                    params.store(),
                    weights,
                    spec.prev_size,
                    spec.hidden_size,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        if cells.is_empty() {
            return Err(ModelError::GraphConstruction(
                "an LSTM stack needs at least one layer".to_string(),
            ));
        }
        Ok(Self { cells })
    }

    pub fn depth(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[LstmCell] {
        &self.cells
    }

    /// Appends one timestep of every layer to the graph.
    ///
    /// # Parameters
    ///
    /// - `graph` - Graph receiving the nodes
    /// - `embedded` - Embedded input symbol, a vector of the embedding size
    /// - `prev` - State of every layer after the previous timestep
    ///
    /// # Errors
    ///
    /// - `ModelError::GraphConstruction` - If `prev` does not hold one state per layer or a shape is off
    pub fn step(
        &self,
        graph: &mut ExprGraph,
        embedded: NodeId,
        prev: &[LayerState],
    ) -> Result<StackOutput, ModelError> {
        if prev.len() != self.cells.len() {
            return Err(ModelError::GraphConstruction(format!(
                "stack has {} layers but {} previous states were given",
                self.cells.len(),
                prev.len()
            )));
        }

        let mut states = Vec::with_capacity(self.cells.len());
        let mut input = embedded;
        for (cell, state) in self.cells.iter().zip(prev) {
            let out = cell.fwd(graph, input, state.hidden, state.cell)?;
            states.push(LayerState {
                hidden: out.hidden,
                cell: out.cell,
            });
            input = out.hidden;
        }

        Ok(StackOutput {
            states,
            top_hidden: input,
        })
    }
}
