use super::*;

/// Carry state of every layer, held in slot buffers.
///
/// The buffers feed step 0 of a window. They are written only by value copies
/// from computed nodes, so they never alias the machine's values.
///
/// # Fields
///
/// - `hiddens` - Slot of the carried hidden state per layer, named `prevHidden_<layer>`
/// - `cells` - Slot of the carried cell state per layer, named `prevCell_<layer>`
#[derive(Debug, Clone)]
pub struct CarryState {
    hiddens: Vec<SlotId>,
    cells: Vec<SlotId>,
}

impl CarryState {
    /// Allocates zeroed carry buffers for layers of the given hidden sizes
    pub fn new(slots: &mut SlotStore, hidden_sizes: &[usize]) -> Self {
        let hiddens = hidden_sizes
            .iter()
            .enumerate()
            .map(|(layer, &size)| slots.alloc(&format!("prevHidden_{}", layer), &[size]))
            .collect();
        let cells = hidden_sizes
            .iter()
            .enumerate()
            .map(|(layer, &size)| slots.alloc(&format!("prevCell_{}", layer), &[size]))
            .collect();
        Self { hiddens, cells }
    }

    pub fn depth(&self) -> usize {
        self.hiddens.len()
    }

    /// Adds one slot node per carry buffer and returns them as the state before step 0
    pub fn bind(
        &self,
        graph: &mut ExprGraph,
        slots: &SlotStore,
    ) -> Result<Vec<LayerState>, ModelError> {
        self.hiddens
            .iter()
            .zip(&self.cells)
            .map(|(&hidden, &cell)| {
                Ok(LayerState {
                    hidden: graph.slot(slots, hidden)?,
                    cell: graph.slot(slots, cell)?,
                })
            })
            .collect()
    }

    /// Zeroes every carry buffer
    pub fn reset(&self, slots: &mut SlotStore) -> Result<(), ModelError> {
        for &id in self.hiddens.iter().chain(&self.cells) {
            slots.zero(id)?;
        }
        Ok(())
    }

    /// Copies the computed values of `states` into the carry buffers.
    ///
    /// # Errors
    ///
    /// - `ModelError::InvalidMode` - If the machine holds no value for a state node
    /// - `ModelError::InputValidationError` - If a state does not match its buffer's shape
    pub fn feedback(
        &self,
        machine: &TapeMachine,
        slots: &mut SlotStore,
        states: &[LayerState],
    ) -> Result<(), ModelError> {
        if states.len() != self.depth() {
            return Err(ModelError::InputValidationError(format!(
                "carry holds {} layers but {} states were given",
                self.depth(),
                states.len()
            )));
        }
        for (layer, state) in states.iter().enumerate() {
            let hidden = computed(machine, state.hidden)?;
            slots.copy_from(self.hiddens[layer], hidden)?;
            let cell = computed(machine, state.cell)?;
            slots.copy_from(self.cells[layer], cell)?;
        }
        Ok(())
    }

    /// Carried hidden state of `layer`
    pub fn hidden<'a>(&self, slots: &'a SlotStore, layer: usize) -> Result<&'a Tensor, ModelError> {
        let id = self.hiddens.get(layer).ok_or_else(|| layer_out_of_range(layer))?;
        slots.get(*id)
    }

    /// Carried cell state of `layer`
    pub fn cell<'a>(&self, slots: &'a SlotStore, layer: usize) -> Result<&'a Tensor, ModelError> {
        let id = self.cells.get(layer).ok_or_else(|| layer_out_of_range(layer))?;
        slots.get(*id)
    }
}

fn computed(machine: &TapeMachine, node: NodeId) -> Result<&Tensor, ModelError> {
    machine.value(node).ok_or_else(|| {
        ModelError::InvalidMode(format!(
            "node {} has no computed value; run the window before feeding its state back",
            node.index()
        ))
    })
}

fn layer_out_of_range(layer: usize) -> ModelError {
    ModelError::InputValidationError(format!("layer {} is out of range", layer))
}
