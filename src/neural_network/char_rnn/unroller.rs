use super::*;

/// Nodes computed by one timestep of an unrolled window
///
/// # Fields
///
/// - `states` - New state of every layer after the step
/// - `probs` - Output distribution over the vocabulary
#[derive(Debug, Clone)]
pub struct StepOutput {
    pub states: Vec<LayerState>,
    pub probs: NodeId,
}

/// A fixed number of model timesteps unrolled into one graph.
///
/// Built once per mode. Between runs only the slot buffers change: the one-hot
/// inputs and targets, and the carry state written by `feedback`.
///
/// # Fields
///
/// - `graph` - Unrolled computation
/// - `machine` - Execution plan and computed values
/// - `slots` - One-hot buffers and carry buffers
/// - `carry` - Carry buffers consumed by step 0
/// - `inputs` - One-hot input buffer per step
/// - `targets` - One-hot target buffer per step, empty without a loss
/// - `outputs` - Computed nodes per step
/// - `cost` - Sum of `-ln(p)·target` over the steps
/// - `perplexity` - Sum of `-log2(p)·target` over the steps
/// - `steps` - Window length the window was built for
pub struct UnrolledWindow {
    graph: ExprGraph,
    machine: TapeMachine,
    slots: SlotStore,
    carry: CarryState,
    inputs: Vec<SlotId>,
    targets: Vec<SlotId>,
    outputs: Vec<StepOutput>,
    cost: Option<NodeId>,
    perplexity: Option<NodeId>,
    steps: usize,
}

impl UnrolledWindow {
    /// Builds a training window of `steps - 1` (input, target) pairs with a gradient plan
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `steps` is less than 2
    /// - `ModelError::GraphConstruction` - If the parameters cannot be wired together
    pub fn for_learning(params: &ModelParameters, steps: usize) -> Result<Self, ModelError> {
        if steps < 2 {
            return Err(ModelError::InputValidationError(format!(
                "steps must be at least 2 so a window holds one (input, target) pair, got {}",
                steps
            )));
        }
        Self::build(params, steps - 1, true, steps)
    }

    /// Builds a single-step window with a forward-only plan
    pub fn for_inference(params: &ModelParameters) -> Result<Self, ModelError> {
        Self::build(params, 1, false, 1)
    }

    fn build(
        params: &ModelParameters,
        len: usize,
        with_loss: bool,
        steps: usize,
    ) -> Result<Self, ModelError> {
        let store = params.store();
        let mut slots = SlotStore::new();
        let carry = CarryState::new(&mut slots, &params.hidden_sizes());

        let mut graph = ExprGraph::new();
        let stack = LstmStack::bind(&mut graph, params)?;
        let embedding = graph.parameter(store, params.embedding())?;
        let whd = graph.parameter(store, params.whd())?;
        let bias_d = graph.parameter(store, params.bias_d())?;

        let mut prev = carry.bind(&mut graph, &slots)?;
        let mut inputs = Vec::with_capacity(len);
        let mut targets = Vec::with_capacity(if with_loss { len } else { 0 });
        let mut outputs = Vec::with_capacity(len);
        let mut cost: Option<NodeId> = None;
        let mut perplexity: Option<NodeId> = None;

        for t in 0..len {
            let input = slots.alloc(&format!("input_{}", t), &[params.input_size()]);
            let x = graph.slot(&slots, input)?;
            let embedded = graph.mat_vec(embedding, x)?;
            let out = stack.step(&mut graph, embedded, &prev)?;

            let projected = graph.mat_vec(whd, out.top_hidden)?;
            let logits = graph.add(projected, bias_d)?;
            let probs = graph.softmax(logits)?;
            graph.set_name(probs, &format!("probs_{}", t))?;

            if with_loss {
                let target = slots.alloc(&format!("target_{}", t), &[params.output_size()]);
                let y = graph.slot(&slots, target)?;

                let log_prob = graph.log(probs)?;
                let neg_log_prob = graph.neg(log_prob)?;
                let loss = graph.dot(neg_log_prob, y)?;
                cost = Some(match cost {
                    Some(total) => graph.add(total, loss)?,
                    None => loss,
                });

                let log2_prob = graph.log2(probs)?;
                let neg_log2_prob = graph.neg(log2_prob)?;
                let perp = graph.dot(neg_log2_prob, y)?;
                perplexity = Some(match perplexity {
                    Some(total) => graph.add(total, perp)?,
                    None => perp,
                });

                targets.push(target);
            }

            inputs.push(input);
            prev = out.states.clone();
            outputs.push(StepOutput {
                states: out.states,
                probs,
            });
        }

        let plan = match (cost, perplexity) {
            (Some(cost), Some(perplexity)) => {
                graph.set_name(cost, "cost")?;
                graph.set_name(perplexity, "perplexity")?;
                ExecutionPlan::with_gradients(&graph, cost, &params.learnables())?
            }
            _ => ExecutionPlan::forward_only(&graph),
        };
        let machine = TapeMachine::new(&graph, plan)?;

        Ok(Self {
            graph,
            machine,
            slots,
            carry,
            inputs,
            targets,
            outputs,
            cost,
            perplexity,
            steps,
        })
    }

    /// Window length the window was built for
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Number of unrolled timesteps
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn has_loss(&self) -> bool {
        self.cost.is_some()
    }

    pub fn graph(&self) -> &ExprGraph {
        &self.graph
    }

    pub fn machine(&self) -> &TapeMachine {
        &self.machine
    }

    pub fn slots(&self) -> &SlotStore {
        &self.slots
    }

    pub fn carry(&self) -> &CarryState {
        &self.carry
    }

    pub fn outputs(&self) -> &[StepOutput] {
        &self.outputs
    }

    /// Writes the one-hot input of step `t`. `None` writes an all-zero vector
    pub fn set_input(&mut self, t: usize, input: Option<usize>) -> Result<(), ModelError> {
        let slot = *self.inputs.get(t).ok_or_else(|| step_out_of_range(t))?;
        self.slots.set_one_hot(slot, input)
    }

    /// Writes the one-hot input and target of step `t`
    ///
    /// # Errors
    ///
    /// - `ModelError::InvalidMode` - If the window was built without a loss
    pub fn set_pair(&mut self, t: usize, input: usize, target: usize) -> Result<(), ModelError> {
        if self.targets.is_empty() {
            return Err(ModelError::InvalidMode(
                "targets can only be set on a training window".to_string(),
            ));
        }
        let slot = *self.targets.get(t).ok_or_else(|| step_out_of_range(t))?;
        self.set_input(t, Some(input))?;
        self.slots.set_one_hot(slot, Some(target))
    }

    /// Executes the window against the current parameter values.
    ///
    /// For a training window this also writes the gradients of the cost into
    /// `params`.
    pub fn run(&mut self, params: &mut ModelParameters) -> Result<(), ModelError> {
        self.machine
            .run_all(&self.graph, params.store_mut(), &self.slots)
    }

    /// Output distribution of step `t` from the last run
    pub fn probs(&self, t: usize) -> Result<&Tensor, ModelError> {
        let step = self.outputs.get(t).ok_or_else(|| step_out_of_range(t))?;
        self.machine.value(step.probs).ok_or_else(|| {
            ModelError::InvalidMode("run the window before reading its output".to_string())
        })
    }

    /// Total cross-entropy of the last run
    ///
    /// # Errors
    ///
    /// - `ModelError::InvalidMode` - If the window has no loss
    /// - `ModelError::Execution` - If the cost value is missing or not a scalar
    pub fn cost_value(&self) -> Result<f32, ModelError> {
        let cost = self
            .cost
            .ok_or_else(|| ModelError::InvalidMode("window has no cost".to_string()))?;
        self.machine.scalar(&self.graph, cost)
    }

    /// Total base-2 cross-entropy of the last run
    pub fn perplexity_value(&self) -> Result<f32, ModelError> {
        let perplexity = self
            .perplexity
            .ok_or_else(|| ModelError::InvalidMode("window has no perplexity".to_string()))?;
        self.machine.scalar(&self.graph, perplexity)
    }

    /// Copies the state computed at step `tap` into the carry buffers
    pub fn feedback(&mut self, tap: usize) -> Result<(), ModelError> {
        let step = self.outputs.get(tap).ok_or_else(|| step_out_of_range(tap))?;
        self.carry
            .feedback(&self.machine, &mut self.slots, &step.states)
    }

    /// Zeroes the carry state
    pub fn reset_state(&mut self) -> Result<(), ModelError> {
        self.carry.reset(&mut self.slots)
    }

    /// Drops computed values so the window can run again
    pub fn reset_machine(&mut self) {
        self.machine.reset();
    }
}

fn step_out_of_range(t: usize) -> ModelError {
    ModelError::InputValidationError(format!("timestep {} is out of range", t))
}
