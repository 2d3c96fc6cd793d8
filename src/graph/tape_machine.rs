use super::*;
use std::f32::consts::LN_2;
use tracing::error;

/// Depth of the dependency snapshot attached to execution errors
const TRACE_DEPTH: usize = 3;
/// Number of operands followed per node in the dependency snapshot
const TRACE_CHILDREN: usize = 3;

/// What a `TapeMachine` computes on every run
///
/// A forward-only plan evaluates every node. A gradient plan additionally runs
/// a reverse pass from the scalar `cost` node and writes the gradient of each
/// parameter in `wrt` into the `ParameterStore`.
///
/// # Fields
///
/// - `node_count` - Number of graph nodes the plan was built for
/// - `cost` - Scalar node differentiated by the reverse pass, if any
/// - `wrt` - Parameters receiving gradients
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    node_count: usize,
    cost: Option<NodeId>,
    wrt: Vec<ParamId>,
}

impl ExecutionPlan {
    pub fn forward_only(graph: &ExprGraph) -> Self {
        Self {
            node_count: graph.len(),
            cost: None,
            wrt: Vec::new(),
        }
    }

    /// Builds a plan that differentiates `cost` with respect to `wrt`
    ///
    /// # Errors
    ///
    /// - `ModelError::GraphConstruction` - If `cost` is not a scalar node of `graph`
    pub fn with_gradients(
        graph: &ExprGraph,
        cost: NodeId,
        wrt: &[ParamId],
    ) -> Result<Self, ModelError> {
        let node = graph.node(cost).ok_or_else(|| {
            ModelError::GraphConstruction(format!("unknown cost node {}", cost.index()))
        })?;
        if !node.shape().is_empty() {
            return Err(ModelError::GraphConstruction(format!(
                "gradients require a scalar cost, node {} has shape {:?}",
                graph.describe(cost),
                node.shape()
            )));
        }
        Ok(Self {
            node_count: graph.len(),
            cost: Some(cost),
            wrt: wrt.to_vec(),
        })
    }

    pub fn cost(&self) -> Option<NodeId> {
        self.cost
    }

    pub fn wrt(&self) -> &[ParamId] {
        &self.wrt
    }
}

/// Executes an `ExprGraph` according to an `ExecutionPlan`
///
/// The machine owns the computed value of every non-leaf node. Leaf values are
/// read in place from the `ParameterStore` and `SlotStore` on each run, so
/// updating a parameter or a slot between runs is visible to every node that
/// references it. After a run the machine must be `reset` before it can run
/// again; resetting drops computed values but keeps the plan.
pub struct TapeMachine {
    plan: ExecutionPlan,
    values: Vec<Option<Tensor>>,
    executed: bool,
}

impl TapeMachine {
    /// Creates a machine for `graph`
    ///
    /// # Errors
    ///
    /// - `ModelError::GraphConstruction` - If the plan was built for a different graph
    pub fn new(graph: &ExprGraph, plan: ExecutionPlan) -> Result<Self, ModelError> {
        if plan.node_count != graph.len() {
            return Err(ModelError::GraphConstruction(format!(
                "execution plan covers {} nodes but the graph has {}",
                plan.node_count,
                graph.len()
            )));
        }
        Ok(Self {
            values: vec![None; graph.len()],
            plan,
            executed: false,
        })
    }

    pub fn plan(&self) -> &ExecutionPlan {
        &self.plan
    }

    pub fn is_executed(&self) -> bool {
        self.executed
    }

    /// Drops every computed value, keeping the plan
    pub fn reset(&mut self) {
        for value in &mut self.values {
            *value = None;
        }
        self.executed = false;
    }

    /// Computed value of a non-leaf node from the last run
    pub fn value(&self, id: NodeId) -> Option<&Tensor> {
        self.values.get(id.index()).and_then(Option::as_ref)
    }

    /// Reads a computed scalar node
    ///
    /// # Errors
    ///
    /// - `ModelError::Execution` - If the node has no value or is not zero-dimensional
    pub fn scalar(&self, graph: &ExprGraph, id: NodeId) -> Result<f32, ModelError> {
        match self.value(id) {
            Some(v) if v.ndim() == 0 => Ok(scalar_of(&v.view())),
            Some(v) => Err(execution_error(
                graph,
                id,
                format!("expected a scalar value, got shape {:?}", v.shape()),
            )),
            None => Err(execution_error(
                graph,
                id,
                "node has no value; run the machine first".to_string(),
            )),
        }
    }

    /// Runs the forward pass and, for gradient plans, the reverse pass
    ///
    /// # Errors
    ///
    /// - `ModelError::InvalidMode` - If the machine was not reset since the last run
    /// - `ModelError::GraphConstruction` - If the graph changed since the plan was built
    /// - `ModelError::Execution` - If a node produces a non-finite value
    pub fn run_all(
        &mut self,
        graph: &ExprGraph,
        params: &mut ParameterStore,
        slots: &SlotStore,
    ) -> Result<(), ModelError> {
        if self.executed {
            return Err(ModelError::InvalidMode(
                "tape machine must be reset before running again".to_string(),
            ));
        }
        if graph.len() != self.plan.node_count {
            return Err(ModelError::GraphConstruction(format!(
                "graph has {} nodes but the execution plan covers {}",
                graph.len(),
                self.plan.node_count
            )));
        }
        self.reset();
        self.forward(graph, params, slots)?;
        if let Some(cost) = self.plan.cost {
            let grads = self.backward(graph, params, slots, cost)?;
            for &id in &self.plan.wrt {
                params.get_mut(id)?.grad_mut().fill(0.0);
            }
            for (id, grad) in grads {
                if self.plan.wrt.contains(&id) {
                    params.get_mut(id)?.grad_mut().assign(&grad);
                }
            }
        }
        self.executed = true;
        Ok(())
    }

    fn forward(
        &mut self,
        graph: &ExprGraph,
        params: &ParameterStore,
        slots: &SlotStore,
    ) -> Result<(), ModelError> {
        for (index, node) in graph.nodes().iter().enumerate() {
            let id = NodeId::new(index);
            let value = {
                let operand = |n: NodeId| resolve_operand(&self.values, graph, params, slots, n);
                match node.op {
                    Op::Parameter(_) | Op::Slot(_) => continue,
                    Op::MatVec { matrix, vector } => {
                        let m = operand(matrix)?.into_dimensionality::<Ix2>()?;
                        let v = operand(vector)?.into_dimensionality::<Ix1>()?;
                        m.dot(&v).into_dyn()
                    }
                    Op::Add(a, b) => &operand(a)? + &operand(b)?,
                    Op::HadamardProd(a, b) => &operand(a)? * &operand(b)?,
                    Op::Sigmoid(a) => operand(a)?.mapv(|x| {
                        let clipped_x = x.clamp(-500.0, 500.0);
                        1.0 / (1.0 + (-clipped_x).exp())
                    }),
                    Op::Tanh(a) => operand(a)?.mapv(f32::tanh),
                    Op::Neg(a) => operand(a)?.mapv(|x| -x),
                    Op::Log(a) => operand(a)?.mapv(f32::ln),
                    Op::Log2(a) => operand(a)?.mapv(f32::log2),
                    Op::SoftMax(a) => {
                        let x = operand(a)?;
                        let max = x.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
                        let exp = x.mapv(|v| (v - max).exp());
                        let sum = exp.sum();
                        exp / sum
                    }
                    Op::Dot(a, b) => {
                        let a = operand(a)?.into_dimensionality::<Ix1>()?;
                        let b = operand(b)?.into_dimensionality::<Ix1>()?;
                        scalar_tensor(a.dot(&b))
                    }
                }
            };
            if value.iter().any(|x| !x.is_finite()) {
                return Err(execution_error(
                    graph,
                    id,
                    "produced a non-finite value".to_string(),
                ));
            }
            self.values[index] = Some(value);
        }
        Ok(())
    }

    /// Reverse pass from `cost`; returns the accumulated gradient of every
    /// parameter node reached
    fn backward(
        &self,
        graph: &ExprGraph,
        params: &ParameterStore,
        slots: &SlotStore,
        cost: NodeId,
    ) -> Result<Vec<(ParamId, Tensor)>, ModelError> {
        let mut grads: Vec<Option<Tensor>> = vec![None; graph.len()];
        grads[cost.index()] = Some(scalar_tensor(1.0));
        let mut param_grads = Vec::new();

        let operand = |n: NodeId| resolve_operand(&self.values, graph, params, slots, n);
        let output = |n: NodeId| {
            self.value(n)
                .map(|v| v.view())
                .ok_or_else(|| execution_error(graph, n, "missing forward value".to_string()))
        };

        for index in (0..=cost.index()).rev() {
            let Some(g) = grads[index].take() else {
                continue;
            };
            let id = NodeId::new(index);
            let node = &graph.nodes()[index];
            match node.op {
                Op::Parameter(param) => param_grads.push((param, g)),
                Op::Slot(_) => {}
                Op::MatVec { matrix, vector } => {
                    let m = operand(matrix)?.into_dimensionality::<Ix2>()?;
                    let v = operand(vector)?.into_dimensionality::<Ix1>()?;
                    let g1 = g.view().into_dimensionality::<Ix1>()?;
                    let grad_m = g1
                        .view()
                        .insert_axis(Axis(1))
                        .dot(&v.view().insert_axis(Axis(0)));
                    let grad_v = m.t().dot(&g1);
                    accumulate(&mut grads, matrix, grad_m.into_dyn());
                    accumulate(&mut grads, vector, grad_v.into_dyn());
                }
                Op::Add(a, b) => {
                    accumulate(&mut grads, a, g.clone());
                    accumulate(&mut grads, b, g);
                }
                Op::HadamardProd(a, b) => {
                    let grad_a = &g * &operand(b)?;
                    let grad_b = &g * &operand(a)?;
                    accumulate(&mut grads, a, grad_a);
                    accumulate(&mut grads, b, grad_b);
                }
                Op::Sigmoid(a) => {
                    let y = output(id)?;
                    accumulate(&mut grads, a, &g * &y.mapv(|v| v * (1.0 - v)));
                }
                Op::Tanh(a) => {
                    let y = output(id)?;
                    accumulate(&mut grads, a, &g * &y.mapv(|v| 1.0 - v * v));
                }
                Op::Neg(a) => accumulate(&mut grads, a, g.mapv(|v| -v)),
                Op::Log(a) => {
                    let x = operand(a)?;
                    accumulate(&mut grads, a, &g / &x);
                }
                Op::Log2(a) => {
                    let x = operand(a)?;
                    accumulate(&mut grads, a, &g / &x.mapv(|v| v * LN_2));
                }
                Op::SoftMax(a) => {
                    let y = output(id)?;
                    let gy = (&g * &y).sum();
                    accumulate(&mut grads, a, &y * &g.mapv(|v| v - gy));
                }
                Op::Dot(a, b) => {
                    let s = scalar_of(&g.view());
                    let grad_a = operand(b)?.mapv(|v| v * s);
                    let grad_b = operand(a)?.mapv(|v| v * s);
                    accumulate(&mut grads, a, grad_a);
                    accumulate(&mut grads, b, grad_b);
                }
            }
        }
        Ok(param_grads)
    }
}

/// Resolves the value of a node: leaves are read from their stores, other
/// nodes from the machine's value arena
fn resolve_operand<'a>(
    values: &'a [Option<Tensor>],
    graph: &ExprGraph,
    params: &'a ParameterStore,
    slots: &'a SlotStore,
    id: NodeId,
) -> Result<ArrayViewD<'a, f32>, ModelError> {
    let node = graph.node(id).ok_or_else(|| {
        ModelError::GraphConstruction(format!("unknown node id {}", id.index()))
    })?;
    match node.op {
        Op::Parameter(param) => Ok(params.get(param)?.value().view()),
        Op::Slot(slot) => Ok(slots.get(slot)?.view()),
        _ => values
            .get(id.index())
            .and_then(Option::as_ref)
            .map(|v| v.view())
            .ok_or_else(|| {
                execution_error(graph, id, "operand evaluated out of order".to_string())
            }),
    }
}

fn accumulate(grads: &mut [Option<Tensor>], id: NodeId, grad: Tensor) {
    let index = id.index();
    if let Some(acc) = grads[index].as_mut() {
        *acc += &grad;
    } else {
        grads[index] = Some(grad);
    }
}

/// Builds an `Execution` error for `id` with a bounded dependency snapshot and logs it
fn execution_error(graph: &ExprGraph, id: NodeId, message: String) -> ModelError {
    let trace = graph.dependency_trace(id, TRACE_DEPTH, TRACE_CHILDREN);
    let name = graph
        .node(id)
        .and_then(Node::name)
        .unwrap_or("_")
        .to_string();
    error!(node = id.index(), %name, %message, "graph execution failed");
    for line in &trace {
        error!("  {}", line);
    }
    ModelError::Execution {
        node: id.index(),
        name,
        message,
        trace,
    }
}
