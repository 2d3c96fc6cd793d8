use super::*;
use ahash::AHashMap;

/// Static dataflow graph over parameter, slot and operation nodes
///
/// The graph is built once per model topology and then executed any number of
/// times by a `TapeMachine`. Shapes are checked while nodes are added, so a
/// graph that builds successfully can only fail at run time for numerical
/// reasons.
///
/// A parameter is bound to at most one node: asking for the same `ParamId`
/// twice returns the existing node, which is how every timestep of an unrolled
/// window ends up reading the same weights.
///
/// # Example
/// ```rust
/// use rustyrnn::graph::*;
/// use ndarray::array;
///
/// let mut params = ParameterStore::new();
/// let w = params.insert("w", array![[1.0f32, 2.0], [3.0, 4.0]].into_dyn()).unwrap();
/// let mut slots = SlotStore::new();
/// let x = slots.alloc("x", &[2]);
/// slots.set_one_hot(x, Some(1)).unwrap();
///
/// let mut graph = ExprGraph::new();
/// let w_node = graph.parameter(&params, w).unwrap();
/// let x_node = graph.slot(&slots, x).unwrap();
/// let y = graph.mat_vec(w_node, x_node).unwrap();
///
/// let mut machine = TapeMachine::new(&graph, ExecutionPlan::forward_only(&graph)).unwrap();
/// machine.run_all(&graph, &mut params, &slots).unwrap();
/// assert_eq!(machine.value(y).unwrap().as_slice().unwrap(), &[2.0, 4.0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExprGraph {
    nodes: Vec<Node>,
    parameter_nodes: AHashMap<ParamId, NodeId>,
}

impl ExprGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, op: Op, shape: Vec<usize>) -> NodeId {
        self.nodes.push(Node {
            op,
            shape,
            name: None,
        });
        NodeId::new(self.nodes.len() - 1)
    }

    fn shape_of(&self, id: NodeId) -> Result<&[usize], ModelError> {
        self.nodes
            .get(id.index())
            .map(|n| n.shape.as_slice())
            .ok_or_else(|| {
                ModelError::GraphConstruction(format!("unknown node id {}", id.index()))
            })
    }

    /// Binds a learnable tensor as a graph node, reusing an existing binding
    pub fn parameter(&mut self, store: &ParameterStore, id: ParamId) -> Result<NodeId, ModelError> {
        if let Some(&node) = self.parameter_nodes.get(&id) {
            return Ok(node);
        }
        let param = store.get(id)?;
        let shape = param.value().shape().to_vec();
        let node = self.push(Op::Parameter(id), shape);
        self.nodes[node.index()].name = Some(param.name().to_string());
        self.parameter_nodes.insert(id, node);
        Ok(node)
    }

    /// Binds a caller-owned buffer as a graph node
    pub fn slot(&mut self, store: &SlotStore, id: SlotId) -> Result<NodeId, ModelError> {
        let shape = store.get(id)?.shape().to_vec();
        let node = self.push(Op::Slot(id), shape);
        self.nodes[node.index()].name = store.name(id).map(str::to_string);
        Ok(node)
    }

    pub fn mat_vec(&mut self, matrix: NodeId, vector: NodeId) -> Result<NodeId, ModelError> {
        let m = self.shape_of(matrix)?.to_vec();
        let v = self.shape_of(vector)?;
        validate_mat_vec(&m, v)?;
        Ok(self.push(Op::MatVec { matrix, vector }, vec![m[0]]))
    }

    pub fn add(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, ModelError> {
        let shape = self.shape_of(a)?.to_vec();
        validate_same_shape("add", &shape, self.shape_of(b)?)?;
        Ok(self.push(Op::Add(a, b), shape))
    }

    pub fn hadamard_prod(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, ModelError> {
        let shape = self.shape_of(a)?.to_vec();
        validate_same_shape("hadamard", &shape, self.shape_of(b)?)?;
        Ok(self.push(Op::HadamardProd(a, b), shape))
    }

    pub fn sigmoid(&mut self, a: NodeId) -> Result<NodeId, ModelError> {
        let shape = self.shape_of(a)?.to_vec();
        Ok(self.push(Op::Sigmoid(a), shape))
    }

    pub fn tanh(&mut self, a: NodeId) -> Result<NodeId, ModelError> {
        let shape = self.shape_of(a)?.to_vec();
        Ok(self.push(Op::Tanh(a), shape))
    }

    pub fn neg(&mut self, a: NodeId) -> Result<NodeId, ModelError> {
        let shape = self.shape_of(a)?.to_vec();
        Ok(self.push(Op::Neg(a), shape))
    }

    pub fn log(&mut self, a: NodeId) -> Result<NodeId, ModelError> {
        let shape = self.shape_of(a)?.to_vec();
        Ok(self.push(Op::Log(a), shape))
    }

    pub fn log2(&mut self, a: NodeId) -> Result<NodeId, ModelError> {
        let shape = self.shape_of(a)?.to_vec();
        Ok(self.push(Op::Log2(a), shape))
    }

    pub fn softmax(&mut self, a: NodeId) -> Result<NodeId, ModelError> {
        let shape = self.shape_of(a)?.to_vec();
        validate_rank("softmax", &shape, 1)?;
        if shape[0] == 0 {
            return Err(ModelError::GraphConstruction(
                "softmax over an empty vector".to_string(),
            ));
        }
        Ok(self.push(Op::SoftMax(a), shape))
    }

    /// Inner product of two vectors of equal length, producing a scalar node
    pub fn dot(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, ModelError> {
        let shape = self.shape_of(a)?.to_vec();
        validate_rank("dot", &shape, 1)?;
        validate_same_shape("dot", &shape, self.shape_of(b)?)?;
        Ok(self.push(Op::Dot(a, b), Vec::new()))
    }

    /// Attaches a diagnostic name to a node
    pub fn set_name(&mut self, id: NodeId, name: &str) -> Result<(), ModelError> {
        let node = self.nodes.get_mut(id.index()).ok_or_else(|| {
            ModelError::GraphConstruction(format!("unknown node id {}", id.index()))
        })?;
        node.name = Some(name.to_string());
        Ok(())
    }

    /// Returns the node bound to `param`, if the parameter was bound to this graph
    pub fn parameter_node(&self, param: ParamId) -> Option<NodeId> {
        self.parameter_nodes.get(&param).copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// One-line description of a node: id, op, name and shape
    pub fn describe(&self, id: NodeId) -> String {
        match self.node(id) {
            Some(node) => format!(
                "#{} {} {} {:?}",
                id.index(),
                node.op.mnemonic(),
                node.name.as_deref().unwrap_or("_"),
                node.shape
            ),
            None => format!("#{} <missing>", id.index()),
        }
    }

    /// Dependency snapshot of `id` restricted to `max_depth` levels and
    /// `max_children` operands per node
    ///
    /// Each returned line is a `describe` string indented by two spaces per level.
    pub fn dependency_trace(&self, id: NodeId, max_depth: usize, max_children: usize) -> Vec<String> {
        let mut lines = Vec::new();
        let mut stack = vec![(id, 0usize)];
        while let Some((current, depth)) = stack.pop() {
            lines.push(format!("{}{}", "  ".repeat(depth), self.describe(current)));
            if depth >= max_depth {
                continue;
            }
            if let Some(node) = self.node(current) {
                let children = node.op.inputs();
                for &child in children.iter().take(max_children).rev() {
                    stack.push((child, depth + 1));
                }
            }
        }
        lines
    }
}
