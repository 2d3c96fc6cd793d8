use super::*;

/// Index of a learnable tensor inside a `ParameterStore`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(usize);

impl ParamId {
    /// Position of the parameter in the store
    pub fn index(self) -> usize {
        self.0
    }
}

/// A learnable tensor together with the gradient of the last executed cost
///
/// # Fields
///
/// - `name` - Unique name, e.g. `wix_0` or `bias_d`
/// - `value` - Current value, updated in place by optimizers
/// - `grad` - Gradient written by the last gradient-enabled execution, same shape as `value`
#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    value: Tensor,
    grad: Tensor,
}

impl Parameter {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Tensor {
        &self.value
    }

    pub fn grad(&self) -> &Tensor {
        &self.grad
    }

    pub fn grad_mut(&mut self) -> &mut Tensor {
        &mut self.grad
    }

    /// Borrows the value mutably and the gradient immutably at the same time
    pub fn value_and_grad_mut(&mut self) -> (&mut Tensor, &Tensor) {
        (&mut self.value, &self.grad)
    }
}

/// Owning arena of every learnable tensor of a model
///
/// Graph nodes refer to parameters by `ParamId` only, so one stored tensor is
/// shared by every timestep that reads it.
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    params: Vec<Parameter>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Adds a tensor under `name` and returns its id
    ///
    /// # Errors
    ///
    /// - `ModelError::GraphConstruction` - If a parameter with the same name already exists
    pub fn insert(&mut self, name: &str, value: Tensor) -> Result<ParamId, ModelError> {
        if self.find(name).is_some() {
            return Err(ModelError::GraphConstruction(format!(
                "parameter '{}' is already registered",
                name
            )));
        }
        let grad = Tensor::zeros(value.raw_dim());
        self.params.push(Parameter {
            name: name.to_string(),
            value,
            grad,
        });
        Ok(ParamId(self.params.len() - 1))
    }

    pub fn get(&self, id: ParamId) -> Result<&Parameter, ModelError> {
        self.params.get(id.0).ok_or_else(|| {
            ModelError::GraphConstruction(format!("unknown parameter id {}", id.0))
        })
    }

    pub fn get_mut(&mut self, id: ParamId) -> Result<&mut Parameter, ModelError> {
        self.params.get_mut(id.0).ok_or_else(|| {
            ModelError::GraphConstruction(format!("unknown parameter id {}", id.0))
        })
    }

    /// Looks a parameter up by name
    pub fn find(&self, name: &str) -> Option<ParamId> {
        self.params
            .iter()
            .position(|p| p.name == name)
            .map(ParamId)
    }

    /// Replaces the value of a parameter, keeping its shape
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `value` does not have the parameter's shape
    pub fn set_value(&mut self, id: ParamId, value: Tensor) -> Result<(), ModelError> {
        let param = self.get_mut(id)?;
        if param.value.shape() != value.shape() {
            return Err(ModelError::InputValidationError(format!(
                "parameter '{}' has shape {:?}, got {:?}",
                param.name,
                param.value.shape(),
                value.shape()
            )));
        }
        param.value = value;
        Ok(())
    }

    /// Total number of scalar weights held by the store
    pub fn scalar_count(&self) -> usize {
        self.params.iter().map(|p| p.value.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParamId, &Parameter)> {
        self.params.iter().enumerate().map(|(i, p)| (ParamId(i), p))
    }
}
