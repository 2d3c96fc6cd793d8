use super::*;

/// Index of a buffer inside a `SlotStore`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(usize);

impl SlotId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Arena of caller-owned buffers read by `Op::Slot` nodes
///
/// Holds one-hot input/target vectors and the recurrent carry state. Every
/// slot owns its memory; writes are value copies and never alias a computed
/// node value.
#[derive(Debug, Clone, Default)]
pub struct SlotStore {
    slots: Vec<Tensor>,
    names: Vec<String>,
}

impl SlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a zero-filled buffer of the given shape
    pub fn alloc(&mut self, name: &str, shape: &[usize]) -> SlotId {
        self.slots.push(Tensor::zeros(IxDyn(shape)));
        self.names.push(name.to_string());
        SlotId(self.slots.len() - 1)
    }

    pub fn get(&self, id: SlotId) -> Result<&Tensor, ModelError> {
        self.slots
            .get(id.0)
            .ok_or_else(|| ModelError::GraphConstruction(format!("unknown slot id {}", id.0)))
    }

    pub fn get_mut(&mut self, id: SlotId) -> Result<&mut Tensor, ModelError> {
        self.slots
            .get_mut(id.0)
            .ok_or_else(|| ModelError::GraphConstruction(format!("unknown slot id {}", id.0)))
    }

    pub fn name(&self, id: SlotId) -> Option<&str> {
        self.names.get(id.0).map(String::as_str)
    }

    /// Fills a buffer with zeros
    pub fn zero(&mut self, id: SlotId) -> Result<(), ModelError> {
        self.get_mut(id)?.fill(0.0);
        Ok(())
    }

    /// Writes a one-hot vector, or an all-zero vector when `index` is `None`
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If the slot is not a vector or `index` is out of range
    pub fn set_one_hot(&mut self, id: SlotId, index: Option<usize>) -> Result<(), ModelError> {
        let slot = self.get_mut(id)?;
        if slot.ndim() != 1 {
            return Err(ModelError::InputValidationError(format!(
                "one-hot target slot must be a vector, got shape {:?}",
                slot.shape()
            )));
        }
        let len = slot.len();
        slot.fill(0.0);
        if let Some(index) = index {
            if index >= len {
                return Err(ModelError::InputValidationError(format!(
                    "one-hot index {} out of range for vector of length {}",
                    index, len
                )));
            }
            slot[&[index][..]] = 1.0;
        }
        Ok(())
    }

    /// Copies `source` into the slot's own memory
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If the shapes differ
    pub fn copy_from(&mut self, id: SlotId, source: &Tensor) -> Result<(), ModelError> {
        let slot = self.get_mut(id)?;
        if slot.shape() != source.shape() {
            return Err(ModelError::InputValidationError(format!(
                "cannot copy value of shape {:?} into slot of shape {:?}",
                source.shape(),
                slot.shape()
            )));
        }
        slot.assign(source);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
