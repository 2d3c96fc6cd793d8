use super::*;
use serde::{Deserialize, Serialize};
use serde_json::{from_reader, to_writer_pretty};
use std::fs::File;
use std::io::{BufWriter, Write};

/// One stored tensor in serializable form.
///
/// # Fields
///
/// - `name` - Parameter name, e.g. `wfh_1`
/// - `shape` - Tensor shape
/// - `data` - Values in row-major order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableParameter {
    pub name: String,
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

/// Serializable snapshot of `ModelParameters`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableModelParameters {
    pub input_size: usize,
    pub embedding_size: usize,
    pub output_size: usize,
    pub hidden_sizes: Vec<usize>,
    pub parameters: Vec<SerializableParameter>,
}

impl SerializableModelParameters {
    /// Captures the current values of every tensor in `params`
    pub fn from_model_parameters(params: &ModelParameters) -> Self {
        let parameters = params
            .store()
            .iter()
            .map(|(_, p)| SerializableParameter {
                name: p.name().to_string(),
                shape: p.value().shape().to_vec(),
                data: p.value().iter().copied().collect(),
            })
            .collect();

        Self {
            input_size: params.input_size(),
            embedding_size: params.embedding_size(),
            output_size: params.output_size(),
            hidden_sizes: params.hidden_sizes(),
            parameters,
        }
    }
}

fn invalid_data(message: String) -> ModelError {
    ModelError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, message))
}

impl ModelParameters {
    /// Saves every parameter value as pretty JSON.
    ///
    /// # Parameters
    ///
    /// * `path` - File path to write. An existing file is overwritten
    ///
    /// # Returns
    ///
    /// - `Ok(())` - If the file was written
    /// - `Err(ModelError::Io)` or `Err(ModelError::Json)` - If writing or serialization fails
    pub fn save_to_path(&self, path: &str) -> Result<(), ModelError> {
        let snapshot = SerializableModelParameters::from_model_parameters(self);

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        to_writer_pretty(&mut writer, &snapshot)?;
        writer.flush()?;

        Ok(())
    }

    /// Loads parameter values saved by `save_to_path` into this model.
    ///
    /// The file must describe the same architecture: identical sizes, the same
    /// parameter names and shapes. Nothing is modified unless every tensor matches.
    ///
    /// # Errors
    ///
    /// - `ModelError::Io` - If the file cannot be read or describes another architecture
    /// - `ModelError::Json` - If the file is not valid JSON for a parameter snapshot
    pub fn load_from_path(&mut self, path: &str) -> Result<(), ModelError> {
        let reader = ModelError::load_in_buf_reader(path)?;
        let snapshot: SerializableModelParameters = from_reader(reader)?;

        if snapshot.input_size != self.input_size
            || snapshot.embedding_size != self.embedding_size
            || snapshot.output_size != self.output_size
            || snapshot.hidden_sizes != self.hidden_sizes()
        {
            return Err(invalid_data(format!(
                "architecture mismatch: model is ({}, {}, {}, {:?}), file is ({}, {}, {}, {:?})",
                self.input_size,
                self.embedding_size,
                self.output_size,
                self.hidden_sizes(),
                snapshot.input_size,
                snapshot.embedding_size,
                snapshot.output_size,
                snapshot.hidden_sizes
            )));
        }
        if snapshot.parameters.len() != self.store.len() {
            return Err(invalid_data(format!(
                "parameter count mismatch: model has {}, file has {}",
                self.store.len(),
                snapshot.parameters.len()
            )));
        }

        let mut staged = Vec::with_capacity(snapshot.parameters.len());
        for saved in snapshot.parameters {
            let id = self
                .store
                .find(&saved.name)
                .ok_or_else(|| invalid_data(format!("unknown parameter '{}'", saved.name)))?;
            let expected = self.store.get(id)?.value().shape().to_vec();
            if saved.shape != expected {
                return Err(invalid_data(format!(
                    "parameter '{}' has shape {:?}, file has {:?}",
                    saved.name, expected, saved.shape
                )));
            }
            let value = Tensor::from_shape_vec(IxDyn(&saved.shape), saved.data)?;
            staged.push((id, value));
        }

        for (id, value) in staged {
            self.store.set_value(id, value)?;
        }
        Ok(())
    }
}
