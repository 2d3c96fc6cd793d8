use std::fs::File;
use std::io::BufReader;

/// Error types that can occur while building, running or training the model
///
/// # Variants
///
/// - `GraphConstruction` - Shapes did not line up while wiring the computation graph. This is a
///   configuration or programming defect and is never retried
/// - `Execution` - A node failed while the graph was being executed (for example it produced a
///   non-finite value). Carries the implicated node and a bounded dependency trace
/// - `Optimizer` - The optimizer could not apply an update step
/// - `InputValidationError` - The input data or configuration does not meet the expected rules
/// - `InvalidMode` - An operation was requested before the matching run mode was built
/// - `Io` - Wraps standard I/O errors from file system operations
/// - `Json` - Wraps JSON serialization/deserialization errors
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Graph construction error: {0}")]
    GraphConstruction(String),

    #[error("Execution error at node {node} ({name}): {message}")]
    Execution {
        node: usize,
        name: String,
        message: String,
        trace: Vec<String>,
    },

    #[error("Optimizer error: {0}")]
    Optimizer(String),

    #[error("Input validation error: {0}")]
    InputValidationError(String),

    #[error("Invalid mode: {0}")]
    InvalidMode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    /// Returns the implicated node id for execution failures
    pub fn node(&self) -> Option<usize> {
        match self {
            ModelError::Execution { node, .. } => Some(*node),
            _ => None,
        }
    }

    /// Returns the bounded dependency trace recorded for execution failures
    ///
    /// Each line describes one node reachable from the failing node, indented by depth.
    pub fn trace(&self) -> &[String] {
        match self {
            ModelError::Execution { trace, .. } => trace,
            _ => &[],
        }
    }

    /// Opens a file for buffered reading, mapping failures into `ModelError::Io`
    pub fn load_in_buf_reader(path: &str) -> Result<BufReader<File>, ModelError> {
        let file = File::open(path)?;
        Ok(BufReader::new(file))
    }
}

impl From<ndarray::ShapeError> for ModelError {
    fn from(e: ndarray::ShapeError) -> Self {
        ModelError::GraphConstruction(e.to_string())
    }
}
