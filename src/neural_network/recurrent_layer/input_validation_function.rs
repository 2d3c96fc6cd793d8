use super::*;

/// Rejects a zero-sized layer or embedding dimension, naming it in the error.
pub(super) fn validate_dimension_greater_than_zero(
    value: usize,
    param_name: &str,
) -> Result<(), ModelError> {
    match value {
        0 => Err(ModelError::InputValidationError(format!(
            "{} needs at least one unit",
            param_name
        ))),
        _ => Ok(()),
    }
}

/// Validates that the initialization standard deviation is positive and finite.
pub(super) fn validate_stddev(stddev: f32) -> Result<(), ModelError> {
    if !(stddev > 0.0 && stddev.is_finite()) {
        return Err(ModelError::InputValidationError(format!(
            "stddev must be positive and finite, got {}",
            stddev
        )));
    }
    Ok(())
}

/// Validates that a graph node is a vector of the expected length.
///
/// # Errors
///
/// - `ModelError::GraphConstruction` - If the node is unknown or has another shape
pub(super) fn validate_vector_node(
    graph: &ExprGraph,
    node: NodeId,
    expected: usize,
    what: &str,
) -> Result<(), ModelError> {
    let shape = graph
        .node(node)
        .map(|n| n.shape().to_vec())
        .ok_or_else(|| ModelError::GraphConstruction(format!("unknown {} node", what)))?;
    if shape != [expected] {
        return Err(ModelError::GraphConstruction(format!(
            "{} must be a vector of length {}, got shape {:?}",
            what, expected, shape
        )));
    }
    Ok(())
}
