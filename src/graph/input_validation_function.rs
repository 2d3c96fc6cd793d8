use super::*;

/// Validates that two operand shapes are identical for an elementwise operation
///
/// # Parameters
///
/// - `op` - Name of the operation being wired (for error messages)
/// - `a` - Shape of the left operand
/// - `b` - Shape of the right operand
///
/// # Returns
///
/// * `Ok(())` if validation passes
/// * `Err(ModelError::GraphConstruction)` if the shapes differ
pub(super) fn validate_same_shape(op: &str, a: &[usize], b: &[usize]) -> Result<(), ModelError> {
    if a != b {
        return Err(ModelError::GraphConstruction(format!(
            "{} requires operands of equal shape, got {:?} and {:?}",
            op, a, b
        )));
    }
    Ok(())
}

/// Validates that an operand has the expected number of dimensions
///
/// # Parameters
///
/// - `op` - Name of the operation being wired (for error messages)
/// - `shape` - Shape of the operand
/// - `rank` - Required number of dimensions
///
/// # Returns
///
/// * `Ok(())` if validation passes
/// * `Err(ModelError::GraphConstruction)` if the rank differs
pub(super) fn validate_rank(op: &str, shape: &[usize], rank: usize) -> Result<(), ModelError> {
    if shape.len() != rank {
        return Err(ModelError::GraphConstruction(format!(
            "{} requires a {}-dimensional operand, got shape {:?}",
            op, rank, shape
        )));
    }
    Ok(())
}

/// Validates the operands of a matrix-vector product
///
/// # Parameters
///
/// - `matrix` - Shape of the matrix operand, expected `[m, k]`
/// - `vector` - Shape of the vector operand, expected `[k]`
///
/// # Returns
///
/// * `Ok(())` if validation passes
/// * `Err(ModelError::GraphConstruction)` if the inner dimensions do not agree
pub(super) fn validate_mat_vec(matrix: &[usize], vector: &[usize]) -> Result<(), ModelError> {
    validate_rank("matvec", matrix, 2)?;
    validate_rank("matvec", vector, 1)?;
    if matrix[1] != vector[0] {
        return Err(ModelError::GraphConstruction(format!(
            "matvec inner dimensions disagree: matrix {:?} cannot multiply vector {:?}",
            matrix, vector
        )));
    }
    Ok(())
}
