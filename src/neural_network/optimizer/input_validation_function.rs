use super::*;

fn invalid_hyperparameter(name: &str, rule: &str, value: f32) -> ModelError {
    ModelError::InputValidationError(format!("{} must be {}, got {}", name, rule, value))
}

/// Checks that the step size is a positive finite number.
///
/// # Errors
///
/// - `ModelError::InputValidationError` - If `learning_rate` is zero, negative, NaN or infinite
pub(super) fn validate_learning_rate(learning_rate: f32) -> Result<(), ModelError> {
    if learning_rate.is_finite() && learning_rate > 0.0 {
        Ok(())
    } else {
        Err(invalid_hyperparameter(
            "learning_rate",
            "positive and finite",
            learning_rate,
        ))
    }
}

/// Checks that a moving-average decay factor (`beta1`, `beta2`, `rho`) lies in `[0, 1)`.
///
/// # Parameters
///
/// - `value` - Decay factor to check
/// - `param_name` - Name used in the error message
pub(super) fn validate_decay_rate(value: f32, param_name: &str) -> Result<(), ModelError> {
    if (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid_hyperparameter(param_name, "in [0, 1)", value))
    }
}

/// Checks the denominator guard added before dividing by a root mean square.
pub(super) fn validate_epsilon(epsilon: f32) -> Result<(), ModelError> {
    if epsilon.is_finite() && epsilon > 0.0 {
        Ok(())
    } else {
        Err(invalid_hyperparameter("epsilon", "positive and finite", epsilon))
    }
}
