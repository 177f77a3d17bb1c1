//! Errors surfaced by goal operations.

use habitual_ai::GenerationError;
use habitual_storage::StorageError;

/// Result alias for goal operations.
pub type Result<T> = std::result::Result<T, GoalError>;

/// Why a goal operation failed. Nothing is written when one of these is
/// returned.
#[derive(Debug, thiserror::Error)]
pub enum GoalError {
    /// Missing or malformed input
    #[error("validation failed: {0}")]
    Validation(String),

    /// The plan generator failed or returned an unusable plan
    #[error("plan generation failed: {0}")]
    Generation(GenerationError),

    /// Referenced goal or day does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Underlying store failed
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl From<GenerationError> for GoalError {
    fn from(e: GenerationError) -> Self {
        match e {
            GenerationError::InvalidRequest(msg) => GoalError::Validation(msg),
            other => GoalError::Generation(other),
        }
    }
}

impl GoalError {
    pub(crate) fn invalid(field: &str, reason: &str) -> Self {
        GoalError::Validation(format!("{field} {reason}"))
    }
}

/// Trimmed value of a required text field.
pub(crate) fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GoalError::invalid(field, "is required"));
    }
    Ok(trimmed.to_string())
}
