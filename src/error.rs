use serde::Serialize;

use crate::llm::LlmError;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum AppError {
  #[error("Not signed in")]
  NotAuthenticated,

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Invalid input: {0}")]
  Validation(String),

  #[error("Set {} of exercise {exercise_id} is already completed", .index + 1)]
  SetLocked { exercise_id: String, index: usize },

  #[error("Missing configuration: {0}")]
  MissingConfig(String),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Migration error: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("Plan generation failed: {0}")]
  Llm(#[from] LlmError),
}

impl AppError {
  /// Whether retrying the same action may succeed
  pub fn is_retryable(&self) -> bool {
    matches!(self, AppError::Llm(_) | AppError::Database(_))
  }
}

impl Serialize for AppError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_serializes_as_message() {
    let err = AppError::SetLocked {
      exercise_id: "squat".into(),
      index: 1,
    };
    let json = serde_json::to_string(&err).unwrap();
    assert_eq!(json, r#""Set 2 of exercise squat is already completed""#);
  }

  #[test]
  fn test_llm_errors_are_retryable() {
    let err: AppError = LlmError::Api("quota exceeded".into()).into();
    assert!(err.is_retryable());
    assert!(err.to_string().contains("quota exceeded"));
    assert!(!AppError::NotAuthenticated.is_retryable());
  }
}
