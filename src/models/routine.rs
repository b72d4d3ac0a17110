use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Routine {
  pub id: String,
  pub name: String,
  pub description: Option<String>,
  pub created_at: DateTime<Utc>,
}

/// For inserting new routines (without id, created_at)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoutine {
  pub name: String,
  pub description: Option<String>,
}

impl NewRoutine {
  pub fn validate(&self) -> Result<(), AppError> {
    if self.name.trim().is_empty() {
      return Err(AppError::Validation("routine name is required".into()));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Exercise {
  pub id: String,
  pub routine_id: String,
  pub name: String,
  /// Target number of sets
  pub sets: i64,
  /// Target rep range, "8-12" or free text such as "to failure"
  pub reps: String,
  pub created_at: DateTime<Utc>,
}

/// For inserting new exercises (without id, routine_id, created_at)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExercise {
  pub name: String,
  pub sets: i64,
  pub reps: String,
}

impl NewExercise {
  pub fn validate(&self) -> Result<(), AppError> {
    if self.name.trim().is_empty() {
      return Err(AppError::Validation("exercise name is required".into()));
    }
    if self.sets < 1 {
      return Err(AppError::Validation(format!(
        "exercise '{}' needs at least one set, got {}",
        self.name, self.sets
      )));
    }
    if self.reps.trim().is_empty() {
      return Err(AppError::Validation(format!(
        "exercise '{}' needs a rep target",
        self.name
      )));
    }
    Ok(())
  }
}

/// Exercise id -> display name, flattened across all of a user's routines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseMap(HashMap<String, String>);

impl ExerciseMap {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_exercises<'a>(exercises: impl IntoIterator<Item = &'a Exercise>) -> Self {
    exercises
      .into_iter()
      .map(|e| (e.id.clone(), e.name.clone()))
      .collect()
  }

  pub fn insert(&mut self, exercise_id: impl Into<String>, name: impl Into<String>) {
    self.0.insert(exercise_id.into(), name.into());
  }

  /// Display name for an exercise id, None if the exercise no longer exists
  pub fn name(&self, exercise_id: &str) -> Option<&str> {
    self.0.get(exercise_id).map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl FromIterator<(String, String)> for ExerciseMap {
  fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}
