//! Test utilities and helpers for integration and unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Mock data factories
//! - Seed helpers that go through the command layer

use crate::commands::routines::{add_exercise, create_routine};
use crate::config::{AppConfig, GeminiConfig};
use crate::db::AppState;
use crate::models::{
  Exercise, ExerciseMap, Identity, NewExercise, NewRoutine, Routine, SetEntry, WorkoutRecord,
};
use crate::session::Session;
use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::SqlitePool;
use url::Url;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

pub fn test_config() -> AppConfig {
  AppConfig {
    database_url: "sqlite::memory:".to_string(),
    max_connections: 1,
    gemini: GeminiConfig {
      api_key: None,
      api_base: Url::parse("http://127.0.0.1:1/v1beta").expect("valid test url"),
      model: "gemini-test".to_string(),
    },
  }
}

/// AppState over a fresh in-memory database
pub async fn setup_test_state() -> AppState {
  AppState::new(setup_test_db().await, test_config())
}

pub fn signed_in_session(uid: &str) -> Session {
  let session = Session::new();
  session.sign_in(Identity::new(uid, Some(format!("{}@example.com", uid))));
  session
}

/// Create a routine with the given (name, sets, reps) exercises through the command layer
pub async fn seed_routine(
  state: &AppState,
  session: &Session,
  name: &str,
  exercises: &[(&str, i64, &str)],
) -> (Routine, Vec<Exercise>) {
  let routine = create_routine(
    state,
    session,
    NewRoutine {
      name: name.to_string(),
      description: Some(format!("{} description", name)),
    },
  )
  .await
  .expect("Failed to seed routine");

  let mut created = Vec::new();
  for (exercise_name, sets, reps) in exercises {
    let exercise = add_exercise(
      state,
      session,
      &routine.id,
      NewExercise {
        name: exercise_name.to_string(),
        sets: *sets,
        reps: reps.to_string(),
      },
    )
    .await
    .expect("Failed to seed exercise");
    created.push(exercise);
  }

  (routine, created)
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Fixed reference instant so record dates are reproducible
pub fn base_time() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0)
    .single()
    .expect("valid base time")
}

/// A DateTime N days before `base_time()`
pub fn datetime_days_ago(days: i64) -> DateTime<Utc> {
  base_time() - Duration::days(days)
}

pub fn mock_routine(id: &str, name: &str) -> Routine {
  Routine {
    id: id.to_string(),
    name: name.to_string(),
    description: None,
    created_at: base_time(),
  }
}

pub fn mock_exercise(id: &str, routine_id: &str, name: &str, sets: i64, reps: &str) -> Exercise {
  Exercise {
    id: id.to_string(),
    routine_id: routine_id.to_string(),
    name: name.to_string(),
    sets,
    reps: reps.to_string(),
    created_at: base_time(),
  }
}

pub fn mock_exercise_map(entries: &[(&str, &str)]) -> ExerciseMap {
  entries
    .iter()
    .map(|(id, name)| (id.to_string(), name.to_string()))
    .collect()
}

/// Workout record completed `days_ago` days before `base_time()`
pub fn mock_record(id: &str, days_ago: i64, log: Vec<(&str, Vec<SetEntry>)>) -> WorkoutRecord {
  WorkoutRecord {
    id: id.to_string(),
    routine_id: "routine-1".to_string(),
    routine_name: "Full Body".to_string(),
    completed_at: datetime_days_ago(days_ago),
    log: log
      .into_iter()
      .map(|(exercise_id, sets)| (exercise_id.to_string(), sets))
      .collect(),
  }
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('users', 'routines', 'exercises', 'workout_history')"
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 4, "Expected 4 tables, got {}", tables.len());

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    let record = mock_record("w1", 2, vec![("squat", vec![SetEntry::new("100", "5", true)])]);
    assert_eq!(record.completed_at, base_time() - Duration::days(2));
    assert_eq!(record.log.get("squat").map(|s| s.len()), Some(1));

    let map = mock_exercise_map(&[("squat", "Squat")]);
    assert_eq!(map.name("squat"), Some("Squat"));
  }
}
