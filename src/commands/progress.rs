//! Progress and plateau commands
//!
//! Each call pulls a fresh snapshot (exercise map + ascending history) and
//! runs the pure analytics on it. Callers that want live updates subscribe to
//! `AppState::subscribe()` and call again on every `StoreEvent` for their user.

use serde::Serialize;

use super::routines::load_exercise_map;
use super::workouts::load_history;
use crate::analysis::detect_plateaus;
use crate::db::AppState;
use crate::error::AppError;
use crate::models::{ExerciseMap, PlateauWarning, WorkoutRecord};
use crate::progression::{tracked_exercises, weight_series, ProgressPoint, TrackedExercise};
use crate::session::Session;

/// Everything the progress screen derives from one snapshot
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
  pub workouts_logged: usize,
  pub tracked_exercises: Vec<TrackedExercise>,
  pub plateaus: Vec<PlateauWarning>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseProgress {
  pub exercise: TrackedExercise,
  pub points: Vec<ProgressPoint>,
}

async fn snapshot(state: &AppState, session: &Session) -> Result<(ExerciseMap, Vec<WorkoutRecord>), AppError> {
  let user = session.require_user()?;
  let exercise_map = load_exercise_map(&state.db, &user.uid).await?;
  let history = load_history(&state.db, &user.uid, true).await?;
  Ok((exercise_map, history))
}

pub async fn get_tracked_exercises(
  state: &AppState,
  session: &Session,
) -> Result<Vec<TrackedExercise>, AppError> {
  let (exercise_map, history) = snapshot(state, session).await?;
  Ok(tracked_exercises(&history, &exercise_map))
}

/// Chart data for one exercise: heaviest weight per session, oldest first
pub async fn get_exercise_progress(
  state: &AppState,
  session: &Session,
  exercise_id: &str,
) -> Result<ExerciseProgress, AppError> {
  let (exercise_map, history) = snapshot(state, session).await?;
  let name = exercise_map
    .name(exercise_id)
    .ok_or_else(|| AppError::NotFound(format!("exercise {}", exercise_id)))?;

  Ok(ExerciseProgress {
    exercise: TrackedExercise {
      id: exercise_id.to_string(),
      name: name.to_string(),
    },
    points: weight_series(&history, exercise_id),
  })
}

pub async fn get_plateaus(state: &AppState, session: &Session) -> Result<Vec<PlateauWarning>, AppError> {
  let (exercise_map, history) = snapshot(state, session).await?;
  Ok(detect_plateaus(&history, &exercise_map))
}

pub async fn analytics_snapshot(state: &AppState, session: &Session) -> Result<AnalyticsSnapshot, AppError> {
  let (exercise_map, history) = snapshot(state, session).await?;

  let snapshot = AnalyticsSnapshot {
    workouts_logged: history.len(),
    tracked_exercises: tracked_exercises(&history, &exercise_map),
    plateaus: detect_plateaus(&history, &exercise_map),
  };

  tracing::debug!(
    workouts = snapshot.workouts_logged,
    plateaus = snapshot.plateaus.len(),
    "analytics snapshot"
  );

  Ok(snapshot)
}
