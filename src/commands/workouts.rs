use chrono::{DateTime, Utc};
use serde::Serialize;

use super::routines::{load_exercises, load_routine};
use crate::analysis::analyze_workout;
use crate::db::{AppState, DbPool, StoreEvent};
use crate::error::AppError;
use crate::models::{ActiveWorkout, Insight, WorkoutLog, WorkoutRecord};
use crate::session::Session;

type HistoryRow = (String, String, String, DateTime<Utc>, String);

const HISTORY_COLUMNS: &str = "id, routine_id, routine_name, completed_at, log_json";

/// A finished record with the load suggestions derived from it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSummary {
  pub workout: WorkoutRecord,
  pub insights: Vec<Insight>,
}

/// A corrupt log only drops that record's sets, the record itself still lists
fn record_from_row((id, routine_id, routine_name, completed_at, log_json): HistoryRow) -> WorkoutRecord {
  let log = serde_json::from_str::<WorkoutLog>(&log_json).unwrap_or_else(|e| {
    tracing::warn!(workout_id = %id, error = %e, "unreadable workout log, treating as empty");
    WorkoutLog::new()
  });

  WorkoutRecord {
    id,
    routine_id,
    routine_name,
    completed_at,
    log,
  }
}

/// ---------------------------------------------------------------------------
/// Session Commands
/// ---------------------------------------------------------------------------

/// Begin a session for a routine: blank sets for every exercise, in routine order
pub async fn start_workout(
  state: &AppState,
  session: &Session,
  routine_id: &str,
) -> Result<ActiveWorkout, AppError> {
  let user = session.require_user()?;
  let routine = load_routine(&state.db, &user.uid, routine_id).await?;
  let exercises = load_exercises(&state.db, &user.uid, routine_id).await?;

  tracing::debug!(routine_id, exercises = exercises.len(), "starting workout");

  Ok(ActiveWorkout::start(&routine, &exercises))
}

/// Store the finished session. The record is immutable from here on.
pub async fn finish_workout(
  state: &AppState,
  session: &Session,
  workout: ActiveWorkout,
) -> Result<WorkoutRecord, AppError> {
  let user = session.require_user()?;
  let new_record = workout.finish(super::now());
  let log_json = serde_json::to_string(&new_record.log)?;

  let record = WorkoutRecord {
    id: super::new_id(),
    routine_id: new_record.routine_id,
    routine_name: new_record.routine_name,
    completed_at: new_record.completed_at,
    log: new_record.log,
  };

  sqlx::query(
    r#"
    INSERT INTO workout_history (id, user_id, routine_id, routine_name, completed_at, log_json)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    "#,
  )
  .bind(&record.id)
  .bind(&user.uid)
  .bind(&record.routine_id)
  .bind(&record.routine_name)
  .bind(record.completed_at)
  .bind(&log_json)
  .execute(&state.db)
  .await?;

  tracing::info!(workout_id = %record.id, routine = %record.routine_name, "workout finished");
  state.publish(StoreEvent::HistoryChanged { user_id: user.uid });

  Ok(record)
}

/// ---------------------------------------------------------------------------
/// History Queries
/// ---------------------------------------------------------------------------

/// Most recent first, for the history listing
pub async fn get_history(state: &AppState, session: &Session) -> Result<Vec<WorkoutRecord>, AppError> {
  let user = session.require_user()?;
  load_history(&state.db, &user.uid, false).await
}

/// Oldest first, the order the analytics expect
pub async fn get_history_ascending(
  state: &AppState,
  session: &Session,
) -> Result<Vec<WorkoutRecord>, AppError> {
  let user = session.require_user()?;
  load_history(&state.db, &user.uid, true).await
}

pub(crate) async fn load_history(
  pool: &DbPool,
  user_id: &str,
  ascending: bool,
) -> Result<Vec<WorkoutRecord>, AppError> {
  let order = if ascending {
    "completed_at ASC, rowid ASC"
  } else {
    "completed_at DESC, rowid DESC"
  };
  let sql = format!(
    "SELECT {} FROM workout_history WHERE user_id = ?1 ORDER BY {}",
    HISTORY_COLUMNS, order
  );

  let rows: Vec<HistoryRow> = sqlx::query_as(&sql).bind(user_id).fetch_all(pool).await?;

  Ok(rows.into_iter().map(record_from_row).collect())
}

pub async fn get_workout(
  state: &AppState,
  session: &Session,
  workout_id: &str,
) -> Result<WorkoutRecord, AppError> {
  let user = session.require_user()?;
  let sql = format!(
    "SELECT {} FROM workout_history WHERE user_id = ?1 AND id = ?2",
    HISTORY_COLUMNS
  );

  let row: Option<HistoryRow> = sqlx::query_as(&sql)
    .bind(&user.uid)
    .bind(workout_id)
    .fetch_optional(&state.db)
    .await?;

  row
    .map(record_from_row)
    .ok_or_else(|| AppError::NotFound(format!("workout {}", workout_id)))
}

/// Post-workout summary: the record plus load suggestions against the routine's
/// current exercise targets. A deleted routine yields no suggestions.
pub async fn workout_summary(
  state: &AppState,
  session: &Session,
  workout_id: &str,
) -> Result<WorkoutSummary, AppError> {
  let user = session.require_user()?;
  let workout = get_workout(state, session, workout_id).await?;
  let exercises = load_exercises(&state.db, &user.uid, &workout.routine_id).await?;

  let insights = analyze_workout(&workout, &exercises);
  tracing::debug!(workout_id, insights = insights.len(), "workout summary");

  Ok(WorkoutSummary { workout, insights })
}
