use crate::db::{AppState, DbPool, StoreEvent};
use crate::error::AppError;
use crate::models::{Exercise, ExerciseMap, NewExercise, NewRoutine, Routine};
use crate::session::Session;

/// ---------------------------------------------------------------------------
/// Routine Commands
/// ---------------------------------------------------------------------------

pub async fn create_routine(
  state: &AppState,
  session: &Session,
  routine: NewRoutine,
) -> Result<Routine, AppError> {
  let user = session.require_user()?;
  routine.validate()?;

  let created = Routine {
    id: super::new_id(),
    name: routine.name.trim().to_string(),
    description: routine.description,
    created_at: super::now(),
  };

  sqlx::query(
    r#"
    INSERT INTO routines (id, user_id, name, description, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5)
    "#,
  )
  .bind(&created.id)
  .bind(&user.uid)
  .bind(&created.name)
  .bind(&created.description)
  .bind(created.created_at)
  .execute(&state.db)
  .await?;

  tracing::info!(routine_id = %created.id, name = %created.name, "created routine");
  state.publish(StoreEvent::RoutinesChanged { user_id: user.uid });

  Ok(created)
}

pub async fn list_routines(state: &AppState, session: &Session) -> Result<Vec<Routine>, AppError> {
  let user = session.require_user()?;

  let routines = sqlx::query_as::<_, Routine>(
    r#"
    SELECT id, name, description, created_at
    FROM routines
    WHERE user_id = ?1
    ORDER BY created_at ASC, rowid ASC
    "#,
  )
  .bind(&user.uid)
  .fetch_all(&state.db)
  .await?;

  Ok(routines)
}

pub async fn get_routine(
  state: &AppState,
  session: &Session,
  routine_id: &str,
) -> Result<Routine, AppError> {
  let user = session.require_user()?;
  load_routine(&state.db, &user.uid, routine_id).await
}

pub(crate) async fn load_routine(
  pool: &DbPool,
  user_id: &str,
  routine_id: &str,
) -> Result<Routine, AppError> {
  sqlx::query_as::<_, Routine>(
    "SELECT id, name, description, created_at FROM routines WHERE user_id = ?1 AND id = ?2",
  )
  .bind(user_id)
  .bind(routine_id)
  .fetch_optional(pool)
  .await?
  .ok_or_else(|| AppError::NotFound(format!("routine {}", routine_id)))
}

/// ---------------------------------------------------------------------------
/// Exercise Commands
/// ---------------------------------------------------------------------------

pub async fn add_exercise(
  state: &AppState,
  session: &Session,
  routine_id: &str,
  exercise: NewExercise,
) -> Result<Exercise, AppError> {
  let user = session.require_user()?;
  exercise.validate()?;
  load_routine(&state.db, &user.uid, routine_id).await?;

  let created = Exercise {
    id: super::new_id(),
    routine_id: routine_id.to_string(),
    name: exercise.name.trim().to_string(),
    sets: exercise.sets,
    reps: exercise.reps.trim().to_string(),
    created_at: super::now(),
  };

  sqlx::query(
    r#"
    INSERT INTO exercises (id, user_id, routine_id, name, sets, reps, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    "#,
  )
  .bind(&created.id)
  .bind(&user.uid)
  .bind(&created.routine_id)
  .bind(&created.name)
  .bind(created.sets)
  .bind(&created.reps)
  .bind(created.created_at)
  .execute(&state.db)
  .await?;

  tracing::info!(routine_id, exercise_id = %created.id, "added exercise");
  state.publish(StoreEvent::ExercisesChanged {
    user_id: user.uid,
    routine_id: routine_id.to_string(),
  });

  Ok(created)
}

/// Exercises of a routine in the order they were added
pub async fn list_exercises(
  state: &AppState,
  session: &Session,
  routine_id: &str,
) -> Result<Vec<Exercise>, AppError> {
  let user = session.require_user()?;
  load_exercises(&state.db, &user.uid, routine_id).await
}

pub(crate) async fn load_exercises(
  pool: &DbPool,
  user_id: &str,
  routine_id: &str,
) -> Result<Vec<Exercise>, AppError> {
  let exercises = sqlx::query_as::<_, Exercise>(
    r#"
    SELECT id, routine_id, name, sets, reps, created_at
    FROM exercises
    WHERE user_id = ?1 AND routine_id = ?2
    ORDER BY created_at ASC, rowid ASC
    "#,
  )
  .bind(user_id)
  .bind(routine_id)
  .fetch_all(pool)
  .await?;

  Ok(exercises)
}

/// Every exercise id the user has, across all routines, mapped to its name
pub async fn exercise_map(state: &AppState, session: &Session) -> Result<ExerciseMap, AppError> {
  let user = session.require_user()?;
  load_exercise_map(&state.db, &user.uid).await
}

pub(crate) async fn load_exercise_map(pool: &DbPool, user_id: &str) -> Result<ExerciseMap, AppError> {
  let rows: Vec<(String, String)> =
    sqlx::query_as("SELECT id, name FROM exercises WHERE user_id = ?1")
      .bind(user_id)
      .fetch_all(pool)
      .await?;

  Ok(rows.into_iter().collect())
}
