use serde::Serialize;

use crate::db::{AppState, StoreEvent};
use crate::error::AppError;
use crate::llm::{GeminiClient, GeneratedPlan, PlanRequest};
use crate::models::{NewExercise, NewRoutine};
use crate::session::Session;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPlan {
  pub plan_name: String,
  pub routine_ids: Vec<String>,
  pub exercises_created: usize,
}

/// Ask the plan producer for a program. Nothing is stored until `save_plan`.
pub async fn generate_plan(
  state: &AppState,
  session: &Session,
  request: PlanRequest,
) -> Result<GeneratedPlan, AppError> {
  let user = session.require_user()?;
  let client = GeminiClient::from_config(&state.config.gemini)?;

  tracing::info!(
    uid = %user.uid,
    objective = %request.objective,
    level = %request.level,
    days = request.days_per_week,
    "generating plan"
  );

  match client.generate_plan(&request).await {
    Ok((plan, _usage)) => Ok(plan),
    Err(e) => {
      tracing::warn!(error = %e, "plan generation failed");
      Err(e.into())
    }
  }
}

/// Store every routine and exercise of the plan in one transaction
pub async fn save_plan(
  state: &AppState,
  session: &Session,
  plan: &GeneratedPlan,
) -> Result<SavedPlan, AppError> {
  let user = session.require_user()?;
  plan.validate()?;

  let mut tx = state.db.begin().await?;
  let mut routine_ids = Vec::with_capacity(plan.routines.len());
  let mut exercises_created = 0;

  for routine in &plan.routines {
    let new_routine = NewRoutine {
      name: routine.name.clone(),
      description: Some(routine.description.clone()),
    };
    new_routine.validate()?;

    let routine_id = super::new_id();
    sqlx::query(
      r#"
      INSERT INTO routines (id, user_id, name, description, created_at)
      VALUES (?1, ?2, ?3, ?4, ?5)
      "#,
    )
    .bind(&routine_id)
    .bind(&user.uid)
    .bind(new_routine.name.trim())
    .bind(&new_routine.description)
    .bind(super::now())
    .execute(&mut *tx)
    .await?;

    for exercise in &routine.exercises {
      let new_exercise = NewExercise::from(exercise);
      new_exercise.validate()?;

      sqlx::query(
        r#"
        INSERT INTO exercises (id, user_id, routine_id, name, sets, reps, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
      )
      .bind(super::new_id())
      .bind(&user.uid)
      .bind(&routine_id)
      .bind(new_exercise.name.trim())
      .bind(new_exercise.sets)
      .bind(new_exercise.reps.trim())
      .bind(super::now())
      .execute(&mut *tx)
      .await?;

      exercises_created += 1;
    }

    routine_ids.push(routine_id);
  }

  tx.commit().await?;

  tracing::info!(
    plan = %plan.plan_name,
    routines = routine_ids.len(),
    exercises = exercises_created,
    "saved generated plan"
  );
  state.publish(StoreEvent::RoutinesChanged {
    user_id: user.uid.clone(),
  });
  for routine_id in &routine_ids {
    state.publish(StoreEvent::ExercisesChanged {
      user_id: user.uid.clone(),
      routine_id: routine_id.clone(),
    });
  }

  Ok(SavedPlan {
    plan_name: plan.plan_name.clone(),
    routine_ids,
    exercises_created,
  })
}
