//! Heuristic workout analysis
//!
//! Two deterministic checks run on already-fetched records:
//! - plateau detection over the whole history
//! - load-increase suggestions right after a finished workout
//!
//! Neither check can fail. Missing or malformed fields only exclude the
//! affected exercise from the result.

use crate::models::{Exercise, ExerciseMap, Insight, PlateauWarning, SetEntry, WorkoutLog, WorkoutRecord};
use crate::progression::{parse_leading_float, parse_leading_int, progressions};

/// Number of most recent sessions compared when looking for a plateau
pub const PLATEAU_WINDOW: usize = 3;

/// Suggested load increase once every set hit the rep floor
pub const LOAD_INCREASE_FACTOR: f64 = 1.05;

// ---------------------------------------------------------------------------
/// Plateau Detection
// ---------------------------------------------------------------------------

/// Flag exercises whose heaviest completed set has not gone up across their
/// last three recorded sessions (flat or dropping both count).
///
/// `history` must be sorted ascending by completion time.
pub fn detect_plateaus(history: &[WorkoutRecord], exercise_map: &ExerciseMap) -> Vec<PlateauWarning> {
  progressions(history, exercise_map)
    .into_iter()
    .filter(|progression| {
      progression
        .last_points(PLATEAU_WINDOW)
        .is_some_and(|window| window.windows(2).all(|pair| pair[1].weight <= pair[0].weight))
    })
    .map(|progression| PlateauWarning {
      message: plateau_message(&progression.exercise_name),
      exercise_name: progression.exercise_name,
    })
    .collect()
}

fn plateau_message(exercise_name: &str) -> String {
  format!(
    "Your progress on {} seems to have stalled. Consider changing the rep range or swapping in an alternative exercise to break through the plateau.",
    exercise_name
  )
}

// ---------------------------------------------------------------------------
/// Post-Workout Load Advisor
// ---------------------------------------------------------------------------

/// Minimum reps for a set to count, taken from the start of the target range
/// ("8-12" -> 8, "10" -> 10). None for ranges like "to failure".
pub fn rep_floor(target_reps: &str) -> Option<i64> {
  let head = target_reps.split('-').next().unwrap_or_default();
  parse_leading_int(head)
}

fn is_successful(set: &SetEntry, floor: i64) -> bool {
  set.done && parse_leading_int(&set.reps).is_some_and(|reps| reps >= floor)
}

/// Suggest a heavier load for every exercise where all logged sets were
/// completed at or above the rep floor.
///
/// `exercises` is the routine the workout was started from; output follows its order.
pub fn generate_insights(log: &WorkoutLog, exercises: &[Exercise]) -> Vec<Insight> {
  exercises
    .iter()
    .filter_map(|exercise| {
      let sets = log.get(&exercise.id)?;
      let last = sets.last()?;
      let floor = rep_floor(&exercise.reps)?;

      if !sets.iter().all(|set| is_successful(set, floor)) {
        return None;
      }

      let last_weight = parse_leading_float(&last.weight).filter(|w| *w > 0.0)?;
      // Fixed-point formatting rounds the exact binary value, so 81 * 1.05 shows as 85.0
      let suggested_text = format!("{:.1}", last_weight * LOAD_INCREASE_FACTOR);
      let suggested = suggested_text.parse::<f64>().ok()?;

      Some(Insight {
        exercise_name: exercise.name.clone(),
        message: format!(
          "You completed every set of {} successfully! Next time, try increasing the weight to ~{}kg.",
          exercise.name, suggested_text
        ),
        suggested_weight: suggested,
      })
    })
    .collect()
}

/// Load suggestions for a finished workout record
pub fn analyze_workout(record: &WorkoutRecord, exercises: &[Exercise]) -> Vec<Insight> {
  generate_insights(&record.log, exercises)
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
