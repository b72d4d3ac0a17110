use chrono::{DateTime, Utc};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::AppError;
use crate::models::{Exercise, Routine};

// ---------------------------------------------------------------------------
/// Set Entry: one logged set as typed during a session
// ---------------------------------------------------------------------------

/// Weight and reps stay as the raw text the user typed; the analytics parse
/// them leniently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetEntry {
  #[serde(default, deserialize_with = "text_or_number")]
  pub weight: String,
  #[serde(default, deserialize_with = "text_or_number")]
  pub reps: String,
  #[serde(default)]
  pub done: bool,
}

impl SetEntry {
  pub fn new(weight: impl Into<String>, reps: impl Into<String>, done: bool) -> Self {
    Self {
      weight: weight.into(),
      reps: reps.into(),
      done,
    }
  }
}

/// Older clients stored numbers instead of strings
pub(crate) fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Raw {
    Text(String),
    Number(serde_json::Number),
    Null,
  }

  Ok(match Raw::deserialize(deserializer)? {
    Raw::Text(s) => s,
    Raw::Number(n) => n.to_string(),
    Raw::Null => String::new(),
  })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetField {
  Weight,
  Reps,
}

// ---------------------------------------------------------------------------
/// Workout Log: exercise id -> sets, in insertion order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkoutLog {
  entries: Vec<(String, Vec<SetEntry>)>,
}

impl WorkoutLog {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert or replace the sets for an exercise. Replacing keeps the original position.
  pub fn insert(&mut self, exercise_id: impl Into<String>, sets: Vec<SetEntry>) {
    let exercise_id = exercise_id.into();
    match self.entries.iter_mut().find(|(id, _)| *id == exercise_id) {
      Some((_, existing)) => *existing = sets,
      None => self.entries.push((exercise_id, sets)),
    }
  }

  pub fn get(&self, exercise_id: &str) -> Option<&[SetEntry]> {
    self
      .entries
      .iter()
      .find(|(id, _)| id == exercise_id)
      .map(|(_, sets)| sets.as_slice())
  }

  fn get_mut(&mut self, exercise_id: &str) -> Option<&mut Vec<SetEntry>> {
    self
      .entries
      .iter_mut()
      .find(|(id, _)| id == exercise_id)
      .map(|(_, sets)| sets)
  }

  pub fn exercise_ids(&self) -> impl Iterator<Item = &str> {
    self.entries.iter().map(|(id, _)| id.as_str())
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &[SetEntry])> {
    self
      .entries
      .iter()
      .map(|(id, sets)| (id.as_str(), sets.as_slice()))
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl FromIterator<(String, Vec<SetEntry>)> for WorkoutLog {
  fn from_iter<I: IntoIterator<Item = (String, Vec<SetEntry>)>>(iter: I) -> Self {
    let mut log = WorkoutLog::new();
    for (id, sets) in iter {
      log.insert(id, sets);
    }
    log
  }
}

// Stored as a JSON object keyed by exercise id. Key order is preserved both ways.
impl Serialize for WorkoutLog {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    let mut map = serializer.serialize_map(Some(self.entries.len()))?;
    for (id, sets) in &self.entries {
      map.serialize_entry(id, sets)?;
    }
    map.end()
  }
}

impl<'de> Deserialize<'de> for WorkoutLog {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    struct LogVisitor;

    impl<'de> Visitor<'de> for LogVisitor {
      type Value = WorkoutLog;

      fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of exercise id to sets")
      }

      fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
      where
        A: MapAccess<'de>,
      {
        let mut log = WorkoutLog::new();
        while let Some((id, sets)) = access.next_entry::<String, Vec<SetEntry>>()? {
          log.insert(id, sets);
        }
        Ok(log)
      }

      fn visit_unit<E>(self) -> Result<Self::Value, E>
      where
        E: de::Error,
      {
        Ok(WorkoutLog::new())
      }
    }

    deserializer.deserialize_any(LogVisitor)
  }
}

// ---------------------------------------------------------------------------
/// Workout Record: one finished session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
  pub id: String,
  pub routine_id: String,
  pub routine_name: String,
  pub completed_at: DateTime<Utc>,
  #[serde(default)]
  pub log: WorkoutLog,
}

/// For inserting new workout records (without id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkoutRecord {
  pub routine_id: String,
  pub routine_name: String,
  pub completed_at: DateTime<Utc>,
  pub log: WorkoutLog,
}

// ---------------------------------------------------------------------------
/// Active Workout: a session in progress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveWorkout {
  pub routine_id: String,
  pub routine_name: String,
  pub started_at: DateTime<Utc>,
  pub log: WorkoutLog,
}

impl ActiveWorkout {
  /// Start a session with `exercise.sets` blank sets per exercise
  pub fn start(routine: &Routine, exercises: &[Exercise]) -> Self {
    let log = exercises
      .iter()
      .map(|e| {
        let count = usize::try_from(e.sets).unwrap_or(0);
        (e.id.clone(), vec![SetEntry::default(); count])
      })
      .collect();

    Self {
      routine_id: routine.id.clone(),
      routine_name: routine.name.clone(),
      started_at: Utc::now(),
      log,
    }
  }

  fn set_mut(&mut self, exercise_id: &str, index: usize) -> Result<&mut SetEntry, AppError> {
    let sets = self
      .log
      .get_mut(exercise_id)
      .ok_or_else(|| AppError::NotFound(format!("exercise {} in this workout", exercise_id)))?;
    sets
      .get_mut(index)
      .ok_or_else(|| AppError::NotFound(format!("set {} of exercise {}", index + 1, exercise_id)))
  }

  /// Edit weight or reps of a set that has not been completed yet
  pub fn update_set(
    &mut self,
    exercise_id: &str,
    index: usize,
    field: SetField,
    value: impl Into<String>,
  ) -> Result<(), AppError> {
    let set = self.set_mut(exercise_id, index)?;
    if set.done {
      return Err(AppError::SetLocked {
        exercise_id: exercise_id.to_string(),
        index,
      });
    }
    match field {
      SetField::Weight => set.weight = value.into(),
      SetField::Reps => set.reps = value.into(),
    }
    Ok(())
  }

  pub fn complete_set(&mut self, exercise_id: &str, index: usize) -> Result<(), AppError> {
    self.set_mut(exercise_id, index)?.done = true;
    Ok(())
  }

  pub fn finish(self, completed_at: DateTime<Utc>) -> NewWorkoutRecord {
    NewWorkoutRecord {
      routine_id: self.routine_id,
      routine_name: self.routine_name,
      completed_at,
      log: self.log,
    }
  }
}
