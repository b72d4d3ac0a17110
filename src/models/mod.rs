pub mod insight;
pub mod routine;
pub mod user;
pub mod workout;

pub use insight::{Insight, PlateauWarning};
pub use routine::{Exercise, ExerciseMap, NewExercise, NewRoutine, Routine};
pub use user::{Identity, UserProfile};
pub use workout::{ActiveWorkout, NewWorkoutRecord, SetEntry, SetField, WorkoutLog, WorkoutRecord};
