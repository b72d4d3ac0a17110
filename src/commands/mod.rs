//! User-facing operations
//!
//! One async function per action. Every command takes the shared `AppState`
//! and the `Session`, and scopes all reads and writes by the signed-in uid.

pub mod planner;
pub mod progress;
pub mod routines;
pub mod users;
pub mod workouts;

use chrono::{DateTime, Utc};

/// New document id
pub(crate) fn new_id() -> String {
  uuid::Uuid::new_v4().to_string()
}

pub(crate) fn now() -> DateTime<Utc> {
  Utc::now()
}
