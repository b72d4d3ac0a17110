use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated identity handed over by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub uid: String,
  pub email: Option<String>,
}

impl Identity {
  pub fn new(uid: impl Into<String>, email: Option<String>) -> Self {
    Self {
      uid: uid.into(),
      email,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
  pub uid: String,
  pub email: Option<String>,
  pub display_name: Option<String>,
  pub created_at: DateTime<Utc>,
}
