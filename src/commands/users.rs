use crate::db::AppState;
use crate::error::AppError;
use crate::models::{Identity, UserProfile};
use crate::session::Session;

/// Create the profile row on first sign-in. An existing profile is returned untouched.
pub async fn ensure_user_profile(
  state: &AppState,
  identity: &Identity,
  display_name: Option<String>,
) -> Result<UserProfile, AppError> {
  let inserted = sqlx::query(
    r#"
    INSERT INTO users (uid, email, display_name, created_at)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT(uid) DO NOTHING
    "#,
  )
  .bind(&identity.uid)
  .bind(&identity.email)
  .bind(&display_name)
  .bind(super::now())
  .execute(&state.db)
  .await?
  .rows_affected();

  if inserted > 0 {
    tracing::info!(uid = %identity.uid, "created user profile");
  }

  load_profile(state, &identity.uid).await
}

/// Sign in and make sure the profile exists
pub async fn sign_in(
  state: &AppState,
  session: &Session,
  identity: Identity,
) -> Result<UserProfile, AppError> {
  let profile = ensure_user_profile(state, &identity, None).await?;
  session.sign_in(identity);
  Ok(profile)
}

pub async fn get_user_profile(state: &AppState, session: &Session) -> Result<UserProfile, AppError> {
  let user = session.require_user()?;
  load_profile(state, &user.uid).await
}

async fn load_profile(state: &AppState, uid: &str) -> Result<UserProfile, AppError> {
  sqlx::query_as::<_, UserProfile>(
    "SELECT uid, email, display_name, created_at FROM users WHERE uid = ?1",
  )
  .bind(uid)
  .fetch_optional(&state.db)
  .await?
  .ok_or_else(|| AppError::NotFound(format!("user {}", uid)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::setup_test_state;

  #[tokio::test]
  async fn test_profile_created_once() {
    let state = setup_test_state().await;
    let identity = Identity::new("u1", Some("first@example.com".into()));

    let first = ensure_user_profile(&state, &identity, Some("Ana".into())).await.unwrap();
    assert_eq!(first.display_name.as_deref(), Some("Ana"));

    let changed = Identity::new("u1", Some("second@example.com".into()));
    let second = ensure_user_profile(&state, &changed, None).await.unwrap();

    assert_eq!(second.email.as_deref(), Some("first@example.com"));
    assert_eq!(second.display_name.as_deref(), Some("Ana"));
    assert_eq!(second.created_at, first.created_at);
  }

  #[tokio::test]
  async fn test_sign_in_sets_session() {
    let state = setup_test_state().await;
    let session = Session::new();

    assert!(matches!(
      get_user_profile(&state, &session).await,
      Err(AppError::NotAuthenticated)
    ));

    sign_in(&state, &session, Identity::new("u2", None)).await.unwrap();
    let profile = get_user_profile(&state, &session).await.unwrap();
    assert_eq!(profile.uid, "u2");
  }
}
