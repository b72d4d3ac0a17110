//! Current-user context
//!
//! Holds the identity handed over by the identity provider. Lifecycle is
//! signed-out -> signed-in -> signed-out; every data command asks the session
//! for the signed-in user and scopes its queries by that uid.

use tokio::sync::watch;

use crate::error::AppError;
use crate::models::Identity;

#[derive(Debug)]
pub struct Session {
  current: watch::Sender<Option<Identity>>,
}

impl Default for Session {
  fn default() -> Self {
    Self::new()
  }
}

impl Session {
  /// Starts signed out
  pub fn new() -> Self {
    let (current, _) = watch::channel(None);
    Self { current }
  }

  pub fn sign_in(&self, identity: Identity) {
    tracing::info!(uid = %identity.uid, "signed in");
    self.current.send_replace(Some(identity));
  }

  pub fn sign_out(&self) {
    if let Some(previous) = self.current.send_replace(None) {
      tracing::info!(uid = %previous.uid, "signed out");
    }
  }

  pub fn current(&self) -> Option<Identity> {
    self.current.borrow().clone()
  }

  pub fn is_signed_in(&self) -> bool {
    self.current.borrow().is_some()
  }

  pub fn require_user(&self) -> Result<Identity, AppError> {
    self.current().ok_or(AppError::NotAuthenticated)
  }

  /// Watch sign-in / sign-out transitions
  pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
    self.current.subscribe()
  }
}
