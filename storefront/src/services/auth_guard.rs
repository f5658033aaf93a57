// storefront/src/services/auth_guard.rs

//! Auth Guard: the identity attached to a session and the checks built on it.

use crate::errors::{AppError, Result};
use serde::Serialize;

/// Identity of a session.
///
/// Starts `Anonymous`; becomes `Authenticated` after a successful login and returns to
/// `Anonymous` on logout or session expiry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum AuthState {
  #[default]
  Anonymous,
  #[serde(rename_all = "camelCase")]
  Authenticated { user_id: i64, is_admin: bool },
}

impl AuthState {
  pub fn is_authenticated(&self) -> bool {
    matches!(self, AuthState::Authenticated { .. })
  }

  pub fn user_id(&self) -> Option<i64> {
    match self {
      AuthState::Authenticated { user_id, .. } => Some(*user_id),
      AuthState::Anonymous => None,
    }
  }

  /// Id of the authenticated user, or [`AppError::Unauthorized`].
  pub fn require_authenticated(&self) -> Result<i64> {
    self.user_id().ok_or(AppError::Unauthorized)
  }

  /// Id of the authenticated admin, or [`AppError::Forbidden`] for anonymous callers and
  /// regular users alike.
  pub fn require_admin(&self) -> Result<i64> {
    match self {
      AuthState::Authenticated { user_id, is_admin: true } => Ok(*user_id),
      _ => Err(AppError::Forbidden),
    }
  }
}
