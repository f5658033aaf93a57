// storefront/src/pipelines/login_pipeline.rs

use crate::db::users;
use crate::errors::AppError;
use crate::pipelines::contexts::LoginCtxData;
use crate::services::{auth_guard::AuthState, auth_service};
use eshop_pipeline::{ContextData, Pipeline, PipelineControl, StepDef};
use tracing::{info, warn};

/// Builds the login pipeline.
///
/// Every failure to authenticate is reported as [`AppError::InvalidCredentials`], whether
/// the username is unknown or the password is wrong.
pub fn build_login_pipeline() -> Pipeline<LoginCtxData, AppError> {
  let mut p = Pipeline::<LoginCtxData, AppError>::new([
    StepDef::required("validate_login_input"),
    StepDef::required("fetch_user"),
    StepDef::required("verify_password"),
    StepDef::required("establish_session"),
  ]);

  p.on("validate_login_input", |ctx_data: ContextData<LoginCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let trimmed = guard.username.trim().to_string();
      if trimmed.is_empty() || guard.password.is_empty() {
        warn!("Login without username or password.");
        return Err(AppError::InvalidCredentials);
      }
      guard.username = trimmed;
      Ok(PipelineControl::Continue)
    })
  });

  p.on("fetch_user", |ctx_data: ContextData<LoginCtxData>| {
    Box::pin(async move {
      let (username, db_pool) = {
        let guard = ctx_data.read();
        (guard.username.clone(), guard.db_pool.clone())
      };

      let Some(user) = users::find_by_username(&db_pool, &username).await? else {
        warn!(%username, "Login for unknown username.");
        return Err(AppError::InvalidCredentials);
      };
      ctx_data.write().user = Some(user);
      Ok(PipelineControl::Continue)
    })
  });

  p.on("verify_password", |ctx_data: ContextData<LoginCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      let user = guard
        .user
        .as_ref()
        .ok_or_else(|| AppError::Internal("verify_password ran without a fetched user".to_string()))?;

      if !auth_service::verify_password(&user.password_hash, &guard.password)? {
        warn!(user_id = user.id, "Login with wrong password.");
        return Err(AppError::InvalidCredentials);
      }
      Ok(PipelineControl::Continue)
    })
  });

  // The cart is kept; only the identity changes.
  p.on("establish_session", |ctx_data: ContextData<LoginCtxData>| {
    Box::pin(async move {
      let (auth, session) = {
        let guard = ctx_data.read();
        let user = guard
          .user
          .as_ref()
          .ok_or_else(|| AppError::Internal("establish_session ran without a fetched user".to_string()))?;
        let auth = AuthState::Authenticated {
          user_id: user.id,
          is_admin: user.is_admin,
        };
        (auth, guard.session.clone())
      };

      session.write().auth = auth;
      ctx_data.write().established = Some(auth);
      info!(user_id = ?auth.user_id(), "User logged in.");
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::test_support::memory_pool;
  use crate::session::SessionStore;
  use std::time::Duration;

  async fn pool_with_user(username: &str, password: &str, is_admin: bool) -> sqlx::SqlitePool {
    let pool = memory_pool().await;
    let hash = auth_service::hash_password(password).unwrap();
    users::insert(&pool, username, &hash, is_admin).await.unwrap();
    pool
  }

  #[actix_rt::test]
  async fn valid_credentials_authenticate_and_keep_cart() {
    let pool = pool_with_user("admin", "admin", true).await;
    let store = SessionStore::new(Duration::from_secs(60));
    let session = store.open();
    session.state.write().cart.add(4, Some(2)).unwrap();

    let ctx = ContextData::new(LoginCtxData::new(pool, session.state.clone(), "admin".into(), "admin".into()));
    build_login_pipeline().run(ctx).await.unwrap();

    let state = session.state.read();
    assert!(matches!(state.auth, AuthState::Authenticated { is_admin: true, .. }));
    assert_eq!(state.cart.quantity_of(4), Some(2));
  }

  #[actix_rt::test]
  async fn wrong_password_and_unknown_user_look_the_same() {
    let pool = pool_with_user("jana", "tajne", false).await;
    let store = SessionStore::new(Duration::from_secs(60));
    let session = store.open();

    for (username, password) in [("jana", "spatne"), ("nobody", "tajne"), ("jana", "")] {
      let ctx = ContextData::new(LoginCtxData::new(
        pool.clone(),
        session.state.clone(),
        username.into(),
        password.into(),
      ));
      let err = build_login_pipeline().run(ctx).await.unwrap_err();
      assert!(matches!(err, AppError::InvalidCredentials), "{} / {}", username, password);
    }
    assert_eq!(session.state.read().auth, AuthState::Anonymous);
  }
}
