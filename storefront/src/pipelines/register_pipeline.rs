// storefront/src/pipelines/register_pipeline.rs

use crate::db::users;
use crate::errors::AppError;
use crate::pipelines::contexts::RegisterCtxData;
use crate::services::auth_service;
use eshop_pipeline::{ContextData, Pipeline, PipelineControl, StepDef};
use tracing::{debug, info, warn};

/// Builds the registration pipeline. A registered user still has to log in.
pub fn build_register_pipeline() -> Pipeline<RegisterCtxData, AppError> {
  let mut p = Pipeline::<RegisterCtxData, AppError>::new([
    StepDef::required("validate_register_input"),
    StepDef::required("check_existing_username"),
    StepDef::required("create_user"),
  ]);

  p.on("validate_register_input", |ctx_data: ContextData<RegisterCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let trimmed = guard.username.trim().to_string();
      if trimmed.is_empty() || guard.password.is_empty() {
        warn!("Registration without username or password.");
        return Err(AppError::Validation("Username and password are required.".to_string()));
      }
      guard.username = trimmed;
      Ok(PipelineControl::Continue)
    })
  });

  // Fast path; the UNIQUE constraint in create_user is what actually decides.
  p.on("check_existing_username", |ctx_data: ContextData<RegisterCtxData>| {
    Box::pin(async move {
      let (username, db_pool) = {
        let guard = ctx_data.read();
        (guard.username.clone(), guard.db_pool.clone())
      };

      if users::exists(&db_pool, &username).await? {
        warn!(%username, "Registration with existing username.");
        return Err(AppError::UsernameTaken);
      }
      debug!(%username, "Username is available.");
      Ok(PipelineControl::Continue)
    })
  });

  p.on("create_user", |ctx_data: ContextData<RegisterCtxData>| {
    Box::pin(async move {
      let (username, password, db_pool) = {
        let guard = ctx_data.read();
        (guard.username.clone(), guard.password.clone(), guard.db_pool.clone())
      };

      let password_hash = auth_service::hash_password(&password)?;
      let user = users::insert(&db_pool, &username, &password_hash, false).await?;
      info!(user_id = user.id, username = %user.username, "User registered.");

      ctx_data.write().created_user = Some(user);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p
}
