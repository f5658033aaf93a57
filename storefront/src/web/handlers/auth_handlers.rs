// storefront/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use eshop_pipeline::{ContextData, PipelineResult};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::pipelines::contexts::{LoginCtxData, RegisterCtxData};
use crate::state::AppState;
use crate::web::extractors::{removal_cookie, SessionHandle};

#[derive(Deserialize)]
pub struct CredentialsPayload {
  pub username: String,
  pub password: String,
}

// Keeps the password out of logs.
impl std::fmt::Debug for CredentialsPayload {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CredentialsPayload")
      .field("username", &self.username)
      .finish_non_exhaustive()
  }
}

fn halted(operation: &str) -> AppError {
  warn!(%operation, "Pipeline was stopped by a handler.");
  AppError::Internal(format!("{} was halted.", operation))
}

#[instrument(name = "handler::register", skip(app_state, req_payload), fields(username = %req_payload.username))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CredentialsPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let ctx = ContextData::new(RegisterCtxData::new(
    app_state.db_pool.clone(),
    payload.username,
    payload.password,
  ));

  match app_state.pipelines.run(ctx.clone()).await? {
    PipelineResult::Completed => {
      let user = ctx
        .read()
        .created_user
        .clone()
        .ok_or_else(|| AppError::Internal("Registration completed without a user.".to_string()))?;
      info!(user_id = user.id, "Registration successful.");
      Ok(HttpResponse::Created().json(json!({
        "userId": user.id,
        "username": user.username,
      })))
    }
    PipelineResult::Stopped => Err(halted("Registration")),
  }
}

#[instrument(name = "handler::login", skip(app_state, session, req_payload), fields(username = %req_payload.username))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  session: SessionHandle,
  req_payload: web::Json<CredentialsPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let ctx = ContextData::new(LoginCtxData::new(
    app_state.db_pool.clone(),
    session.state().clone(),
    payload.username,
    payload.password,
  ));

  match app_state.pipelines.run(ctx.clone()).await? {
    PipelineResult::Completed => {
      let user = ctx
        .read()
        .user
        .clone()
        .ok_or_else(|| AppError::Internal("Login completed without a user.".to_string()))?;
      let response = HttpResponse::Ok().json(json!({
        "userId": user.id,
        "username": user.username,
        "isAdmin": user.is_admin,
      }));
      let session = session.renew(&app_state);
      Ok(session.attach(response, &app_state))
    }
    PipelineResult::Stopped => Err(halted("Login")),
  }
}

#[instrument(name = "handler::logout", skip_all, fields(session_id = %session.id()))]
pub async fn logout_handler(app_state: web::Data<AppState>, session: SessionHandle) -> HttpResponse {
  app_state.sessions.end(session.id());
  info!("Session ended by logout.");
  HttpResponse::Ok()
    .cookie(removal_cookie())
    .json(json!({ "message": "Logged out." }))
}

#[instrument(name = "handler::me", skip_all)]
pub async fn me_handler(app_state: web::Data<AppState>, session: SessionHandle) -> HttpResponse {
  let response = HttpResponse::Ok().json(session.auth());
  session.attach(response, &app_state)
}
