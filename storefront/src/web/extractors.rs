// storefront/src/web/extractors.rs

//! Per-request session capability.

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::auth_guard::AuthState;
use crate::session::{Session, SessionState, SessionStore};
use crate::state::AppState;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{web, FromRequest, HttpRequest, HttpResponse};
use eshop_pipeline::ContextData;
use futures_util::future::{ready, Ready};
use tracing::{debug, error};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "eshop_session";

/// The caller's session, resumed from the `eshop_session` cookie or freshly created.
///
/// A fresh session is not stored until something is written to it. Handlers call
/// [`SessionHandle::attach`] on their response, which stores such a session and sends its
/// cookie.
#[derive(Debug, Clone)]
pub struct SessionHandle {
  session: Session,
  is_new: bool,
}

impl SessionHandle {
  pub fn id(&self) -> Uuid {
    self.session.id
  }

  pub fn state(&self) -> &ContextData<SessionState> {
    &self.session.state
  }

  pub fn auth(&self) -> AuthState {
    self.session.state.read().auth
  }

  pub fn is_new(&self) -> bool {
    self.is_new
  }

  /// Gives the session a new id after a change of identity. The state, cart included,
  /// moves along; the old id stops working.
  pub fn renew(self, app_state: &AppState) -> SessionHandle {
    if self.is_new {
      // The id was never sent to anyone.
      return self;
    }
    let session = app_state.sessions.rotate(self.session.id, self.session.state.clone());
    SessionHandle { session, is_new: true }
  }

  /// Stores a session created by this request once it holds data, and sets its cookie on
  /// `response`.
  pub fn attach(&self, mut response: HttpResponse, app_state: &AppState) -> HttpResponse {
    if self.is_new && self.session.state.read().holds_data() {
      app_state.sessions.adopt(&self.session);
      let cookie = session_cookie(self.session.id, &app_state.config);
      if let Err(e) = response.add_cookie(&cookie) {
        error!(error = %e, "Failed to set session cookie.");
      }
    }
    response
  }
}

pub fn session_cookie(id: Uuid, config: &AppConfig) -> Cookie<'static> {
  Cookie::build(SESSION_COOKIE, id.to_string())
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .secure(config.session_cookie_secure)
    .finish()
}

/// A cookie that makes the client forget its session id.
pub fn removal_cookie() -> Cookie<'static> {
  let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
  cookie.make_removal();
  cookie
}

impl FromRequest for SessionHandle {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let Some(app_state) = req.app_data::<web::Data<AppState>>() else {
      error!("AppState missing from app data.");
      return ready(Err(AppError::Internal("Application state is not configured.".to_string())));
    };

    let resumed = req
      .cookie(SESSION_COOKIE)
      .and_then(|c| Uuid::parse_str(c.value()).ok())
      .and_then(|id| app_state.sessions.resume(id));

    let handle = match resumed {
      Some(session) => SessionHandle { session, is_new: false },
      None => {
        let session = SessionStore::transient();
        debug!(session_id = %session.id, "New session for request.");
        SessionHandle { session, is_new: true }
      }
    };
    ready(Ok(handle))
  }
}
