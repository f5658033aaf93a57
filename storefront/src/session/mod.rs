// storefront/src/session/mod.rs

//! In-process session store. Each session owns an identity and a cart.

pub mod cart;

pub use cart::SessionCart;

use crate::services::auth_guard::AuthState;
use eshop_pipeline::ContextData;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SessionState {
  pub auth: AuthState,
  pub cart: SessionCart,
  pub last_seen: Instant,
}

impl SessionState {
  fn new() -> Self {
    Self {
      auth: AuthState::Anonymous,
      cart: SessionCart::new(),
      last_seen: Instant::now(),
    }
  }

  /// False for an anonymous session with an empty cart, which has nothing worth storing.
  pub fn holds_data(&self) -> bool {
    self.auth.is_authenticated() || !self.cart.is_empty()
  }
}

/// A live session: its id plus the lockable state shared with pipelines.
#[derive(Debug, Clone)]
pub struct Session {
  pub id: Uuid,
  pub state: ContextData<SessionState>,
}

/// Sessions keyed by a random id, expiring after `ttl` without activity.
pub struct SessionStore {
  ttl: Duration,
  sessions: RwLock<HashMap<Uuid, ContextData<SessionState>>>,
}

impl SessionStore {
  pub fn new(ttl: Duration) -> Self {
    Self {
      ttl,
      sessions: RwLock::new(HashMap::new()),
    }
  }

  pub fn ttl(&self) -> Duration {
    self.ttl
  }

  /// Starts a fresh anonymous session and stores it.
  pub fn open(&self) -> Session {
    let session = Self::transient();
    self.adopt(&session);
    session
  }

  /// A fresh anonymous session that is not stored. Requests that never write to their
  /// session leave nothing behind; [`SessionStore::adopt`] stores it once they do.
  pub fn transient() -> Session {
    Session {
      id: Uuid::new_v4(),
      state: ContextData::new(SessionState::new()),
    }
  }

  /// Stores `session` under its id. Storing the same session again is a no-op.
  pub fn adopt(&self, session: &Session) {
    let mut sessions = self.sessions.write();
    if !sessions.contains_key(&session.id) {
      sessions.insert(session.id, session.state.clone());
      debug!(session_id = %session.id, "Session stored.");
    }
  }

  /// Moves `state` to a new id and forgets `old_id`, so an id handed out before login
  /// never carries the authenticated identity.
  pub fn rotate(&self, old_id: Uuid, state: ContextData<SessionState>) -> Session {
    let session = Session {
      id: Uuid::new_v4(),
      state,
    };
    let mut sessions = self.sessions.write();
    sessions.remove(&old_id);
    sessions.insert(session.id, session.state.clone());
    debug!(old_session_id = %old_id, session_id = %session.id, "Session id rotated.");
    session
  }

  /// Drops every session idle for at least the TTL. Returns how many were dropped.
  pub fn purge_expired(&self) -> usize {
    let now = Instant::now();
    let mut sessions = self.sessions.write();
    let before = sessions.len();
    sessions.retain(|_, s| now.duration_since(s.read().last_seen) < self.ttl);
    let purged = before - sessions.len();
    if purged > 0 {
      debug!(purged, "Expired sessions purged.");
    }
    purged
  }

  /// Returns the session for `id` and marks it as seen.
  ///
  /// Unknown and expired ids yield `None`; an expired entry is dropped, so its identity
  /// and cart are gone.
  pub fn resume(&self, id: Uuid) -> Option<Session> {
    let now = Instant::now();
    let state = self.sessions.read().get(&id).cloned()?;

    let expired = {
      let mut guard = state.write();
      if now.duration_since(guard.last_seen) >= self.ttl {
        true
      } else {
        guard.last_seen = now;
        false
      }
    };

    if expired {
      self.sessions.write().remove(&id);
      debug!(session_id = %id, "Session expired.");
      return None;
    }
    Some(Session { id, state })
  }

  /// Removes the session. Unknown ids are ignored.
  pub fn end(&self, id: Uuid) {
    if self.sessions.write().remove(&id).is_some() {
      debug!(session_id = %id, "Session ended.");
    }
  }

  pub fn len(&self) -> usize {
    self.sessions.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.sessions.read().is_empty()
  }
}

/// Cart lines taken out of a session for checkout.
///
/// Until [`CartClaim::settle`] is called the lines still belong to the session: dropping
/// the claim puts them back into its cart, next to anything added in the meantime.
#[derive(Debug)]
pub struct CartClaim {
  state: ContextData<SessionState>,
  lines: Vec<(i64, u32)>,
  settled: bool,
}

impl CartClaim {
  /// Empties the session's cart into a claim. `None` when there is nothing to claim.
  pub fn take(state: &ContextData<SessionState>) -> Option<Self> {
    let lines = state.write().cart.take_lines();
    if lines.is_empty() {
      return None;
    }
    Some(Self {
      state: state.clone(),
      lines,
      settled: false,
    })
  }

  /// Claimed lines in ascending product id order.
  pub fn lines(&self) -> &[(i64, u32)] {
    &self.lines
  }

  /// The lines were ordered; they do not go back to the cart.
  pub fn settle(mut self) {
    self.settled = true;
  }
}

impl Drop for CartClaim {
  fn drop(&mut self) {
    if !self.settled {
      self.state.write().cart.restore(&self.lines);
      debug!(lines = self.lines.len(), "Claimed cart lines returned to the session.");
    }
  }
}
