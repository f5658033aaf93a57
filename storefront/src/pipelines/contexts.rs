// storefront/src/pipelines/contexts.rs

//! Data carried through each pipeline run. Handlers receive these wrapped in
//! `eshop_pipeline::ContextData`.

use crate::db::orders::NewOrderLine;
use crate::models::{Order, User};
use crate::services::auth_guard::AuthState;
use crate::session::{CartClaim, SessionState};
use eshop_pipeline::ContextData;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct RegisterCtxData {
  pub db_pool: SqlitePool,
  pub username: String,
  pub password: String,
  pub created_user: Option<User>,
}

impl RegisterCtxData {
  pub fn new(db_pool: SqlitePool, username: String, password: String) -> Self {
    Self {
      db_pool,
      username,
      password,
      created_user: None,
    }
  }
}

#[derive(Clone)]
pub struct LoginCtxData {
  pub db_pool: SqlitePool,
  pub session: ContextData<SessionState>,
  pub username: String,
  pub password: String,
  pub user: Option<User>,
  pub established: Option<AuthState>,
}

impl LoginCtxData {
  pub fn new(db_pool: SqlitePool, session: ContextData<SessionState>, username: String, password: String) -> Self {
    Self {
      db_pool,
      session,
      username,
      password,
      user: None,
      established: None,
    }
  }
}

#[derive(Clone)]
pub struct AddToCartCtxData {
  pub session: ContextData<SessionState>,
  pub product_id: i64,
  /// As requested; `None` means 1.
  pub quantity: Option<i64>,
  pub line_quantity: Option<u32>,
}

impl AddToCartCtxData {
  pub fn new(session: ContextData<SessionState>, product_id: i64, quantity: Option<i64>) -> Self {
    Self {
      session,
      product_id,
      quantity,
      line_quantity: None,
    }
  }
}

pub struct CheckoutCtxData {
  pub db_pool: SqlitePool,
  pub session: ContextData<SessionState>,
  pub user_id: Option<i64>,
  /// Lines taken out of the session cart. Dropped unsettled, they go back to the cart.
  pub cart_claim: Option<CartClaim>,
  /// Lines priced from the catalog, in cart order.
  pub order_lines: Vec<NewOrderLine>,
  pub total: i64,
  pub order: Option<Order>,
}

impl CheckoutCtxData {
  pub fn new(db_pool: SqlitePool, session: ContextData<SessionState>) -> Self {
    Self {
      db_pool,
      session,
      user_id: None,
      cart_claim: None,
      order_lines: Vec::new(),
      total: 0,
      order: None,
    }
  }
}
