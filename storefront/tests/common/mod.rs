// storefront/tests/common/mod.rs
#![allow(dead_code)]

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use eshop_storefront::config::AppConfig;
use eshop_storefront::db;
use eshop_storefront::state::AppState;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Fresh in-memory database with the bootstrap admin (admin/admin) and the demo catalog.
pub async fn test_state() -> AppState {
  let vars: HashMap<&str, &str> = [("SEED_DB", "true"), ("SESSION_TTL_SECS", "3600")].into_iter().collect();
  let config = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).expect("test config");

  let pool = db::connect("sqlite::memory:", 1).await.expect("in-memory pool");
  db::migrate(&pool).await.expect("migrations");
  db::bootstrap(&pool, &config).await.expect("bootstrap");

  AppState::new(pool, Arc::new(config))
}

#[derive(Debug)]
pub struct Reply {
  pub status: StatusCode,
  pub body: Value,
  pub session_cookie: Option<Cookie<'static>>,
}

/// Calls the service and collects status, JSON body and any session cookie into a [`Reply`].
macro_rules! send {
  ($app:expr, $req:expr) => {{
    let resp = actix_web::test::call_service(&$app, $req.to_request()).await;
    let status = resp.status();
    let session_cookie = resp
      .response()
      .cookies()
      .find(|c| c.name() == eshop_storefront::web::extractors::SESSION_COOKIE)
      .map(|c| c.into_owned());
    let bytes = actix_web::test::read_body(resp).await;
    let body = if bytes.is_empty() {
      serde_json::Value::Null
    } else {
      serde_json::from_slice(&bytes).expect("JSON body")
    };
    $crate::common::Reply {
      status,
      body,
      session_cookie,
    }
  }};
}

pub fn with_session(req: TestRequest, cookie: Option<&Cookie<'static>>) -> TestRequest {
  match cookie {
    Some(c) => req.cookie(c.clone()),
    None => req,
  }
}

pub fn post_json(uri: &str, body: Value, cookie: Option<&Cookie<'static>>) -> TestRequest {
  with_session(TestRequest::post().uri(uri).set_json(body), cookie)
}

pub fn get(uri: &str, cookie: Option<&Cookie<'static>>) -> TestRequest {
  with_session(TestRequest::get().uri(uri), cookie)
}

pub fn delete(uri: &str, cookie: Option<&Cookie<'static>>) -> TestRequest {
  with_session(TestRequest::delete().uri(uri), cookie)
}

pub fn credentials(username: &str, password: &str) -> Value {
  json!({ "username": username, "password": password })
}

/// Id of the demo product called `name`.
pub fn product_id(catalog: &Value, name: &str) -> i64 {
  catalog
    .as_array()
    .and_then(|products| products.iter().find(|p| p["name"] == name))
    .and_then(|p| p["id"].as_i64())
    .unwrap_or_else(|| panic!("product {} in catalog", name))
}

/// Builds the full application service over `state`.
macro_rules! app {
  ($state:expr) => {
    actix_web::test::init_service(
      actix_web::App::new()
        .app_data(actix_web::web::Data::new($state.clone()))
        .configure(eshop_storefront::web::configure_app_routes),
    )
    .await
  };
}
