// storefront/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use eshop_pipeline::{ContextData, PipelineResult};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::db::catalog;
use crate::errors::AppError;
use crate::models::CartView;
use crate::pipelines::contexts::AddToCartCtxData;
use crate::session::SessionCart;
use crate::state::AppState;
use crate::web::extractors::SessionHandle;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartPayload {
  pub product_id: i64,
  pub quantity: Option<i64>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartPayload {
  pub product_id: i64,
}

/// Current cart joined against the catalog.
async fn current_view(app_state: &AppState, session: &SessionHandle) -> Result<CartView, AppError> {
  let cart: SessionCart = session.state().read().cart.clone();
  let products = catalog::find_many(&app_state.db_pool, &cart.product_ids()).await?;
  let view = cart.view(&products);
  if view.has_unavailable_lines {
    debug!("Cart references products that no longer exist.");
  }
  Ok(view)
}

#[instrument(name = "handler::view_cart", skip_all, fields(session_id = %session.id()))]
pub async fn view_cart_handler(
  app_state: web::Data<AppState>,
  session: SessionHandle,
) -> Result<HttpResponse, AppError> {
  let view = current_view(&app_state, &session).await?;
  Ok(session.attach(HttpResponse::Ok().json(view), &app_state))
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, session, req_payload),
  fields(session_id = %session.id(), product_id = req_payload.product_id, quantity = ?req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  session: SessionHandle,
  req_payload: web::Json<AddToCartPayload>,
) -> Result<HttpResponse, AppError> {
  let ctx = ContextData::new(AddToCartCtxData::new(
    session.state().clone(),
    req_payload.product_id,
    req_payload.quantity,
  ));

  match app_state.pipelines.run(ctx).await? {
    PipelineResult::Completed => {
      let view = current_view(&app_state, &session).await?;
      Ok(session.attach(HttpResponse::Ok().json(view), &app_state))
    }
    PipelineResult::Stopped => {
      warn!("Add to cart pipeline was stopped by a handler.");
      Err(AppError::Internal("Adding to cart was halted.".to_string()))
    }
  }
}

#[instrument(
  name = "handler::remove_from_cart",
  skip(app_state, session, req_payload),
  fields(session_id = %session.id(), product_id = req_payload.product_id)
)]
pub async fn remove_from_cart_handler(
  app_state: web::Data<AppState>,
  session: SessionHandle,
  req_payload: web::Json<RemoveFromCartPayload>,
) -> Result<HttpResponse, AppError> {
  session.state().write().cart.remove(req_payload.product_id);
  let view = current_view(&app_state, &session).await?;
  Ok(session.attach(HttpResponse::Ok().json(view), &app_state))
}
