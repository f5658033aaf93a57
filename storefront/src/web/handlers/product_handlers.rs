// storefront/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::{info, instrument, warn};

use crate::db::catalog;
use crate::errors::AppError;
use crate::models::ProductInput;
use crate::state::AppState;
use crate::web::extractors::SessionHandle;

fn not_found(product_id: i64) -> AppError {
  warn!(product_id, "Product not found.");
  AppError::NotFound(format!("Product with ID {} not found.", product_id))
}

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let products = catalog::list_all(&app_state.db_pool).await?;
  info!(count = products.len(), "Products listed.");
  Ok(HttpResponse::Ok().json(products))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  match catalog::find_by_id(&app_state.db_pool, product_id).await? {
    Some(product) => Ok(HttpResponse::Ok().json(product)),
    None => Err(not_found(product_id)),
  }
}

#[instrument(name = "handler::create_product", skip(app_state, session, req_payload))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  session: SessionHandle,
  req_payload: web::Json<ProductInput>,
) -> Result<HttpResponse, AppError> {
  let admin_id = session.auth().require_admin()?;
  req_payload.validate()?;

  let product = catalog::create(&app_state.db_pool, &req_payload).await?;
  info!(admin_id, product_id = product.id, "Product created.");
  Ok(HttpResponse::Created().json(product))
}

#[instrument(name = "handler::update_product", skip(app_state, session, path, req_payload), fields(product_id = %path.as_ref()))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  session: SessionHandle,
  path: web::Path<i64>,
  req_payload: web::Json<ProductInput>,
) -> Result<HttpResponse, AppError> {
  let admin_id = session.auth().require_admin()?;
  req_payload.validate()?;
  let product_id = path.into_inner();

  match catalog::update(&app_state.db_pool, product_id, &req_payload).await? {
    Some(product) => {
      info!(admin_id, product_id, "Product updated.");
      Ok(HttpResponse::Ok().json(product))
    }
    None => Err(not_found(product_id)),
  }
}

#[instrument(name = "handler::delete_product", skip(app_state, session, path), fields(product_id = %path.as_ref()))]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  session: SessionHandle,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let admin_id = session.auth().require_admin()?;
  let product_id = path.into_inner();

  if catalog::delete(&app_state.db_pool, product_id).await? {
    info!(admin_id, product_id, "Product deleted.");
    Ok(HttpResponse::NoContent().finish())
  } else {
    Err(not_found(product_id))
  }
}
