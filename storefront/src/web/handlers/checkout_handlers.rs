// storefront/src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use eshop_pipeline::{ContextData, PipelineResult};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::pipelines::contexts::CheckoutCtxData;
use crate::state::AppState;
use crate::web::extractors::SessionHandle;

#[instrument(name = "handler::checkout", skip_all, fields(session_id = %session.id()))]
pub async fn checkout_handler(
  app_state: web::Data<AppState>,
  session: SessionHandle,
) -> Result<HttpResponse, AppError> {
  let ctx = ContextData::new(CheckoutCtxData::new(app_state.db_pool.clone(), session.state().clone()));

  match app_state.pipelines.run(ctx.clone()).await {
    Ok(PipelineResult::Completed) => {
      let order = ctx.read().order.clone().ok_or_else(|| {
        warn!("Checkout completed but no order was recorded.");
        AppError::Internal("Checkout completed without an order.".to_string())
      })?;
      info!(order_id = order.id, total = order.total, "Checkout successful.");
      let response = HttpResponse::Created().json(json!({
        "orderId": order.id,
        "total": order.total,
      }));
      Ok(session.attach(response, &app_state))
    }
    Ok(PipelineResult::Stopped) => {
      warn!("Checkout pipeline was stopped by a handler.");
      Err(AppError::Internal("Checkout was halted.".to_string()))
    }
    Err(app_err) => {
      warn!(error = %app_err, retryable = app_err.is_retryable(), "Checkout failed.");
      Err(app_err)
    }
  }
}
