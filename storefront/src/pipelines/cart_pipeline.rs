// storefront/src/pipelines/cart_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::contexts::AddToCartCtxData;
use eshop_pipeline::{ContextData, Pipeline, PipelineControl, StepDef};
use tracing::{debug, warn};

/// Builds the add-to-cart pipeline. The catalog is not consulted; lines are validated
/// against it at view and checkout time.
pub fn build_add_to_cart_pipeline() -> Pipeline<AddToCartCtxData, AppError> {
  let mut p = Pipeline::<AddToCartCtxData, AppError>::new([
    StepDef::required("validate_cart_input"),
    StepDef::required("add_to_session_cart"),
  ]);

  p.on("validate_cart_input", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let quantity = ctx_data.read().quantity;
      if let Some(q) = quantity {
        if q <= 0 {
          warn!(quantity = q, "Invalid quantity for add to cart.");
          return Err(AppError::InvalidQuantity);
        }
      }
      Ok(PipelineControl::Continue)
    })
  });

  p.on("add_to_session_cart", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (session, product_id, quantity) = {
        let guard = ctx_data.read();
        (guard.session.clone(), guard.product_id, guard.quantity)
      };

      let line_quantity = session.write().cart.add(product_id, quantity)?;
      ctx_data.write().line_quantity = Some(line_quantity);
      debug!(product_id, line_quantity, "Cart line updated.");
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p
}
