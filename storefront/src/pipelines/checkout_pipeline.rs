// storefront/src/pipelines/checkout_pipeline.rs

//! Checkout: converts the session cart into a persisted order.
//!
//! Steps, in order:
//! 1. `require_authenticated`: anonymous sessions fail with `Unauthorized`.
//! 2. `claim_cart`: moves every line out of the session cart under its lock. An empty
//!    cart fails with `EmptyCart`, which is also what a second checkout of the same cart
//!    sees while the first is in flight.
//! 3. `resolve_cart_prices`: re-reads every product from the catalog. A missing product
//!    fails the whole checkout with `ProductUnavailable`. Prices held anywhere else are
//!    never used.
//! 4. `persist_order`: writes the order and its items in one transaction, then settles
//!    the claim. Storage failures in steps 3 and 4 become `CheckoutFailed`.
//!
//! A claim that is not settled returns its lines to the cart when the run's context is
//! dropped, so every failure leaves the cart as it was, plus anything added meanwhile,
//! and the order tables untouched.

use crate::db::{catalog, orders, orders::NewOrderLine};
use crate::errors::AppError;
use crate::pipelines::contexts::CheckoutCtxData;
use crate::session::CartClaim;
use eshop_pipeline::{ContextData, Pipeline, PipelineControl, StepDef};
use tracing::{error, info, warn};

/// Prices `cart_lines` with `price_of` and sums the subtotals in integer units.
///
/// Fails with `ProductUnavailable` for the first line whose product is missing and with
/// `Validation` when a subtotal or the total does not fit in an `i64`.
pub fn price_lines(
  cart_lines: &[(i64, u32)],
  price_of: impl Fn(i64) -> Option<i64>,
) -> Result<(Vec<NewOrderLine>, i64), AppError> {
  let mut total: i64 = 0;
  let mut order_lines = Vec::with_capacity(cart_lines.len());

  for &(product_id, quantity) in cart_lines {
    let unit_price = price_of(product_id).ok_or(AppError::ProductUnavailable(product_id))?;
    let quantity = i64::from(quantity);
    let subtotal = unit_price
      .checked_mul(quantity)
      .ok_or_else(|| AppError::Validation(format!("Subtotal for product {} is too large.", product_id)))?;
    total = total
      .checked_add(subtotal)
      .ok_or_else(|| AppError::Validation("Order total is too large.".to_string()))?;

    order_lines.push(NewOrderLine {
      product_id,
      quantity,
      unit_price,
    });
  }

  Ok((order_lines, total))
}

pub fn build_checkout_pipeline() -> Pipeline<CheckoutCtxData, AppError> {
  let mut p = Pipeline::<CheckoutCtxData, AppError>::new([
    StepDef::required("require_authenticated"),
    StepDef::required("claim_cart"),
    StepDef::required("resolve_cart_prices"),
    StepDef::required("persist_order"),
  ]);

  p.on("require_authenticated", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let session = ctx_data.read().session.clone();
      let auth = session.read().auth;
      let user_id = auth.require_authenticated().map_err(|e| {
        warn!("Checkout attempted without login.");
        e
      })?;
      ctx_data.write().user_id = Some(user_id);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on("claim_cart", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let session = ctx_data.read().session.clone();
      let Some(claim) = CartClaim::take(&session) else {
        warn!("Checkout of an empty cart.");
        return Err(AppError::EmptyCart);
      };
      ctx_data.write().cart_claim = Some(claim);
      Ok(PipelineControl::Continue)
    })
  });

  p.on("resolve_cart_prices", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (cart_lines, db_pool) = {
        let guard = ctx_data.read();
        let claim = guard
          .cart_claim
          .as_ref()
          .ok_or_else(|| AppError::Internal("resolve_cart_prices ran without a claimed cart".to_string()))?;
        (claim.lines().to_vec(), guard.db_pool.clone())
      };

      let ids: Vec<i64> = cart_lines.iter().map(|(id, _)| *id).collect();
      let products = catalog::find_many(&db_pool, &ids).await.map_err(|e| match e {
        AppError::Database(source) => {
          error!(error = %source, "Catalog read failed during checkout.");
          AppError::CheckoutFailed { source }
        }
        other => other,
      })?;

      let (order_lines, total) = price_lines(&cart_lines, |id| products.get(&id).map(|p| p.price)).map_err(|e| {
        warn!(error = %e, "Cart could not be priced.");
        e
      })?;

      let mut guard = ctx_data.write();
      guard.order_lines = order_lines;
      guard.total = total;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on("persist_order", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (user_id, order_lines, total, db_pool) = {
        let guard = ctx_data.read();
        let user_id = guard
          .user_id
          .ok_or_else(|| AppError::Internal("persist_order ran without an authenticated user".to_string()))?;
        (user_id, guard.order_lines.clone(), guard.total, guard.db_pool.clone())
      };

      let order = orders::insert_order_with_items(&db_pool, user_id, total, &order_lines)
        .await
        .map_err(|source| {
          error!(error = %source, "Order transaction failed and was rolled back.");
          AppError::CheckoutFailed { source }
        })?;

      info!(order_id = order.id, user_id, total, lines = order_lines.len(), "Order placed.");
      let mut guard = ctx_data.write();
      if let Some(claim) = guard.cart_claim.take() {
        claim.settle();
      }
      guard.order = Some(order);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p
}
