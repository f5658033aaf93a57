// storefront/src/models/order_item.rs

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
  pub id: i64,
  pub order_id: i64,
  pub product_id: i64,
  pub quantity: i64,
  /// Price snapshot taken at checkout.
  pub unit_price: i64,
}

impl OrderItem {
  pub fn subtotal(&self) -> i64 {
    self.unit_price * self.quantity
  }
}
