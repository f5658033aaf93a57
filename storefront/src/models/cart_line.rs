// storefront/src/models/cart_line.rs

use serde::Serialize;

/// One cart line joined against the catalog for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
  pub product_id: i64,
  pub quantity: u32,
  /// False when the product no longer exists; such lines carry no price and no subtotal.
  pub available: bool,
  pub name: Option<String>,
  pub unit_price: Option<i64>,
  pub subtotal: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
  pub lines: Vec<CartLineView>,
  /// Sum of the subtotals of available lines.
  pub total: i64,
  pub has_unavailable_lines: bool,
}
