// storefront/src/session/cart.rs

//! Session Cart: product id → requested quantity, held in session state only.

use crate::errors::{AppError, Result};
use crate::models::{CartLineView, CartView, Product};
use std::collections::{BTreeMap, HashMap};

/// Quantities per product id. Products are not looked up when lines are added; they are
/// re-validated when the cart is viewed or checked out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCart {
  lines: BTreeMap<i64, u32>,
}

impl SessionCart {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds `quantity` (default 1) of `product_id`, summing with any existing line.
  ///
  /// Fails with [`AppError::InvalidQuantity`] for zero, negative or out-of-range
  /// quantities; the cart is unchanged in that case.
  pub fn add(&mut self, product_id: i64, quantity: Option<i64>) -> Result<u32> {
    let requested = quantity.unwrap_or(1);
    if requested <= 0 {
      return Err(AppError::InvalidQuantity);
    }
    let requested = u32::try_from(requested).map_err(|_| AppError::InvalidQuantity)?;

    let current = self.lines.get(&product_id).copied().unwrap_or(0);
    let updated = current.checked_add(requested).ok_or(AppError::InvalidQuantity)?;
    self.lines.insert(product_id, updated);
    Ok(updated)
  }

  /// Removes the line for `product_id`. Absent ids are a no-op.
  pub fn remove(&mut self, product_id: i64) {
    self.lines.remove(&product_id);
  }

  pub fn clear(&mut self) {
    self.lines.clear();
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  pub fn len(&self) -> usize {
    self.lines.len()
  }

  pub fn quantity_of(&self, product_id: i64) -> Option<u32> {
    self.lines.get(&product_id).copied()
  }

  pub fn product_ids(&self) -> Vec<i64> {
    self.lines.keys().copied().collect()
  }

  /// Lines in ascending product id order.
  pub fn lines(&self) -> Vec<(i64, u32)> {
    self.lines.iter().map(|(id, qty)| (*id, *qty)).collect()
  }

  /// Empties the cart and returns what it held, in ascending product id order.
  pub fn take_lines(&mut self) -> Vec<(i64, u32)> {
    std::mem::take(&mut self.lines).into_iter().collect()
  }

  /// Puts previously taken lines back, summing with lines added since.
  pub fn restore(&mut self, lines: &[(i64, u32)]) {
    for &(product_id, quantity) in lines {
      let line = self.lines.entry(product_id).or_insert(0);
      *line = line.saturating_add(quantity);
    }
  }

  /// Joins the lines against `products` for display.
  ///
  /// Lines whose product is missing are kept and flagged, but contribute nothing to the
  /// total.
  pub fn view(&self, products: &HashMap<i64, Product>) -> CartView {
    let mut total: i64 = 0;
    let mut has_unavailable_lines = false;

    let lines = self
      .lines
      .iter()
      .map(|(&product_id, &quantity)| match products.get(&product_id) {
        Some(product) => {
          let subtotal = product.price.saturating_mul(i64::from(quantity));
          total = total.saturating_add(subtotal);
          CartLineView {
            product_id,
            quantity,
            available: true,
            name: Some(product.name.clone()),
            unit_price: Some(product.price),
            subtotal: Some(subtotal),
          }
        }
        None => {
          has_unavailable_lines = true;
          CartLineView {
            product_id,
            quantity,
            available: false,
            name: None,
            unit_price: None,
            subtotal: None,
          }
        }
      })
      .collect();

    CartView {
      lines,
      total,
      has_unavailable_lines,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  fn product(id: i64, price: i64) -> Product {
    Product {
      id,
      name: format!("product-{}", id),
      description: String::new(),
      price,
      image_ref: None,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  #[test]
  fn add_defaults_to_one() {
    let mut cart = SessionCart::new();
    assert_eq!(cart.add(5, None).unwrap(), 1);
    assert_eq!(cart.quantity_of(5), Some(1));
  }

  #[test]
  fn repeated_adds_sum_quantities() {
    let mut cart = SessionCart::new();
    cart.add(7, Some(2)).unwrap();
    cart.add(7, Some(3)).unwrap();
    assert_eq!(cart.quantity_of(7), Some(5));
    assert_eq!(cart.len(), 1);
  }

  #[test]
  fn non_positive_quantities_are_rejected_without_change() {
    let mut cart = SessionCart::new();
    cart.add(1, Some(4)).unwrap();
    let before = cart.clone();

    assert!(matches!(cart.add(1, Some(0)), Err(AppError::InvalidQuantity)));
    assert!(matches!(cart.add(1, Some(-3)), Err(AppError::InvalidQuantity)));
    assert!(matches!(cart.add(2, Some(i64::MAX)), Err(AppError::InvalidQuantity)));
    assert_eq!(cart, before);
  }

  #[test]
  fn quantity_overflow_is_rejected() {
    let mut cart = SessionCart::new();
    cart.add(1, Some(i64::from(u32::MAX))).unwrap();
    assert!(matches!(cart.add(1, Some(1)), Err(AppError::InvalidQuantity)));
    assert_eq!(cart.quantity_of(1), Some(u32::MAX));
  }

  #[test]
  fn add_then_remove_restores_prior_state() {
    let pairs = [(1_i64, 1_i64), (2, 5), (3, 1_000), (1, 2)];
    for (product_id, quantity) in pairs {
      let mut cart = SessionCart::new();
      cart.add(99, Some(2)).unwrap();
      let before = cart.clone();

      cart.add(product_id, Some(quantity)).unwrap();
      cart.remove(product_id);

      assert_eq!(cart, before, "add/remove of ({}, {})", product_id, quantity);
    }
  }

  #[test]
  fn remove_of_absent_id_is_noop() {
    let mut cart = SessionCart::new();
    cart.add(1, None).unwrap();
    cart.remove(42);
    assert_eq!(cart.lines(), vec![(1, 1)]);
  }

  #[test]
  fn view_flags_missing_products_and_excludes_them_from_total() {
    let mut cart = SessionCart::new();
    cart.add(1, Some(1)).unwrap();
    cart.add(2, Some(2)).unwrap();
    cart.add(3, Some(4)).unwrap();

    let products: HashMap<i64, Product> = [(1, product(1, 299)), (2, product(2, 799))].into_iter().collect();
    let view = cart.view(&products);

    assert_eq!(view.lines.len(), 3);
    assert_eq!(view.total, 299 + 799 * 2);
    assert!(view.has_unavailable_lines);
    let missing = &view.lines[2];
    assert_eq!(missing.product_id, 3);
    assert!(!missing.available);
    assert_eq!(missing.subtotal, None);
  }

  #[test]
  fn clear_empties_cart() {
    let mut cart = SessionCart::new();
    cart.add(1, None).unwrap();
    cart.clear();
    assert!(cart.is_empty());
    assert!(cart.view(&HashMap::new()).lines.is_empty());
  }

  #[test]
  fn taken_lines_restore_alongside_later_adds() {
    let mut cart = SessionCart::new();
    cart.add(1, Some(2)).unwrap();
    cart.add(4, Some(1)).unwrap();

    let taken = cart.take_lines();
    assert_eq!(taken, vec![(1, 2), (4, 1)]);
    assert!(cart.is_empty());

    cart.add(1, Some(3)).unwrap();
    cart.add(9, None).unwrap();
    cart.restore(&taken);
    assert_eq!(cart.lines(), vec![(1, 5), (4, 1), (9, 1)]);
  }
}
