// storefront/src/db/orders.rs

//! Order persistence. Orders and their items are only ever written together.

use crate::errors::Result;
use crate::models::{Order, OrderItem};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, instrument};

/// A resolved line ready to be written as an order item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderLine {
  pub product_id: i64,
  pub quantity: i64,
  pub unit_price: i64,
}

/// Writes the order row and every item row in one transaction.
///
/// Any failure drops the transaction before commit, which rolls it back: either the
/// order and all of its items are visible afterwards, or none of them are.
#[instrument(name = "orders::insert_order_with_items", skip(pool, lines), fields(lines = lines.len()))]
pub async fn insert_order_with_items(
  pool: &SqlitePool,
  user_id: i64,
  total: i64,
  lines: &[NewOrderLine],
) -> std::result::Result<Order, sqlx::Error> {
  let mut tx = pool.begin().await?;

  let order = sqlx::query_as::<_, Order>(
    "INSERT INTO orders (user_id, total, created_at) VALUES (?, ?, ?) RETURNING id, user_id, total, created_at",
  )
  .bind(user_id)
  .bind(total)
  .bind(Utc::now())
  .fetch_one(&mut *tx)
  .await?;

  for line in lines {
    sqlx::query("INSERT INTO order_items (order_id, product_id, quantity, unit_price) VALUES (?, ?, ?, ?)")
      .bind(order.id)
      .bind(line.product_id)
      .bind(line.quantity)
      .bind(line.unit_price)
      .execute(&mut *tx)
      .await?;
  }

  tx.commit().await?;
  debug!(order_id = order.id, "Order committed.");
  Ok(order)
}

pub async fn find_order(pool: &SqlitePool, order_id: i64) -> Result<Option<Order>> {
  let order = sqlx::query_as::<_, Order>("SELECT id, user_id, total, created_at FROM orders WHERE id = ?")
    .bind(order_id)
    .fetch_optional(pool)
    .await?;
  Ok(order)
}

pub async fn find_items(pool: &SqlitePool, order_id: i64) -> Result<Vec<OrderItem>> {
  let items = sqlx::query_as::<_, OrderItem>(
    "SELECT id, order_id, product_id, quantity, unit_price FROM order_items WHERE order_id = ? ORDER BY id",
  )
  .bind(order_id)
  .fetch_all(pool)
  .await?;
  Ok(items)
}

pub async fn count_orders(pool: &SqlitePool) -> Result<i64> {
  let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders")
    .fetch_one(pool)
    .await?;
  Ok(n)
}

pub async fn count_items(pool: &SqlitePool) -> Result<i64> {
  let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM order_items")
    .fetch_one(pool)
    .await?;
  Ok(n)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::{test_support::memory_pool, users};

  fn line(product_id: i64, quantity: i64, unit_price: i64) -> NewOrderLine {
    NewOrderLine {
      product_id,
      quantity,
      unit_price,
    }
  }

  #[actix_rt::test]
  async fn order_and_items_are_written_together() {
    let pool = memory_pool().await;
    let user = users::insert(&pool, "jana", "hash", false).await.unwrap();

    let order = insert_order_with_items(&pool, user.id, 1897, &[line(1, 1, 299), line(2, 2, 799)])
      .await
      .unwrap();

    let stored = find_order(&pool, order.id).await.unwrap().unwrap();
    assert_eq!(stored.total, 1897);
    assert_eq!(stored.user_id, user.id);
    let items = find_items(&pool, order.id).await.unwrap();
    assert_eq!(items.iter().map(OrderItem::subtotal).sum::<i64>(), 1897);
  }

  #[actix_rt::test]
  async fn failing_item_rolls_back_the_order() {
    let pool = memory_pool().await;
    let user = users::insert(&pool, "jana", "hash", false).await.unwrap();

    // quantity 0 violates the CHECK constraint on the second item
    let result = insert_order_with_items(&pool, user.id, 299, &[line(1, 1, 299), line(2, 0, 799)]).await;

    assert!(result.is_err());
    assert_eq!(count_orders(&pool).await.unwrap(), 0);
    assert_eq!(count_items(&pool).await.unwrap(), 0);
  }

  #[actix_rt::test]
  async fn unknown_user_is_rejected_by_foreign_key() {
    let pool = memory_pool().await;
    assert!(insert_order_with_items(&pool, 404, 10, &[line(1, 1, 10)]).await.is_err());
    assert_eq!(count_orders(&pool).await.unwrap(), 0);
  }
}
