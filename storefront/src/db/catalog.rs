// storefront/src/db/catalog.rs

//! Catalog Store: product reads for cart and checkout, writes for admin operations.

use crate::errors::Result;
use crate::models::{Product, ProductInput};
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, instrument};

const PRODUCT_COLUMNS: &str = "id, name, description, price, image_ref, created_at, updated_at";

#[instrument(name = "catalog::find_by_id", skip(pool))]
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Product>> {
  let product = sqlx::query_as::<_, Product>(&format!("SELECT {} FROM products WHERE id = ?", PRODUCT_COLUMNS))
    .bind(id)
    .fetch_optional(pool)
    .await?;
  Ok(product)
}

/// Looks up several products at once. Ids with no product are simply absent from the map.
#[instrument(name = "catalog::find_many", skip(pool, ids), fields(requested = ids.len()))]
pub async fn find_many(pool: &SqlitePool, ids: &[i64]) -> Result<HashMap<i64, Product>> {
  if ids.is_empty() {
    return Ok(HashMap::new());
  }

  let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!("SELECT {} FROM products WHERE id IN (", PRODUCT_COLUMNS));
  let mut separated = qb.separated(", ");
  for id in ids {
    separated.push_bind(*id);
  }
  separated.push_unseparated(")");

  let rows = qb.build_query_as::<Product>().fetch_all(pool).await?;
  debug!(found = rows.len(), "Products resolved.");
  Ok(rows.into_iter().map(|p| (p.id, p)).collect())
}

#[instrument(name = "catalog::list_all", skip(pool))]
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Product>> {
  let products = sqlx::query_as::<_, Product>(&format!("SELECT {} FROM products ORDER BY id", PRODUCT_COLUMNS))
    .fetch_all(pool)
    .await?;
  Ok(products)
}

pub async fn count(pool: &SqlitePool) -> Result<i64> {
  let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
    .fetch_one(pool)
    .await?;
  Ok(n)
}

#[instrument(name = "catalog::create", skip(pool, input), fields(name = %input.name, price = input.price))]
pub async fn create(pool: &SqlitePool, input: &ProductInput) -> Result<Product> {
  let now = Utc::now();
  let product = sqlx::query_as::<_, Product>(&format!(
    "INSERT INTO products (name, description, price, image_ref, created_at, updated_at) \
     VALUES (?, ?, ?, ?, ?, ?) RETURNING {}",
    PRODUCT_COLUMNS
  ))
  .bind(&input.name)
  .bind(&input.description)
  .bind(input.price)
  .bind(&input.image_ref)
  .bind(now)
  .bind(now)
  .fetch_one(pool)
  .await?;
  debug!(product_id = product.id, "Product created.");
  Ok(product)
}

/// Replaces the product's fields. `None` when no product has `id`.
#[instrument(name = "catalog::update", skip(pool, input))]
pub async fn update(pool: &SqlitePool, id: i64, input: &ProductInput) -> Result<Option<Product>> {
  let product = sqlx::query_as::<_, Product>(&format!(
    "UPDATE products SET name = ?, description = ?, price = ?, image_ref = ?, updated_at = ? \
     WHERE id = ? RETURNING {}",
    PRODUCT_COLUMNS
  ))
  .bind(&input.name)
  .bind(&input.description)
  .bind(input.price)
  .bind(&input.image_ref)
  .bind(Utc::now())
  .bind(id)
  .fetch_optional(pool)
  .await?;
  Ok(product)
}

/// Returns whether a product was deleted.
#[instrument(name = "catalog::delete", skip(pool))]
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool> {
  let result = sqlx::query("DELETE FROM products WHERE id = ?")
    .bind(id)
    .execute(pool)
    .await?;
  Ok(result.rows_affected() > 0)
}
