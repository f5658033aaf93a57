// storefront/src/models/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Catalog entry. `price` is in the smallest currency unit.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: i64,
  pub name: String,
  pub description: String,
  pub price: i64,
  pub image_ref: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Fields an admin supplies when creating or replacing a product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
  pub name: String,
  #[serde(default)]
  pub description: String,
  pub price: i64,
  pub image_ref: Option<String>,
}

impl ProductInput {
  pub fn validate(&self) -> crate::errors::Result<()> {
    if self.name.trim().is_empty() {
      return Err(crate::errors::AppError::Validation("Product name is required.".to_string()));
    }
    if self.price < 0 {
      return Err(crate::errors::AppError::Validation(
        "Product price must not be negative.".to_string(),
      ));
    }
    Ok(())
  }
}
