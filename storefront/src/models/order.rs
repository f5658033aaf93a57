// storefront/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A placed order. Immutable once created; `total` equals the sum of its items' subtotals.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: i64,
  pub user_id: i64,
  pub total: i64,
  pub created_at: DateTime<Utc>,
}
