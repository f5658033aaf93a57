// storefront/src/db/users.rs

//! User Store.

use crate::errors::{AppError, Result};
use crate::models::User;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{instrument, warn};

#[instrument(name = "users::find_by_username", skip(pool))]
pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
  let user = sqlx::query_as::<_, User>(
    "SELECT id, username, password_hash, is_admin, created_at FROM users WHERE username = ?",
  )
  .bind(username)
  .fetch_optional(pool)
  .await?;
  Ok(user)
}

pub async fn exists(pool: &SqlitePool, username: &str) -> Result<bool> {
  let found = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
    .bind(username)
    .fetch_one(pool)
    .await?;
  Ok(found)
}

pub async fn count(pool: &SqlitePool) -> Result<i64> {
  let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
    .fetch_one(pool)
    .await?;
  Ok(n)
}

/// Inserts a user with an already hashed password.
///
/// The UNIQUE constraint on `username` decides races between concurrent registrations:
/// the loser gets [`AppError::UsernameTaken`].
#[instrument(name = "users::insert", skip(pool, password_hash))]
pub async fn insert(pool: &SqlitePool, username: &str, password_hash: &str, is_admin: bool) -> Result<User> {
  let inserted = sqlx::query_as::<_, User>(
    "INSERT INTO users (username, password_hash, is_admin, created_at) VALUES (?, ?, ?, ?) \
     RETURNING id, username, password_hash, is_admin, created_at",
  )
  .bind(username)
  .bind(password_hash)
  .bind(is_admin)
  .bind(Utc::now())
  .fetch_one(pool)
  .await;

  match inserted {
    Ok(user) => Ok(user),
    Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
      warn!("Username already taken.");
      Err(AppError::UsernameTaken)
    }
    Err(e) => Err(AppError::Database(e)),
  }
}
