// storefront/src/db/mod.rs

//! SQLite persistence: pool setup, migrations, first-run bootstrap and the stores.

pub mod catalog;
pub mod orders;
pub mod users;

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::models::ProductInput;
use crate::services::auth_service;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, instrument};

/// Opens a pool on `database_url`, creating the database file when missing.
///
/// Connections never expire so that `sqlite::memory:` databases survive for the pool's
/// lifetime.
#[instrument(name = "db::connect", skip(database_url), err(Display))]
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
  let options = SqliteConnectOptions::from_str(database_url)
    .map_err(|e| AppError::Config(format!("Invalid DATABASE_URL: {}", e)))?
    .create_if_missing(true)
    .foreign_keys(true);

  let pool = SqlitePoolOptions::new()
    .max_connections(max_connections)
    .idle_timeout(None::<Duration>)
    .max_lifetime(None::<Duration>)
    .connect_with(options)
    .await?;
  info!("Database pool ready.");
  Ok(pool)
}

#[instrument(name = "db::migrate", skip_all, err(Display))]
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
  sqlx::migrate!("./migrations")
    .run(pool)
    .await
    .map_err(|e| AppError::Internal(format!("Database migration failed: {}", e)))?;
  info!("Database migrations applied.");
  Ok(())
}

fn demo_products() -> Vec<ProductInput> {
  [
    ("Tričko", "Pohodlné tričko z bavlny.", 299),
    ("Mikina", "Teplá mikina s kapucí.", 799),
    ("Čepice", "Stylová čepice.", 199),
  ]
  .into_iter()
  .map(|(name, description, price)| ProductInput {
    name: name.to_string(),
    description: description.to_string(),
    price,
    image_ref: Some("placeholder.png".to_string()),
  })
  .collect()
}

/// First-run initialization.
///
/// Creates the bootstrap admin when no user exists yet, and the demo catalog when
/// `seed_db` is set and the catalog is empty. Running it again is a no-op.
#[instrument(name = "db::bootstrap", skip_all, err(Display))]
pub async fn bootstrap(pool: &SqlitePool, config: &AppConfig) -> Result<()> {
  if users::count(pool).await? == 0 {
    let password_hash = auth_service::hash_password(&config.bootstrap_admin_password)?;
    let admin = users::insert(pool, &config.bootstrap_admin_username, &password_hash, true).await?;
    info!(user_id = admin.id, username = %admin.username, "Bootstrap admin created.");
  }

  if config.seed_db && catalog::count(pool).await? == 0 {
    for input in demo_products() {
      catalog::create(pool, &input).await?;
    }
    info!("Demo catalog seeded.");
  }
  Ok(())
}


#[cfg(test)]
mod tests {
  use super::test_support::memory_pool;
  use super::*;
  use std::collections::HashMap;

  fn config(pairs: &[(&str, &str)]) -> AppConfig {
    let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_lookup(|k| vars.get(k).cloned()).unwrap()
  }

  #[actix_rt::test]
  async fn bootstrap_creates_single_admin_and_is_idempotent() {
    let pool = memory_pool().await;
    let cfg = config(&[("BOOTSTRAP_ADMIN_PASSWORD", "s3cret")]);

    bootstrap(&pool, &cfg).await.unwrap();
    bootstrap(&pool, &cfg).await.unwrap();

    assert_eq!(users::count(&pool).await.unwrap(), 1);
    let admin = users::find_by_username(&pool, "admin").await.unwrap().unwrap();
    assert!(admin.is_admin);
    assert!(auth_service::verify_password(&admin.password_hash, "s3cret").unwrap());
    assert_eq!(catalog::count(&pool).await.unwrap(), 0);
  }

  #[actix_rt::test]
  async fn bootstrap_seeds_demo_catalog_once() {
    let pool = memory_pool().await;
    let cfg = config(&[("SEED_DB", "true")]);

    bootstrap(&pool, &cfg).await.unwrap();
    bootstrap(&pool, &cfg).await.unwrap();

    let products = catalog::list_all(&pool).await.unwrap();
    let summary: Vec<(&str, i64)> = products.iter().map(|p| (p.name.as_str(), p.price)).collect();
    assert_eq!(summary, vec![("Tričko", 299), ("Mikina", 799), ("Čepice", 199)]);
  }
}
