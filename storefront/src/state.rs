// storefront/src/state.rs

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::pipelines;
use crate::session::SessionStore;
use eshop_pipeline::PipelineRegistry;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub db_pool: SqlitePool,
  pub pipelines: Arc<PipelineRegistry<AppError>>,
  pub sessions: Arc<SessionStore>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Builds the shared state and registers every pipeline.
  pub fn new(db_pool: SqlitePool, config: Arc<AppConfig>) -> Self {
    let registry = PipelineRegistry::<AppError>::new();
    pipelines::register_all_pipelines(&registry);

    Self {
      db_pool,
      pipelines: Arc::new(registry),
      sessions: Arc::new(SessionStore::new(config.session_ttl)),
      config,
    }
  }
}
