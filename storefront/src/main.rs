// storefront/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use eshop_storefront::config::{AppConfig, LogFormat};
use eshop_storefront::db;
use eshop_storefront::session::SessionStore;
use eshop_storefront::state::AppState;
use eshop_storefront::web::configure_app_routes;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_span_events(FmtSpan::CLOSE);

  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Text => builder.init(),
  }
}

/// Drops expired sessions in the background, at most a minute apart.
fn spawn_session_sweeper(sessions: Arc<SessionStore>) {
  let period = sessions.ttl().clamp(Duration::from_secs(1), Duration::from_secs(60));
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(period);
    loop {
      ticker.tick().await;
      let purged = sessions.purge_expired();
      if purged > 0 {
        tracing::info!(purged, remaining = sessions.len(), "Expired sessions dropped.");
      }
    }
  });
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let app_config = Arc::new(AppConfig::from_env().context("Failed to load application configuration")?);
  init_tracing(app_config.log_format);

  tracing::info!("Starting eshop storefront server...");

  let db_pool = db::connect(&app_config.database_url, app_config.database_max_connections)
    .await
    .context("Failed to connect to the database")?;
  db::migrate(&db_pool).await.context("Failed to migrate the database")?;
  db::bootstrap(&db_pool, &app_config)
    .await
    .context("Failed to initialize the database")?;

  let app_state = AppState::new(db_pool, app_config.clone());
  spawn_session_sweeper(app_state.sessions.clone());

  let server_address = app_config.bind_address();
  tracing::info!(%server_address, "Binding HTTP server.");

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await
  .context("HTTP server terminated with an error")?;

  tracing::info!("Server stopped.");
  Ok(())
}
