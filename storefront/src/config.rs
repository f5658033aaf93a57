// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Text,
  Json,
}

impl FromStr for LogFormat {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "text" => Ok(LogFormat::Text),
      "json" => Ok(LogFormat::Json),
      other => Err(AppError::Config(format!("Invalid LOG_FORMAT '{}', expected 'text' or 'json'", other))),
    }
  }
}

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub database_max_connections: u32,

  pub session_ttl: Duration,
  pub session_cookie_secure: bool,

  // First-run admin account
  pub bootstrap_admin_username: String,
  pub bootstrap_admin_password: String,

  // Insert demo products when the catalog is empty
  pub seed_db: bool,

  pub log_format: LogFormat,
}

impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("database_url", &self.database_url)
      .field("database_max_connections", &self.database_max_connections)
      .field("session_ttl", &self.session_ttl)
      .field("session_cookie_secure", &self.session_cookie_secure)
      .field("bootstrap_admin_username", &self.bootstrap_admin_username)
      .field("bootstrap_admin_password", &"[REDACTED]")
      .field("seed_db", &self.seed_db)
      .field("log_format", &self.log_format)
      .finish()
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|var_name| env::var(var_name).ok())
  }

  /// Builds the configuration from an arbitrary variable lookup.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_or = |var_name: &str, default: &str| lookup(var_name).unwrap_or_else(|| default.to_string());

    fn parse<T: FromStr>(var_name: &str, raw: &str) -> Result<T>
    where
      T::Err: std::fmt::Display,
    {
      raw
        .trim()
        .parse::<T>()
        .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", var_name, raw, e)))
    }

    let server_host = get_or("SERVER_HOST", "127.0.0.1");
    let server_port: u16 = parse("SERVER_PORT", &get_or("SERVER_PORT", "8080"))?;
    let database_url = get_or("DATABASE_URL", "sqlite://eshop.db");

    let database_max_connections: u32 = parse("DATABASE_MAX_CONNECTIONS", &get_or("DATABASE_MAX_CONNECTIONS", "5"))?;
    if database_max_connections == 0 {
      return Err(AppError::Config("DATABASE_MAX_CONNECTIONS must be at least 1".to_string()));
    }

    let session_ttl_secs: u64 = parse("SESSION_TTL_SECS", &get_or("SESSION_TTL_SECS", "86400"))?;
    if session_ttl_secs == 0 {
      return Err(AppError::Config("SESSION_TTL_SECS must be greater than 0".to_string()));
    }
    let session_cookie_secure: bool = parse("SESSION_COOKIE_SECURE", &get_or("SESSION_COOKIE_SECURE", "false"))?;

    let bootstrap_admin_username = get_or("BOOTSTRAP_ADMIN_USERNAME", "admin").trim().to_string();
    if bootstrap_admin_username.is_empty() {
      return Err(AppError::Config("BOOTSTRAP_ADMIN_USERNAME must not be empty".to_string()));
    }
    let bootstrap_admin_password = get_or("BOOTSTRAP_ADMIN_PASSWORD", "admin");
    if bootstrap_admin_password.is_empty() {
      return Err(AppError::Config("BOOTSTRAP_ADMIN_PASSWORD must not be empty".to_string()));
    }

    let seed_db: bool = parse("SEED_DB", &get_or("SEED_DB", "false"))?;
    let log_format: LogFormat = get_or("LOG_FORMAT", "text").parse()?;

    let config = Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      session_ttl: Duration::from_secs(session_ttl_secs),
      session_cookie_secure,
      bootstrap_admin_username,
      bootstrap_admin_password,
      seed_db,
      log_format,
    };
    tracing::debug!(config = ?config, "Application configuration loaded.");
    Ok(config)
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}
