// storefront/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use eshop_pipeline::PipelineError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Quantity must be a positive integer.")]
  InvalidQuantity,

  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("The cart is empty.")]
  EmptyCart,

  #[error("Authentication required.")]
  Unauthorized,

  #[error("Invalid username or password.")]
  InvalidCredentials,

  #[error("Access denied.")]
  Forbidden,

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Username is already taken.")]
  UsernameTaken,

  #[error("Product {0} is no longer available.")]
  ProductUnavailable(i64),

  #[error("Checkout could not be completed, please try again.")]
  CheckoutFailed {
    #[source]
    source: sqlx::Error,
  },

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Pipeline Error: {0}")]
  Pipeline(#[from] PipelineError),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// Stable machine-readable code sent as `error` in response bodies.
  pub fn code(&self) -> &'static str {
    match self {
      AppError::InvalidQuantity => "invalid_quantity",
      AppError::Validation(_) => "validation",
      AppError::EmptyCart => "empty_cart",
      AppError::Unauthorized => "unauthorized",
      AppError::InvalidCredentials => "invalid_credentials",
      AppError::Forbidden => "forbidden",
      AppError::NotFound(_) => "not_found",
      AppError::UsernameTaken => "username_taken",
      AppError::ProductUnavailable(_) => "product_unavailable",
      AppError::CheckoutFailed { .. } => "checkout_failed",
      AppError::Config(_) | AppError::Database(_) | AppError::Pipeline(_) | AppError::Internal(_) => "internal",
    }
  }

  /// True when resubmitting the same request may succeed.
  pub fn is_retryable(&self) -> bool {
    matches!(self, AppError::CheckoutFailed { .. })
  }
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => AppError::Database(sqlx_err),
      Err(other) => AppError::Internal(other.to_string()),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::InvalidQuantity | AppError::Validation(_) | AppError::EmptyCart => StatusCode::BAD_REQUEST,
      AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
      AppError::Forbidden => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::UsernameTaken | AppError::ProductUnavailable(_) => StatusCode::CONFLICT,
      AppError::CheckoutFailed { .. } => StatusCode::SERVICE_UNAVAILABLE,
      AppError::Config(_) | AppError::Database(_) | AppError::Pipeline(_) | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, source = ?std::error::Error::source(self), "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Responding with error");
    }

    let body = match self {
      AppError::ProductUnavailable(product_id) => json!({
        "error": self.code(),
        "message": self.to_string(),
        "productId": product_id,
      }),
      AppError::CheckoutFailed { .. } => json!({
        "error": self.code(),
        "message": self.to_string(),
        "retryable": true,
      }),
      // Internal details stay in the log.
      AppError::Config(_) | AppError::Database(_) | AppError::Pipeline(_) | AppError::Internal(_) => json!({
        "error": self.code(),
        "message": "An internal error occurred.",
      }),
      _ => json!({
        "error": self.code(),
        "message": self.to_string(),
      }),
    };

    HttpResponse::build(status).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
