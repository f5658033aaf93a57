// core/src/error.rs

use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Errors raised by the pipeline engine itself.
///
/// Application pipelines usually carry their own error type; it must be constructible
/// from `PipelineError` so engine failures surface through the same channel.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("No pipeline registered for context type {context_type}")]
  NotRegistered { context_type: String },

  #[error("Context type mismatch during dispatch (expected {expected_type})")]
  TypeMismatch { expected_type: String },

  #[error("Error in handler or external operation. Source: {source}")]
  HandlerError {
    #[source]
    source: AnyhowError,
  },
}

impl From<AnyhowError> for PipelineError {
  fn from(err: AnyhowError) -> Self {
    PipelineError::HandlerError { source: err }
  }
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
