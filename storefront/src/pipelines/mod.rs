// storefront/src/pipelines/mod.rs

//! Step pipelines behind the storefront's multi-step operations.

use crate::errors::AppError;
use eshop_pipeline::PipelineRegistry;

pub mod contexts;

pub mod cart_pipeline;
pub mod checkout_pipeline;
pub mod login_pipeline;
pub mod register_pipeline;

/// Registers every application pipeline. Called once at startup.
pub fn register_all_pipelines(registry: &PipelineRegistry<AppError>) {
  registry.register(register_pipeline::build_register_pipeline());
  registry.register(login_pipeline::build_login_pipeline());
  registry.register(cart_pipeline::build_add_to_cart_pipeline());
  registry.register(checkout_pipeline::build_checkout_pipeline());

  tracing::info!(pipelines = registry.len(), "All application pipelines registered.");
}
