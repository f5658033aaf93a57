// core/src/lib.rs

//! eshop-pipeline: asynchronous step pipelines over a shared, lockable context.
//!
//! A pipeline is an ordered list of named steps. Each step carries `before`, `on` and
//! `after` handlers that receive a clone of the same [`ContextData`] and decide whether
//! the run continues ([`PipelineControl::Continue`]) or halts ([`PipelineControl::Stop`]).
//! Steps may be optional or skipped by a predicate over the context.
//!
//! Pipelines are usually registered once at startup in a [`PipelineRegistry`], keyed by
//! their context data type, and dispatched per request:
//!
//! ```ignore
//! let mut p = Pipeline::<CheckoutCtx, AppError>::new([
//!   StepDef::required("validate"),
//!   StepDef::required("persist"),
//! ]);
//! p.on("validate", |ctx: ContextData<CheckoutCtx>| Box::pin(async move { /* ... */ }));
//! registry.register(p);
//! registry.run(ContextData::new(CheckoutCtx::default())).await?;
//! ```

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::{Handler, SkipCondition, StepDef};
pub use crate::error::PipelineError;
pub use crate::pipeline::Pipeline;
pub use crate::registry::PipelineRegistry;
