// core/src/pipeline/execution.rs

//! `Pipeline::run`.

use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::core::step::{Handler, StepDef};
use crate::error::PipelineError;
use crate::pipeline::definition::Pipeline;
use tracing::{debug, error, info, info_span, instrument, Instrument};

#[derive(Debug, Clone, Copy)]
enum Phase {
  Before,
  On,
  After,
}

impl Phase {
  fn as_str(self) -> &'static str {
    match self {
      Phase::Before => "before",
      Phase::On => "on",
      Phase::After => "after",
    }
  }
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Runs every step in order against `ctx_data`.
  ///
  /// Returns `Stopped` as soon as a handler asks to stop, and the handler's error as soon
  /// as one fails. A non-optional step without any handler fails with
  /// [`PipelineError::HandlerMissing`] converted into `Err`.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    debug!("Pipeline execution starting.");

    for (step_index, step) in self.steps.iter().enumerate() {
      let step_span = info_span!(
        "pipeline_step",
        step_name = %step.name,
        step_index,
        optional = step.optional
      );

      let control = self.run_step(step, &ctx_data).instrument(step_span).await?;
      if control == PipelineControl::Stop {
        info!(step_name = %step.name, "Pipeline stopped by a handler.");
        return Ok(PipelineResult::Stopped);
      }
    }

    debug!("Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }

  async fn run_step(&self, step: &StepDef<TData>, ctx_data: &ContextData<TData>) -> Result<PipelineControl, Err> {
    if let Some(skip_if) = &step.skip_if {
      if skip_if(ctx_data.clone()) {
        info!("Step skipped by its skip condition.");
        return Ok(PipelineControl::Continue);
      }
    }

    let phases: [(Phase, Option<&Vec<Handler<TData, Err>>>); 3] = [
      (Phase::Before, self.before_hooks.get(&step.name)),
      (Phase::On, self.on_hooks.get(&step.name)),
      (Phase::After, self.after_hooks.get(&step.name)),
    ];

    let has_handlers = phases
      .iter()
      .any(|(_, handlers)| matches!(handlers, Some(list) if !list.is_empty()));
    if !has_handlers {
      if step.optional {
        debug!("Optional step has no handlers, skipping.");
        return Ok(PipelineControl::Continue);
      }
      error!("Non-optional step has no handlers.");
      return Err(Err::from(PipelineError::HandlerMissing {
        step_name: step.name.clone(),
      }));
    }

    for (phase, handlers) in phases {
      for (handler_index, handler) in handlers.into_iter().flatten().enumerate() {
        match handler(ctx_data.clone()).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => {
            debug!(phase = phase.as_str(), handler_index, "Handler requested stop.");
            return Ok(PipelineControl::Stop);
          }
          Err(e) => {
            error!(phase = phase.as_str(), handler_index, error = %e, "Handler failed.");
            return Err(e);
          }
        }
      }
    }

    Ok(PipelineControl::Continue)
  }
}
