// core/src/pipeline/definition.rs

use crate::core::step::{Handler, StepDef};
use crate::error::PipelineError;
use std::collections::{HashMap, HashSet};

/// An ordered list of named steps over the context data type `TData`.
///
/// `Err` is the error type returned by the pipeline's handlers and by [`Pipeline::run`].
/// It must be constructible from [`PipelineError`] so that engine failures
/// (e.g. a required step without handlers) come back through the same type.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) before_hooks: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) on_hooks: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) after_hooks: HashMap<String, Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Creates a pipeline whose steps run in the given order.
  ///
  /// # Panics
  /// When two steps share a name. Pipelines are assembled at startup, so this is a
  /// programming error rather than a runtime condition.
  pub fn new(step_defs: impl IntoIterator<Item = StepDef<TData>>) -> Self {
    let steps: Vec<StepDef<TData>> = step_defs.into_iter().collect();

    let mut seen = HashSet::with_capacity(steps.len());
    for step in &steps {
      if !seen.insert(step.name.as_str()) {
        panic!("Pipeline setup error: step '{}' is declared twice.", step.name);
      }
    }

    Self {
      steps,
      before_hooks: HashMap::new(),
      on_hooks: HashMap::new(),
      after_hooks: HashMap::new(),
    }
  }

  /// Step names in execution order.
  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!("Pipeline setup error: step '{}' not found in pipeline definition.", step_name);
    }
  }
}
