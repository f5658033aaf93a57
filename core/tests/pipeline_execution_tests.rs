// core/tests/pipeline_execution_tests.rs
mod common;

use common::*;
use eshop_pipeline::{ContextData, Pipeline, PipelineControl, PipelineError, PipelineResult, StepDef};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_pipeline_runs_steps_in_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new([
    StepDef::required("step1"),
    StepDef::required("step2"),
    StepDef::required("step3"),
  ]);

  pipeline.on("step1", create_simple_handler("step1", " S1"));
  pipeline.on("step2", create_simple_handler("step2", " S2"));
  pipeline.on("step3", create_simple_handler("step3", " S3"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Completed);

  let guard = ctx.read();
  assert_eq!(guard.counter, 3);
  assert_eq!(guard.message, " S1 S2 S3");
  assert_eq!(guard.steps_executed, vec!["step1", "step2", "step3"]);
}

#[tokio::test]
#[serial]
async fn test_pipeline_stops_on_pipeline_control_stop() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new([
    StepDef::required("stepA"),
    StepDef::required("stopStep"),
    StepDef::required("stepC"),
  ]);

  pipeline.on("stepA", create_simple_handler("stepA", "A"));
  pipeline.on("stopStep", |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      ctx.write().steps_executed.push("stopStep".to_string());
      Ok::<_, PipelineError>(PipelineControl::Stop)
    })
  });
  pipeline.on("stepC", create_simple_handler("stepC", "C"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Stopped);

  let guard = ctx.read();
  assert_eq!(guard.counter, 1);
  assert_eq!(guard.message, "A");
  assert_eq!(guard.steps_executed, vec!["stepA", "stopStep"]);
}

#[tokio::test]
#[serial]
async fn test_stop_skips_remaining_handlers_of_same_step() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new([StepDef::required("only")]);

  pipeline.on("only", create_simple_handler("first", "1"));
  pipeline.on("only", create_simple_handler("second", "2"));
  pipeline.after("only", create_simple_handler("after", "3"));

  let ctx = ContextData::new(TestContext {
    should_stop_at: Some("first".to_string()),
    ..Default::default()
  });
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Stopped);
  assert_eq!(ctx.read().steps_executed, vec!["first"]);
}

#[tokio::test]
#[serial]
async fn test_pipeline_propagates_handler_error() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new([
    StepDef::required("good_step"),
    StepDef::required("bad_step"),
    StepDef::required("another_step"),
  ]);

  pipeline.on("good_step", create_simple_handler("good_step", "Good"));
  pipeline.on("bad_step", create_failing_handler("bad_step", "I am a bad step!"));
  pipeline.on("another_step", create_simple_handler("another_step", "NeverRun"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap_err(), TestError::Handler("I am a bad step!".to_string()));

  let guard = ctx.read();
  assert_eq!(guard.counter, 1);
  assert_eq!(guard.message, "Good");
  assert_eq!(guard.steps_executed, vec!["good_step", "bad_step"]);
}

#[tokio::test]
#[serial]
async fn test_pipeline_skips_step_if_condition_met() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new([
    StepDef::required("step1"),
    StepDef::required("step_to_skip").skip_if(|ctx: ContextData<TestContext>| ctx.read().counter > 0),
    StepDef::required("step3"),
  ]);

  pipeline.on("step1", create_simple_handler("step1", " S1"));
  pipeline.on("step_to_skip", create_simple_handler("step_to_skip", " SKIPPED_THIS"));
  pipeline.on("step3", create_simple_handler("step3", " S3"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Completed);
  let guard = ctx.read();
  assert_eq!(guard.counter, 2);
  assert_eq!(guard.message, " S1 S3");
  assert_eq!(guard.steps_executed, vec!["step1", "step3"]);
}

#[tokio::test]
#[serial]
async fn test_skipped_required_step_needs_no_handler() {
  setup_tracing();
  let pipeline = Pipeline::<TestContext, TestError>::new([
    StepDef::required("never_handled").skip_if(|ctx: ContextData<TestContext>| ctx.read().skip_flag)
  ]);

  let ctx = ContextData::new(TestContext {
    skip_flag: true,
    ..Default::default()
  });

  assert_eq!(pipeline.run(ctx).await.unwrap(), PipelineResult::Completed);
}

#[tokio::test]
#[serial]
async fn test_non_optional_step_missing_handler_fails() {
  setup_tracing();
  let pipeline = Pipeline::<TestContext, TestError>::new([StepDef::required("step_with_no_handler")]);

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  match result {
    Err(TestError::Engine(s)) => {
      assert!(s.contains("HandlerMissing"));
      assert!(s.contains("step_with_no_handler"));
    }
    other => panic!("Expected PipelineError::HandlerMissing, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn test_optional_step_missing_handler_succeeds() {
  setup_tracing();
  let pipeline = Pipeline::<TestContext, TestError>::new([StepDef::optional("optional_step_no_handler")]);

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Completed);
}

#[tokio::test]
#[serial]
async fn test_before_on_after_execution_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new([StepDef::required("main_step")]);

  // Registered out of order on purpose; phases still run before, on, after.
  pipeline.after("main_step", create_simple_handler("after_main", "After;"));
  pipeline.on("main_step", create_simple_handler("on_main", "On;"));
  pipeline.before("main_step", create_simple_handler("before_main", "Before;"));

  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();

  let guard = ctx.read();
  assert_eq!(guard.counter, 3);
  assert_eq!(guard.message, "Before;On;After;");
  assert_eq!(guard.steps_executed, vec!["before_main", "on_main", "after_main"]);
}

#[tokio::test]
#[serial]
async fn test_failing_before_handler_skips_on_and_after() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new([StepDef::required("guarded")]);

  pipeline.before("guarded", create_failing_handler("guard", "denied"));
  pipeline.on("guarded", create_simple_handler("on_guarded", "x"));
  pipeline.after("guarded", create_simple_handler("after_guarded", "y"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap_err(), TestError::Handler("denied".to_string()));
  assert_eq!(ctx.read().steps_executed, vec!["guard"]);
  assert_eq!(ctx.read().counter, 0);
}

#[tokio::test]
#[serial]
async fn test_handler_error_type_converts_into_pipeline_error_type() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new([StepDef::required("anyhow_step")]);

  pipeline.on("anyhow_step", |_ctx: ContextData<TestContext>| {
    Box::pin(async move { Err::<PipelineControl, _>(PipelineError::from(anyhow::anyhow!("lookup failed"))) })
  });

  let result = pipeline.run(ContextData::new(TestContext::default())).await;

  match result {
    Err(TestError::Engine(s)) => {
      assert!(s.contains("HandlerError"));
      assert!(s.contains("lookup failed"));
    }
    other => panic!("Expected converted HandlerError, got {:?}", other),
  }
}

#[test]
#[should_panic(expected = "declared twice")]
fn test_duplicate_step_names_panic() {
  let _ = Pipeline::<TestContext, TestError>::new([StepDef::required("dup"), StepDef::required("dup")]);
}

#[test]
#[should_panic(expected = "not found in pipeline definition")]
fn test_handler_for_unknown_step_panics() {
  let mut pipeline = Pipeline::<TestContext, TestError>::new([StepDef::required("known")]);
  pipeline.on("unknown", create_simple_handler("unknown", ""));
}

#[test]
fn test_step_names_keep_declaration_order() {
  let pipeline = Pipeline::<TestContext, TestError>::new([
    StepDef::required("validate"),
    StepDef::optional("audit"),
    StepDef::required("persist"),
  ]);

  assert_eq!(pipeline.step_names(), vec!["validate", "audit", "persist"]);
  assert_eq!(pipeline.len(), 3);
  assert!(!pipeline.is_empty());
}
