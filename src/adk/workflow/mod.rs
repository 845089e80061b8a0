// SPDX-License-Identifier: MIT

//! Sequential workflows
//!
//! A [`Workflow`] is an immutable, ordered list of [`Step`]s. Steps run
//! strictly in order against a shared [`StepContext`]; the first failure
//! aborts every later step and is returned unchanged. Nothing is compensated.

mod context;

pub use context::StepContext;

use crate::adk::error::WorkflowError;
use crate::adk::tool::schema_value;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Declared input of a step or workflow: a JSON schema plus the check that enforces it
#[derive(Clone)]
pub struct StepInput {
    schema: Value,
    check: fn(&Value) -> Result<(), String>,
}

impl StepInput {
    /// Input described by `I`: the schema is derived and the value must deserialize
    pub fn of<I>() -> Self
    where
        I: DeserializeOwned + JsonSchema,
    {
        Self {
            schema: schema_value::<I>(),
            check: |value| {
                serde_json::from_value::<I>(value.clone())
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            },
        }
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn check(&self, value: &Value) -> Result<(), String> {
        (self.check)(value)
    }
}

/// One stage of a workflow
#[async_trait]
pub trait Step: Send + Sync {
    fn id(&self) -> &str;

    /// Trigger fields this step reads; checked before `execute` runs
    fn input(&self) -> Option<StepInput> {
        None
    }

    async fn execute(&self, ctx: &StepContext) -> Result<Value, WorkflowError>;
}

/// Output of a step that completed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub id: String,
    pub output: Value,
}

/// Result of a workflow that ran to completion
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    pub workflow: String,
    pub steps: Vec<StepRecord>,
    /// Output of the last step
    pub output: Value,
}

/// Immutable ordered step sequence
pub struct Workflow {
    id: String,
    input: StepInput,
    steps: Vec<Arc<dyn Step>>,
}

impl Workflow {
    /// Start a workflow whose trigger input is described by `I`
    pub fn builder<I>(id: impl Into<String>) -> WorkflowBuilder
    where
        I: DeserializeOwned + JsonSchema,
    {
        WorkflowBuilder {
            id: id.into(),
            input: StepInput::of::<I>(),
            steps: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn input_schema(&self) -> &Value {
        self.input.schema()
    }

    pub fn steps(&self) -> &[Arc<dyn Step>] {
        &self.steps
    }

    /// Validate the trigger, then run every step in order
    pub async fn execute(&self, input: Value) -> Result<WorkflowResult, WorkflowError> {
        self.input
            .check(&input)
            .map_err(|message| WorkflowError::SchemaValidation {
                step: "trigger".to_string(),
                message,
            })?;

        let mut ctx = StepContext::new(input);
        let mut records = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            log::info!("Workflow {} executing step {}", self.id, step.id());
            if let Some(declared) = step.input() {
                declared.check(ctx.trigger()).map_err(|message| {
                    log::warn!("Workflow {} rejected input of step {}", self.id, step.id());
                    WorkflowError::SchemaValidation {
                        step: step.id().to_string(),
                        message,
                    }
                })?;
            }
            let output = match step.execute(&ctx).await {
                Ok(output) => output,
                Err(e) => {
                    log::warn!(
                        "Workflow {} stopped at step {}: {}",
                        self.id,
                        step.id(),
                        e
                    );
                    return Err(e);
                }
            };
            ctx.record(step.id(), output.clone());
            records.push(StepRecord {
                id: step.id().to_string(),
                output,
            });
        }

        let output = records
            .last()
            .map(|r| r.output.clone())
            .unwrap_or(Value::Null);
        log::info!("Workflow {} completed {} steps", self.id, records.len());

        Ok(WorkflowResult {
            workflow: self.id.clone(),
            steps: records,
            output,
        })
    }
}

/// Collects steps until [`WorkflowBuilder::commit`]
pub struct WorkflowBuilder {
    id: String,
    input: StepInput,
    steps: Vec<Arc<dyn Step>>,
}

impl WorkflowBuilder {
    pub fn then(mut self, step: Arc<dyn Step>) -> Self {
        self.steps.push(step);
        self
    }

    /// Freeze the step list
    pub fn commit(self) -> Result<Workflow, WorkflowError> {
        if self.steps.is_empty() {
            return Err(WorkflowError::EmptyWorkflow(self.id));
        }
        Ok(Workflow {
            id: self.id,
            input: self.input,
            steps: self.steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Deserialize, JsonSchema)]
    struct Trigger {
        #[allow(dead_code)]
        value: i64,
    }

    #[derive(Deserialize, JsonSchema)]
    struct Labelled {
        #[allow(dead_code)]
        label: String,
    }

    /// Step that appends its id to the output of the step named in `after`
    struct TraceStep {
        id: String,
        after: Option<String>,
        fail: bool,
        labelled: bool,
        calls: Arc<AtomicUsize>,
    }

    impl TraceStep {
        fn new(id: &str, fail: bool) -> (Arc<Self>, Arc<AtomicUsize>) {
            Self::build(id, None, fail, false)
        }

        fn after(id: &str, after: &str) -> (Arc<Self>, Arc<AtomicUsize>) {
            Self::build(id, Some(after), false, false)
        }

        fn build(
            id: &str,
            after: Option<&str>,
            fail: bool,
            labelled: bool,
        ) -> (Arc<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let step = Arc::new(Self {
                id: id.to_string(),
                after: after.map(str::to_string),
                fail,
                labelled,
                calls: calls.clone(),
            });
            (step, calls)
        }
    }

    #[async_trait]
    impl Step for TraceStep {
        fn id(&self) -> &str {
            &self.id
        }

        fn input(&self) -> Option<StepInput> {
            self.labelled.then(StepInput::of::<Labelled>)
        }

        async fn execute(&self, ctx: &StepContext) -> Result<Value, WorkflowError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(WorkflowError::policy(&self.id, "rejected"));
            }
            let trail = match &self.after {
                Some(prev) => {
                    let prev = ctx.step_result(prev)?;
                    format!("{}>{}", prev["trail"].as_str().unwrap_or(""), self.id)
                }
                None => format!("{}:{}", ctx.trigger()["value"], self.id),
            };
            Ok(json!({ "trail": trail }))
        }
    }

    #[tokio::test]
    async fn test_steps_run_in_order_with_context() {
        let (a, _) = TraceStep::new("a", false);
        let (b, _) = TraceStep::after("b", "a");
        let (c, _) = TraceStep::after("c", "b");
        let workflow = Workflow::builder::<Trigger>("wf")
            .then(a)
            .then(b)
            .then(c)
            .commit()
            .unwrap();

        let result = workflow.execute(json!({"value": 7})).await.unwrap();
        assert_eq!(result.output["trail"], "7:a>b>c");
        assert_eq!(result.steps.len(), 3);
        let ids: Vec<&str> = workflow.steps().iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_failure_short_circuits() {
        let (a, a_calls) = TraceStep::new("a", true);
        let (b, b_calls) = TraceStep::new("b", false);
        let workflow = Workflow::builder::<Trigger>("wf")
            .then(a)
            .then(b)
            .commit()
            .unwrap();

        let err = workflow.execute(json!({"value": 1})).await.unwrap_err();
        assert!(matches!(err, WorkflowError::PolicyViolation { .. }));
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_trigger_runs_no_steps() {
        let (a, calls) = TraceStep::new("a", false);
        let workflow = Workflow::builder::<Trigger>("wf").then(a).commit().unwrap();

        let err = workflow.execute(json!({"value": "seven"})).await.unwrap_err();
        assert!(matches!(err, WorkflowError::SchemaValidation { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_step_input_is_checked_before_execute() {
        let (a, a_calls) = TraceStep::new("a", false);
        let (b, b_calls) = TraceStep::build("b", None, false, true);
        let workflow = Workflow::builder::<Trigger>("wf")
            .then(a)
            .then(b)
            .commit()
            .unwrap();

        match workflow.execute(json!({"value": 1})).await.unwrap_err() {
            WorkflowError::SchemaValidation { step, .. } => assert_eq!(step, "b"),
            other => panic!("Expected SchemaValidation, got {:?}", other),
        }
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);

        let result = workflow
            .execute(json!({"value": 1, "label": "x"}))
            .await
            .unwrap();
        assert_eq!(result.steps.len(), 2);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_workflow_cannot_commit() {
        let result = Workflow::builder::<Trigger>("empty").commit();
        assert!(matches!(result, Err(WorkflowError::EmptyWorkflow(_))));
    }

    #[test]
    fn test_input_schema_is_derived() {
        let (a, _) = TraceStep::new("a", false);
        let workflow = Workflow::builder::<Trigger>("wf").then(a).commit().unwrap();
        assert!(workflow.input_schema()["properties"]["value"].is_object());
    }
}
