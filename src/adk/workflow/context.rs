// SPDX-License-Identifier: MIT

//! Accumulated context handed to each workflow step

use crate::adk::error::WorkflowError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Trigger input plus the results of every step that has completed so far
#[derive(Debug, Clone)]
pub struct StepContext {
    trigger: Value,
    /// Completed steps in execution order
    results: Vec<(String, Value)>,
}

impl StepContext {
    pub fn new(trigger: Value) -> Self {
        Self {
            trigger,
            results: Vec::new(),
        }
    }

    /// The input the workflow was started with
    pub fn trigger(&self) -> &Value {
        &self.trigger
    }

    /// Trigger input read through a step's own input type
    pub fn input<T: DeserializeOwned>(&self, step: &str) -> Result<T, WorkflowError> {
        serde_json::from_value(self.trigger.clone()).map_err(|e| WorkflowError::SchemaValidation {
            step: step.to_string(),
            message: e.to_string(),
        })
    }

    pub fn record(&mut self, step: impl Into<String>, result: Value) {
        self.results.push((step.into(), result));
    }

    /// Result of a completed step
    pub fn step_result(&self, step: &str) -> Result<&Value, WorkflowError> {
        self.results
            .iter()
            .find(|(id, _)| id == step)
            .map(|(_, v)| v)
            .ok_or_else(|| WorkflowError::MissingStepResult(step.to_string()))
    }
}
