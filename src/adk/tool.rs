// SPDX-License-Identifier: MIT

//! Tool abstractions
//!
//! [`Tool`] is the object-safe contract agents and the server talk to: one
//! JSON argument object in, one JSON result out. [`TypedTool`] is how the
//! concrete tools are written; wrapping one in [`SchemaTool`] derives both
//! JSON schemas with `schemars` and enforces them at the input and output
//! boundary, so `call` only ever sees validated input.

use crate::adk::error::ToolError;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Trait for tools that can be called by agents.
///
/// `name()`, `description()` and the schemas return borrowed values;
/// implementations store them in struct fields.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool id (must be unique within an agent's tool set)
    fn name(&self) -> &str;

    /// Returns a human-readable description of what the tool does
    fn description(&self) -> &str;

    /// Returns the JSON schema for the tool's input parameters
    fn schema(&self) -> &Value;

    /// Returns the JSON schema the tool's result conforms to
    fn output_schema(&self) -> &Value;

    /// Execute the tool with the given input and return the result
    async fn execute(&self, input: Value) -> Result<Value, ToolError>;
}

/// A tool with typed input and output.
#[async_trait]
pub trait TypedTool: Send + Sync + 'static {
    type Input: DeserializeOwned + JsonSchema + Send;
    type Output: Serialize + JsonSchema + Send;

    fn id(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Cross-field rules the derived schema cannot express.
    fn check_input(&self, _input: &Self::Input) -> Result<(), String> {
        Ok(())
    }

    /// Format rules on the produced value (URLs and the like).
    fn check_output(&self, _output: &Self::Output) -> Result<(), String> {
        Ok(())
    }

    async fn call(&self, input: Self::Input) -> Result<Self::Output, ToolError>;
}

/// Adapter that exposes a [`TypedTool`] as a schema-checked [`Tool`].
pub struct SchemaTool<T: TypedTool> {
    inner: T,
    input_schema: Value,
    output_schema: Value,
    timeout: Option<Duration>,
}

impl<T: TypedTool> SchemaTool<T> {
    pub fn new(inner: T) -> Self {
        let input_schema = schema_value::<T::Input>();
        let output_schema = schema_value::<T::Output>();
        Self {
            inner,
            input_schema,
            output_schema,
            timeout: None,
        }
    }

    /// Bound every invocation; expiry surfaces as [`ToolError::Timeout`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn validate_input(&self, input: Value) -> Result<T::Input, ToolError> {
        // A tool with no parameters may be called with nothing at all.
        let input = if input.is_null() { json!({}) } else { input };
        if !input.is_object() {
            return Err(ToolError::input(
                self.inner.id(),
                "expected a JSON object of named arguments",
            ));
        }
        let typed: T::Input =
            serde_json::from_value(input).map_err(|e| ToolError::input(self.inner.id(), e))?;
        self.inner
            .check_input(&typed)
            .map_err(|e| ToolError::input(self.inner.id(), e))?;
        Ok(typed)
    }

    fn validate_output(&self, output: T::Output) -> Result<Value, ToolError> {
        self.inner
            .check_output(&output)
            .map_err(|e| ToolError::output(self.inner.id(), e))?;
        serde_json::to_value(output).map_err(|e| ToolError::output(self.inner.id(), e))
    }
}

#[async_trait]
impl<T: TypedTool> Tool for SchemaTool<T> {
    fn name(&self) -> &str {
        self.inner.id()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn schema(&self) -> &Value {
        &self.input_schema
    }

    fn output_schema(&self) -> &Value {
        &self.output_schema
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let typed = self.validate_input(input)?;

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.inner.call(typed))
                .await
                .map_err(|_| ToolError::Timeout {
                    tool: self.inner.id().to_string(),
                    millis: limit.as_millis() as u64,
                })??,
            None => self.inner.call(typed).await?,
        };

        self.validate_output(output)
    }
}

/// JSON schema for `T` as a plain value, the form model providers expect.
pub fn schema_value<T: JsonSchema>() -> Value {
    let root = schemars::schema_for!(T);
    serde_json::to_value(root).unwrap_or_else(|_| json!({ "type": "object" }))
}

/// Wire description of a tool, as listed by the CLI and the server.
pub fn describe(tool: &dyn Tool) -> Value {
    json!({
        "id": tool.name(),
        "description": tool.description(),
        "inputSchema": tool.schema(),
        "outputSchema": tool.output_schema(),
    })
}
