// SPDX-License-Identifier: MIT

//! Typed error handling for campaign-rs
//!
//! Tool, workflow and scoring failures each get their own enum so callers can
//! match on the failure class; `CampaignError` wraps all of them for the
//! binary and server edges.

use std::fmt;
use thiserror::Error;

/// Top-level error type for campaign-rs
#[derive(Debug, Error)]
pub enum CampaignError {
    /// Tool not found during execution
    #[error("Tool '{name}' not found")]
    ToolNotFound { name: String },

    /// Agent descriptor not found
    #[error("Agent '{name}' not found")]
    AgentNotFound { name: String },

    /// Configuration errors (missing env vars, invalid config)
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Model(#[from] ModelError),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Max iterations/turns reached
    #[error("Max {kind} reached: {limit}")]
    MaxIterations { kind: String, limit: u32 },

    /// Generic error wrapper
    #[error("{0}")]
    Other(String),
}

/// Which side of a tool call failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Input,
    Output,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::Input => f.write_str("input"),
            Boundary::Output => f.write_str("output"),
        }
    }
}

/// Failures raised by a tool invocation
#[derive(Debug, Error)]
pub enum ToolError {
    /// Value rejected by the tool's declared schema
    #[error("Schema validation failed for '{tool}' {boundary}: {message}")]
    SchemaValidation {
        tool: String,
        boundary: Boundary,
        message: String,
    },

    /// Downstream service failed or could not be reached
    #[error("Backend '{service}' unavailable: {message}")]
    BackendUnavailable { service: String, message: String },

    /// Backend answered that the requested entity does not exist
    #[error("{kind} '{id}' not found")]
    NotFound { kind: String, id: String },

    /// Tool did not resolve within its time budget
    #[error("Tool '{tool}' timed out after {millis}ms")]
    Timeout { tool: String, millis: u64 },
}

impl ToolError {
    pub fn input(tool: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::SchemaValidation {
            tool: tool.into(),
            boundary: Boundary::Input,
            message: message.to_string(),
        }
    }

    pub fn output(tool: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::SchemaValidation {
            tool: tool.into(),
            boundary: Boundary::Output,
            message: message.to_string(),
        }
    }

    pub fn backend(service: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::BackendUnavailable {
            service: service.into(),
            message: message.to_string(),
        }
    }

    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

/// Workflow-specific errors
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Business-rule rejection; the message is surfaced verbatim
    #[error("{message}")]
    PolicyViolation { step: String, message: String },

    /// Trigger or step input did not match the declared schema
    #[error("Invalid input for '{step}': {message}")]
    SchemaValidation { step: String, message: String },

    /// A step failed for a reason other than policy or schema
    #[error("Step '{step}' failed: {source}")]
    StepFailed {
        step: String,
        #[source]
        source: Box<CampaignError>,
    },

    /// Workflow committed without steps
    #[error("Workflow '{0}' has no steps")]
    EmptyWorkflow(String),

    /// A step asked for the result of a step that has not run
    #[error("No result recorded for step '{0}'")]
    MissingStepResult(String),
}

impl WorkflowError {
    pub fn policy(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PolicyViolation {
            step: step.into(),
            message: message.into(),
        }
    }

    pub fn step_failed(step: impl Into<String>, source: impl Into<CampaignError>) -> Self {
        Self::StepFailed {
            step: step.into(),
            source: Box::new(source.into()),
        }
    }
}

/// Model/LLM-specific errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// API key not configured
    #[error("API key not configured for provider: {0}")]
    ApiKeyMissing(String),

    /// Model not supported
    #[error("Model not supported: {0}")]
    UnsupportedModel(String),

    /// Invalid response from model
    #[error("Invalid response from model: {0}")]
    InvalidResponse(String),

    /// Transport failure talking to the provider
    #[error("Request to {provider} failed: {message}")]
    Request { provider: String, message: String },
}

/// Scoring failures; never converted into a default score
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Scorer '{scorer}' failed: {reason}")]
    ScoringFailed { scorer: String, reason: String },
}

impl ScoringError {
    pub fn failed(scorer: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::ScoringFailed {
            scorer: scorer.into(),
            reason: reason.to_string(),
        }
    }
}

impl CampaignError {
    /// Create a tool not found error
    pub fn tool_not_found(name: impl Into<String>) -> Self {
        Self::ToolNotFound { name: name.into() }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<&str> for CampaignError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

impl From<String> for CampaignError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

pub type Result<T, E = CampaignError> = std::result::Result<T, E>;
