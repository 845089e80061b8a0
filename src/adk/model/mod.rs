// SPDX-License-Identifier: MIT

//! Model module - defines the LLM model trait and shared types
//!
//! Model implementations live in their own submodules:
//! - [openai] - OpenAI's chat completions API

pub mod openai;

use crate::adk::error::ModelError;
use crate::adk::tool::Tool;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration for model generation
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub top_p: Option<f32>,
    /// Constrain the reply to JSON matching this schema
    pub response_schema: Option<ResponseSchema>,
}

/// Named JSON schema for structured output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: serde_json::Value,
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            parts: vec![Part::Text(text.into())],
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part::Text(text.into())],
        }
    }

    /// Concatenated text parts
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Parts of a message - text, function calls, function responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Part {
    /// Regular text output from the model
    Text(String),
    /// Function/tool call requested by the model
    FunctionCall {
        name: String,
        args: serde_json::Value,
        /// Provider call id, echoed back on the matching response
        #[serde(skip_serializing_if = "Option::is_none")]
        call_id: Option<String>,
    },
    /// Response from executing a function/tool
    FunctionResponse {
        name: String,
        response: serde_json::Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        call_id: Option<String>,
    },
}

/// Provider-qualified model identifier such as `openai/gpt-4o-mini`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelId {
    pub provider: String,
    pub name: String,
}

impl ModelId {
    /// Split `provider/name`; bare names default to OpenAI.
    pub fn parse(id: &str) -> Self {
        match id.split_once('/') {
            Some((provider, name)) if !provider.is_empty() && !name.is_empty() => Self {
                provider: provider.to_lowercase(),
                name: name.to_string(),
            },
            _ => Self {
                provider: "openai".to_string(),
                name: id.to_string(),
            },
        }
    }
}

/// Core trait for LLM model implementations
#[async_trait]
pub trait Model: Send + Sync {
    async fn generate_content(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
        tools: Option<&[Arc<dyn Tool>]>,
    ) -> Result<Content, ModelError>;
}

/// Instantiate the model behind a provider-qualified id.
pub fn create_model(id: &str) -> Result<Arc<dyn Model>, ModelError> {
    let model_id = ModelId::parse(id);
    match model_id.provider.as_str() {
        "openai" => Ok(Arc::new(openai::OpenAIModel::new(model_id.name)?)),
        _ => Err(ModelError::UnsupportedModel(id.to_string())),
    }
}
