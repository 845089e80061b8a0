// SPDX-License-Identifier: MIT

//! LLM judges for scorer analysis

use crate::adk::error::ModelError;
use crate::adk::model::{create_model, Content, GenerationConfig, Model, ResponseSchema};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Which model judges, and how it is told to judge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeConfig {
    pub model: String,
    pub instructions: String,
}

/// Black-box `(prompt, schema) -> structured judgment`
#[async_trait]
pub trait Judge: Send + Sync {
    async fn judge(
        &self,
        config: &JudgeConfig,
        prompt: &str,
        schema: &ResponseSchema,
    ) -> Result<Value, ModelError>;
}

type ModelConstructor = fn(&str) -> Result<Arc<dyn Model>, ModelError>;

/// Judge backed by [`Model`] implementations, one per judge model id.
pub struct ModelJudge {
    models: RwLock<HashMap<String, Arc<dyn Model>>>,
    constructor: ModelConstructor,
}

impl ModelJudge {
    pub fn new() -> Self {
        Self {
            models: RwLock::new(HashMap::new()),
            constructor: create_model,
        }
    }

    /// Pin the model used for `id` instead of constructing it on demand.
    pub fn with_model(mut self, id: impl Into<String>, model: Arc<dyn Model>) -> Self {
        self.models.get_mut().insert(id.into(), model);
        self
    }

    async fn model_for(&self, id: &str) -> Result<Arc<dyn Model>, ModelError> {
        if let Some(model) = self.models.read().await.get(id) {
            return Ok(model.clone());
        }
        let mut models = self.models.write().await;
        if let Some(model) = models.get(id) {
            return Ok(model.clone());
        }
        let model = (self.constructor)(id)?;
        models.insert(id.to_string(), model.clone());
        Ok(model)
    }
}

impl Default for ModelJudge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Judge for ModelJudge {
    async fn judge(
        &self,
        config: &JudgeConfig,
        prompt: &str,
        schema: &ResponseSchema,
    ) -> Result<Value, ModelError> {
        let model = self.model_for(&config.model).await?;
        let history = [Content::system(&config.instructions), Content::user(prompt)];
        let generation = GenerationConfig {
            temperature: Some(0.0),
            response_schema: Some(schema.clone()),
            ..Default::default()
        };

        let response = model.generate_content(&history, Some(&generation), None).await?;
        let text = response.text();
        let text = strip_code_fence(&text);

        serde_json::from_str(text).map_err(|e| {
            ModelError::InvalidResponse(format!("judge reply is not JSON ({}): {}", e, text))
        })
    }
}

/// Some models wrap JSON in a Markdown fence even when asked not to.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}
