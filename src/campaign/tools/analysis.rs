// SPDX-License-Identifier: MIT

//! Read-only campaign performance tools

use crate::adk::error::ToolError;
use crate::adk::tool::TypedTool;
use crate::campaign::backend::{MetricsBackend, PastPromotion, PromotionMetrics};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricsInput {
    /// The unique ID of the promotion (e.g., PROMO-1)
    pub promotion_id: String,
}

pub struct GetPromotionMetricsTool {
    backend: Arc<dyn MetricsBackend>,
}

impl GetPromotionMetricsTool {
    pub fn new(backend: Arc<dyn MetricsBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl TypedTool for GetPromotionMetricsTool {
    type Input = MetricsInput;
    type Output = PromotionMetrics;

    fn id(&self) -> &'static str {
        "get-promotion-metrics"
    }

    fn description(&self) -> &'static str {
        "Fetch performance metrics for a specific promotion by its ID."
    }

    fn check_input(&self, input: &MetricsInput) -> Result<(), String> {
        if input.promotion_id.trim().is_empty() {
            return Err("promotionId must not be empty".to_string());
        }
        Ok(())
    }

    async fn call(&self, input: MetricsInput) -> Result<PromotionMetrics, ToolError> {
        self.backend.metrics(&input.promotion_id).await
    }
}

/// Takes no arguments
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListInput {}

pub struct ListPastPromotionsTool {
    backend: Arc<dyn MetricsBackend>,
}

impl ListPastPromotionsTool {
    pub fn new(backend: Arc<dyn MetricsBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl TypedTool for ListPastPromotionsTool {
    type Input = ListInput;
    type Output = Vec<PastPromotion>;

    fn id(&self) -> &'static str {
        "list-past-promotions"
    }

    fn description(&self) -> &'static str {
        "Retrieve a list of all historical and active promotions."
    }

    async fn call(&self, _input: ListInput) -> Result<Vec<PastPromotion>, ToolError> {
        self.backend.list_promotions().await
    }
}
