// SPDX-License-Identifier: MIT

//! Promotion registration tool

use crate::adk::error::ToolError;
use crate::adk::tool::TypedTool;
use crate::campaign::backend::{PromotionBackend, RegisteredPromotion};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

pub use crate::campaign::backend::NewPromotion;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePromotionInput {
    /// List of product IDs this promotion applies to.
    pub product_ids: Vec<String>,
    /// The internal name for the promotion.
    pub promotion_name: String,
    /// The start date of the promotion (ISO 8601 format).
    pub start_date: String,
    /// The end date of the promotion (ISO 8601 format).
    pub end_date: String,
    /// Percentage discount (e.g., 20 for 20%).
    #[serde(default)]
    pub discount_percentage: Option<f64>,
    /// Flat currency value discount (e.g., 10 for $10).
    #[serde(default)]
    pub discount_flat_value: Option<f64>,
}

impl From<CreatePromotionInput> for NewPromotion {
    fn from(input: CreatePromotionInput) -> Self {
        Self {
            product_ids: input.product_ids,
            promotion_name: input.promotion_name,
            start_date: input.start_date,
            end_date: input.end_date,
            discount_percentage: input.discount_percentage,
            discount_flat_value: input.discount_flat_value,
        }
    }
}

/// Exactly one of the two discount representations must be set.
pub fn check_single_discount(
    percentage: Option<f64>,
    flat_value: Option<f64>,
) -> Result<(), String> {
    match (percentage, flat_value) {
        (Some(_), Some(_)) => {
            Err("set either discountPercentage or discountFlatValue, not both".to_string())
        }
        (None, None) => {
            Err("one of discountPercentage or discountFlatValue is required".to_string())
        }
        (Some(v), None) | (None, Some(v)) if !v.is_finite() || v < 0.0 => {
            Err(format!("discount must be a non-negative number, got {}", v))
        }
        _ => Ok(()),
    }
}

/// Field rules a promotion must satisfy before it may be registered
pub fn check_promotion(
    promotion_name: &str,
    product_ids: &[String],
    percentage: Option<f64>,
    flat_value: Option<f64>,
) -> Result<(), String> {
    if product_ids.is_empty() {
        return Err("productIds must list at least one product".to_string());
    }
    if promotion_name.trim().is_empty() {
        return Err("promotionName must not be empty".to_string());
    }
    check_single_discount(percentage, flat_value)
}

pub struct CreatePromotionLinkTool {
    backend: Arc<dyn PromotionBackend>,
}

impl CreatePromotionLinkTool {
    pub fn new(backend: Arc<dyn PromotionBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl TypedTool for CreatePromotionLinkTool {
    type Input = CreatePromotionInput;
    type Output = RegisteredPromotion;

    fn id(&self) -> &'static str {
        "create-promotion-link"
    }

    fn description(&self) -> &'static str {
        "Generates and registers a new promotional link in the backend based on provided details."
    }

    fn check_input(&self, input: &CreatePromotionInput) -> Result<(), String> {
        check_promotion(
            &input.promotion_name,
            &input.product_ids,
            input.discount_percentage,
            input.discount_flat_value,
        )
    }

    fn check_output(&self, output: &RegisteredPromotion) -> Result<(), String> {
        if output.promotion_id.is_empty() {
            return Err("backend returned an empty promotionId".to_string());
        }
        url::Url::parse(&output.url).map_err(|e| format!("url '{}': {}", output.url, e))?;
        if !output.url.contains(&output.promotion_id) {
            return Err(format!(
                "url '{}' does not reference promotion {}",
                output.url, output.promotion_id
            ));
        }
        Ok(())
    }

    async fn call(&self, input: CreatePromotionInput) -> Result<RegisteredPromotion, ToolError> {
        self.backend.register(&input.into()).await
    }
}
