// SPDX-License-Identifier: MIT

//! Promotion workflow: validate, then register
//!
//! `pending -> validated -> registered`, or `pending -> rejected` when the
//! percentage discount is above the approval threshold. Validation applies
//! the same field rules as `create-promotion-link`, so a trigger the tool
//! would refuse never reaches the backend. A failed registration is fatal:
//! it is returned to the caller and never retried.

use crate::adk::error::WorkflowError;
use crate::adk::workflow::{Step, StepContext, StepInput, Workflow, WorkflowResult};
use crate::campaign::backend::{NewPromotion, PromotionBackend};
use crate::campaign::tools::promotion::check_promotion;
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

pub const WORKFLOW_ID: &str = "promotion-workflow";
pub const VALIDATE_STEP: &str = "validate-promotion";
pub const REGISTER_STEP: &str = "register-promotion";

/// Highest percentage discount that does not need manual approval
pub const MAX_DISCOUNT_PERCENTAGE: f64 = 50.0;
pub const APPROVAL_REQUIRED: &str = "Promotions over 50% require manual VP approval.";

/// Workflow trigger
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromotionRequest {
    pub promotion_name: String,
    pub product_ids: Vec<String>,
    #[serde(default)]
    pub discount_percentage: Option<f64>,
    #[serde(default)]
    pub discount_flat_value: Option<f64>,
    /// ISO date; today when omitted
    #[serde(default)]
    pub start_date: Option<String>,
    /// ISO date; the start date when omitted
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromotionState {
    Pending,
    Validated,
    Registered,
    Rejected,
}

impl PromotionState {
    /// Where a finished execution left the promotion
    pub fn of(result: &Result<WorkflowResult, WorkflowError>) -> Self {
        match result {
            Ok(_) => PromotionState::Registered,
            Err(WorkflowError::PolicyViolation { .. }) => PromotionState::Rejected,
            Err(WorkflowError::StepFailed { step, .. }) if step == REGISTER_STEP => {
                PromotionState::Validated
            }
            Err(_) => PromotionState::Pending,
        }
    }
}

/// Field rules, then the business-rule gate on the requested discount
pub struct ValidatePromotion;

#[async_trait]
impl Step for ValidatePromotion {
    fn id(&self) -> &str {
        VALIDATE_STEP
    }

    fn input(&self) -> Option<StepInput> {
        Some(StepInput::of::<PromotionRequest>())
    }

    async fn execute(&self, ctx: &StepContext) -> Result<Value, WorkflowError> {
        let input: PromotionRequest = ctx.input(VALIDATE_STEP)?;
        check_promotion(
            &input.promotion_name,
            &input.product_ids,
            input.discount_percentage,
            input.discount_flat_value,
        )
        .map_err(|message| WorkflowError::SchemaValidation {
            step: VALIDATE_STEP.to_string(),
            message,
        })?;
        if input.discount_percentage.unwrap_or(0.0) > MAX_DISCOUNT_PERCENTAGE {
            return Err(WorkflowError::policy(VALIDATE_STEP, APPROVAL_REQUIRED));
        }
        Ok(json!({ "status": PromotionState::Validated }))
    }
}

/// Registers the validated trigger with the promotion backend
pub struct RegisterPromotion {
    backend: Arc<dyn PromotionBackend>,
    today: fn() -> NaiveDate,
}

impl RegisterPromotion {
    pub fn new(backend: Arc<dyn PromotionBackend>) -> Self {
        Self {
            backend,
            today: || Local::now().date_naive(),
        }
    }

    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }
}

#[async_trait]
impl Step for RegisterPromotion {
    fn id(&self) -> &str {
        REGISTER_STEP
    }

    fn input(&self) -> Option<StepInput> {
        Some(StepInput::of::<PromotionRequest>())
    }

    async fn execute(&self, ctx: &StepContext) -> Result<Value, WorkflowError> {
        let validated = ctx.step_result(VALIDATE_STEP)?;
        if validated["status"] != json!(PromotionState::Validated) {
            return Err(WorkflowError::SchemaValidation {
                step: REGISTER_STEP.to_string(),
                message: format!("expected a validated promotion, got {}", validated),
            });
        }

        let request: PromotionRequest = ctx.input(REGISTER_STEP)?;
        let start_date = request
            .start_date
            .unwrap_or_else(|| (self.today)().format("%Y-%m-%d").to_string());
        let end_date = request.end_date.unwrap_or_else(|| start_date.clone());
        let promotion = NewPromotion {
            product_ids: request.product_ids,
            promotion_name: request.promotion_name,
            start_date,
            end_date,
            discount_percentage: request.discount_percentage,
            discount_flat_value: request.discount_flat_value,
        };

        let registered = self
            .backend
            .register(&promotion)
            .await
            .map_err(|e| WorkflowError::step_failed(REGISTER_STEP, e))?;

        Ok(json!({ "id": registered.promotion_id, "url": registered.url }))
    }
}

/// `validate-promotion` then `register-promotion`
pub fn promotion_workflow(backend: Arc<dyn PromotionBackend>) -> Result<Workflow, WorkflowError> {
    Workflow::builder::<PromotionRequest>(WORKFLOW_ID)
        .then(Arc::new(ValidatePromotion))
        .then(Arc::new(RegisterPromotion::new(backend)))
        .commit()
}
