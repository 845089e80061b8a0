// SPDX-License-Identifier: MIT

//! Promotion creation accuracy
//!
//! Audits the arguments of the first tool call in a promotion run: were all
//! required fields collected, and was exactly one discount type given?

use crate::adk::run::Run;
use crate::adk::scorer::{Analyze, Judge, JudgeConfig, PipelineScorer, Stages};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

pub const NAME: &str = "Promotion Creation Accuracy";

const DESCRIPTION: &str =
    "Checks if all required fields were collected and correctly formatted before tool execution.";

const INSTRUCTIONS: &str = "\
You are an expert evaluator of data collection tasks.
Your job is to verify if the assistant successfully gathered the necessary information
for a promotion.
Required fields: productIds, promotionName, startDate, endDate,
and EXACTLY ONE of (discountPercentage OR discountFlatValue).
Return only the structured JSON matching the provided schema.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionFacts {
    /// `{}` when the run made no tool call
    pub tool_call_args: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromotionJudgment {
    pub all_fields_present: bool,
    pub mutually_exclusive_discount_valid: bool,
    #[serde(default)]
    pub explanation: String,
}

pub fn preprocess(run: &Run) -> PromotionFacts {
    PromotionFacts {
        tool_call_args: run
            .first_tool_call()
            .map(|(_, args)| args.clone())
            .unwrap_or_else(|| json!({})),
    }
}

pub fn prompt(facts: &PromotionFacts) -> String {
    let args = serde_json::to_string_pretty(&facts.tool_call_args).unwrap_or_default();
    format!(
        r#"Evaluate the following tool arguments provided by the assistant:

Arguments:
{args}

Tasks:
1) Are 'productIds', 'promotionName', 'startDate', and 'endDate' all present?
2) Is there exactly one discount type provided (either 'discountPercentage' or 'discountFlatValue')?

Return JSON:
{{
  "allFieldsPresent": boolean,
  "mutuallyExclusiveDiscountValid": boolean,
  "explanation": string
}}"#
    )
}

pub fn generate_score(judgment: &PromotionJudgment) -> f64 {
    match (
        judgment.all_fields_present,
        judgment.mutually_exclusive_discount_valid,
    ) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.5,
        (false, false) => 0.0,
    }
}

pub fn generate_reason(judgment: &PromotionJudgment, score: f64) -> String {
    format!(
        "Promotion Scoring: Fields={}, Discount Logic={}. Final Score={}. {}",
        judgment.all_fields_present,
        judgment.mutually_exclusive_discount_valid,
        score,
        judgment.explanation
    )
    .trim_end()
    .to_string()
}

pub fn promotion_creation_scorer(
    judge: Arc<dyn Judge>,
    judge_model: &str,
) -> PipelineScorer<PromotionFacts, PromotionJudgment> {
    PipelineScorer::new(
        NAME,
        DESCRIPTION,
        Stages {
            preprocess: Box::new(preprocess),
            analyze: Analyze::Judge {
                config: JudgeConfig {
                    model: judge_model.to_string(),
                    instructions: INSTRUCTIONS.to_string(),
                },
                description:
                    "Analyze the tool arguments for completeness and constraint satisfaction"
                        .to_string(),
                prompt,
                judge,
            },
            generate_score,
            generate_reason,
        },
    )
}
