// SPDX-License-Identifier: MIT

//! Analysis insight quality
//!
//! Compares the analyst's final answer against the first tool result it
//! received and checks that comparisons are rendered as a Markdown table.

use crate::adk::run::Run;
use crate::adk::scorer::{Analyze, Judge, JudgeConfig, PipelineScorer, Stages};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

pub const NAME: &str = "Promotion Analysis Insight";

const DESCRIPTION: &str =
    "Checks if the analyst interpreted tool data correctly and presented it via markdown tables.";

const ANALYZE: &str =
    "Analyze if the response accurately reflects tool data and uses proper formatting.";

const INSTRUCTIONS: &str = "\
You are an expert data auditor.
Your job is to verify if the assistant provided a correct analysis based on tool outputs.
The assistant should:
- Use data returned from the 'get-promotion-metrics' tool.
- Present comparisons or metrics in a Markdown table.
- Provide a natural language summary that matches the numbers.
Return only the structured JSON matching the provided schema.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisFacts {
    pub tool_data: Value,
    pub assistant_response: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisJudgment {
    pub data_accuracy: bool,
    pub uses_markdown_table: bool,
    #[serde(default)]
    pub explanation: String,
}

pub fn preprocess(run: &Run) -> AnalysisFacts {
    AnalysisFacts {
        tool_data: run
            .first_tool_result()
            .map(|(_, result)| result.clone())
            .unwrap_or_else(|| json!({})),
        assistant_response: run.final_response().to_string(),
    }
}

pub fn prompt(facts: &AnalysisFacts) -> String {
    let data = serde_json::to_string_pretty(&facts.tool_data).unwrap_or_default();
    format!(
        r#"Evaluate the assistant's final response against the data fetched from the tool.

Tool Data (Source of Truth):
{data}

Assistant Response:
"{response}"

Tasks:
1) Does the assistant's response include the correct numbers from the tool data?
2) Does the response contain a Markdown table?

Return JSON:
{{
  "dataAccuracy": boolean,
  "usesMarkdownTable": boolean,
  "explanation": string
}}"#,
        response = facts.assistant_response
    )
}

pub fn generate_score(judgment: &AnalysisJudgment) -> f64 {
    match (judgment.data_accuracy, judgment.uses_markdown_table) {
        (true, true) => 1.0,
        (true, false) => 0.7,
        (false, _) => 0.0,
    }
}

pub fn generate_reason(judgment: &AnalysisJudgment, score: f64) -> String {
    format!(
        "Analysis Scoring: Accurate={}, Table Used={}. Final Score={}. {}",
        judgment.data_accuracy, judgment.uses_markdown_table, score, judgment.explanation
    )
    .trim_end()
    .to_string()
}

pub fn analysis_quality_scorer(
    judge: Arc<dyn Judge>,
    judge_model: &str,
) -> PipelineScorer<AnalysisFacts, AnalysisJudgment> {
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
                description: ANALYZE.to_string(),
                prompt,
                judge,
            },
            generate_score,
            generate_reason,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adk::run::RunItem;

    fn judgment(accurate: bool, table: bool) -> AnalysisJudgment {
        AnalysisJudgment {
            data_accuracy: accurate,
            uses_markdown_table: table,
            explanation: "checked".to_string(),
        }
    }

    #[test]
    fn test_score_table() {
        assert_eq!(generate_score(&judgment(true, true)), 1.0);
        assert_eq!(generate_score(&judgment(true, false)), 0.7);
        assert_eq!(generate_score(&judgment(false, true)), 0.0);
        assert_eq!(generate_score(&judgment(false, false)), 0.0);
    }

    #[test]
    fn test_reason_template() {
        assert_eq!(
            generate_reason(&judgment(true, false), 0.7),
            "Analysis Scoring: Accurate=true, Table Used=false. Final Score=0.7. checked"
        );
    }

    #[test]
    fn test_preprocess_extracts_data_and_answer() {
        let run = Run::new("analysis-agent", "How did PROMO-1 do?").with_items([
            RunItem::ToolCall {
                tool: "get-promotion-metrics".to_string(),
                args: json!({"promotionId": "PROMO-1"}),
            },
            RunItem::ToolResult {
                tool: "get-promotion-metrics".to_string(),
                result: json!({"revenue": 12000}),
            },
            RunItem::Text {
                content: "Revenue was $12,000.".to_string(),
            },
        ]);
        let facts = preprocess(&run);
        assert_eq!(facts.tool_data, json!({"revenue": 12000}));
        assert_eq!(facts.assistant_response, "Revenue was $12,000.");
        assert!(prompt(&facts).contains("\"Revenue was $12,000.\""));
    }

    #[test]
    fn test_preprocess_without_tools() {
        let facts = preprocess(&Run::new("analysis-agent", "hi"));
        assert_eq!(facts.tool_data, json!({}));
        assert_eq!(facts.assistant_response, "");
    }
}
