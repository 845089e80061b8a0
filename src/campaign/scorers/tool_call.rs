// SPDX-License-Identifier: MIT

//! Tool-call accuracy: did the agent use the tool it was expected to use?

use crate::adk::run::Run;
use crate::adk::scorer::{Analyze, PipelineScorer, Stages};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const NAME: &str = "Tool Call Accuracy";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallFacts {
    pub expected_tool: String,
    pub strict_mode: bool,
    /// Every tool called, in call order
    pub actual_tools: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallJudgment {
    pub expected_tool: String,
    pub strict_mode: bool,
    pub called: bool,
    pub only_expected: bool,
}

impl ToolCallJudgment {
    pub fn correct(&self) -> bool {
        if self.strict_mode {
            self.called && self.only_expected
        } else {
            self.called
        }
    }
}

pub fn analyze(facts: &ToolCallFacts) -> ToolCallJudgment {
    let called = facts.actual_tools.iter().any(|t| *t == facts.expected_tool);
    ToolCallJudgment {
        expected_tool: facts.expected_tool.clone(),
        strict_mode: facts.strict_mode,
        called,
        only_expected: called && facts.actual_tools.len() == 1,
    }
}

pub fn generate_score(judgment: &ToolCallJudgment) -> f64 {
    if judgment.correct() {
        1.0
    } else {
        0.0
    }
}

pub fn generate_reason(judgment: &ToolCallJudgment, score: f64) -> String {
    let verdict = match (judgment.called, judgment.correct()) {
        (_, true) => "was called as expected",
        (true, false) => "was called alongside other tools (strict mode)",
        (false, _) => "was not called",
    };
    format!(
        "Expected tool '{}' {}. Score={}.",
        judgment.expected_tool, verdict, score
    )
}

/// Code scorer (no judge) for one expected tool
pub fn tool_call_accuracy_scorer(
    expected_tool: &str,
    strict_mode: bool,
) -> PipelineScorer<ToolCallFacts, ToolCallJudgment> {
    let expected = expected_tool.to_string();
    PipelineScorer::new(
        NAME,
        format!("Checks that the agent called '{}'.", expected_tool),
        Stages {
            preprocess: Box::new(move |run: &Run| ToolCallFacts {
                expected_tool: expected.clone(),
                strict_mode,
                actual_tools: run.tool_calls().into_iter().map(str::to_string).collect(),
            }),
            analyze: Analyze::Code(Box::new(analyze)),
            generate_score,
            generate_reason,
        },
    )
}
