// SPDX-License-Identifier: MIT

//! Campaign scorers
//!
//! Two code scorers (tool-call accuracy, completeness) and two LLM-judged
//! ones (promotion creation accuracy, analysis insight quality), selected in
//! agent descriptors by [`ScorerKind`].

pub mod analysis;
pub mod completeness;
pub mod promotion;
pub mod tool_call;

use crate::adk::scorer::{Judge, Scorer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Scorer selection as written in an agent descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ScorerKind {
    #[serde(rename_all = "camelCase")]
    ToolCallAccuracy {
        expected_tool: String,
        #[serde(default)]
        strict_mode: bool,
    },
    Completeness,
    PromotionCreation,
    AnalysisQuality,
}

impl ScorerKind {
    pub fn build(&self, judge: &Arc<dyn Judge>, judge_model: &str) -> Arc<dyn Scorer> {
        match self {
            ScorerKind::ToolCallAccuracy {
                expected_tool,
                strict_mode,
            } => Arc::new(tool_call::tool_call_accuracy_scorer(
                expected_tool,
                *strict_mode,
            )),
            ScorerKind::Completeness => Arc::new(completeness::completeness_scorer()),
            ScorerKind::PromotionCreation => Arc::new(promotion::promotion_creation_scorer(
                judge.clone(),
                judge_model,
            )),
            ScorerKind::AnalysisQuality => Arc::new(analysis::analysis_quality_scorer(
                judge.clone(),
                judge_model,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adk::scorer::ModelJudge;

    #[test]
    fn test_parse_kinds() {
        let kind: ScorerKind = serde_yaml::from_str(
            "type: tool-call-accuracy\nexpectedTool: create-promotion-link\n",
        )
        .unwrap();
        assert_eq!(
            kind,
            ScorerKind::ToolCallAccuracy {
                expected_tool: "create-promotion-link".to_string(),
                strict_mode: false
            }
        );

        let kind: ScorerKind = serde_yaml::from_str("type: analysis-quality").unwrap();
        assert_eq!(kind, ScorerKind::AnalysisQuality);
        assert!(serde_yaml::from_str::<ScorerKind>("type: sentiment").is_err());
    }

    #[test]
    fn test_build_names() {
        let judge: Arc<dyn Judge> = Arc::new(ModelJudge::new());
        let cases = [
            (ScorerKind::Completeness, completeness::NAME),
            (ScorerKind::PromotionCreation, promotion::NAME),
            (ScorerKind::AnalysisQuality, analysis::NAME),
        ];
        for (kind, name) in cases {
            assert_eq!(kind.build(&judge, "openai/gpt-4o-mini").name(), name);
        }
    }
}
