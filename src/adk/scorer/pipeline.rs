// SPDX-License-Identifier: MIT

//! Four-stage scorer pipeline
//!
//! `preprocess -> analyze -> generate_score -> generate_reason`. Each stage is
//! held separately so it can be exercised on fixed inputs; only `analyze` may
//! suspend (when it delegates to a judge).

use super::judge::{Judge, JudgeConfig};
use super::{ScoreResult, Scorer};
use crate::adk::error::ScoringError;
use crate::adk::model::ResponseSchema;
use crate::adk::run::Run;
use crate::adk::tool::schema_value;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

type Preprocess<F> = Box<dyn Fn(&Run) -> F + Send + Sync>;
type CodeAnalysis<F, J> = Box<dyn Fn(&F) -> J + Send + Sync>;

/// How the analyze stage turns facts into a judgment
pub enum Analyze<F, J> {
    /// Deterministic analysis in code
    Code(CodeAnalysis<F, J>),
    /// Delegated to an LLM judge, constrained by the judgment's JSON schema
    Judge {
        config: JudgeConfig,
        description: String,
        prompt: fn(&F) -> String,
        judge: Arc<dyn Judge>,
    },
}

/// The stages of a [`PipelineScorer`]
pub struct Stages<F, J> {
    pub preprocess: Preprocess<F>,
    pub analyze: Analyze<F, J>,
    pub generate_score: fn(&J) -> f64,
    pub generate_reason: fn(&J, f64) -> String,
}

/// Scorer assembled from explicit stages
pub struct PipelineScorer<F, J> {
    name: String,
    description: String,
    stages: Stages<F, J>,
}

impl<F, J> PipelineScorer<F, J>
where
    F: Serialize + Send + Sync,
    J: Serialize + DeserializeOwned + JsonSchema + Send + Sync,
{
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        stages: Stages<F, J>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            stages,
        }
    }

    pub fn preprocess(&self, run: &Run) -> F {
        (self.stages.preprocess)(run)
    }

    /// Produce a judgment; judge errors and non-conforming replies fail.
    pub async fn analyze(&self, facts: &F) -> Result<J, ScoringError> {
        match &self.stages.analyze {
            Analyze::Code(analyze) => Ok(analyze(facts)),
            Analyze::Judge {
                config,
                description,
                prompt,
                judge,
            } => {
                let prompt = prompt(facts);
                let schema = ResponseSchema {
                    name: response_schema_name(&self.name),
                    schema: judgment_schema::<J>(),
                };
                log::debug!("Scorer {} analyze: {}", self.name, description);

                let reply = judge
                    .judge(config, &prompt, &schema)
                    .await
                    .map_err(|e| ScoringError::failed(&self.name, e))?;

                serde_json::from_value(reply.clone()).map_err(|e| {
                    ScoringError::failed(
                        &self.name,
                        format!("judge output does not match schema ({}): {}", e, reply),
                    )
                })
            }
        }
    }

    pub fn generate_score(&self, judgment: &J) -> f64 {
        (self.stages.generate_score)(judgment)
    }

    pub fn generate_reason(&self, judgment: &J, score: f64) -> String {
        (self.stages.generate_reason)(judgment, score)
    }
}

#[async_trait]
impl<F, J> Scorer for PipelineScorer<F, J>
where
    F: Serialize + Send + Sync,
    J: Serialize + DeserializeOwned + JsonSchema + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn score(&self, run: &Run) -> Result<ScoreResult, ScoringError> {
        let facts = self.preprocess(run);
        let judgment = self.analyze(&facts).await?;

        let score = self.generate_score(&judgment);
        if !(0.0..=1.0).contains(&score) {
            return Err(ScoringError::failed(
                &self.name,
                format!("score {} outside [0, 1]", score),
            ));
        }

        let reason = self.generate_reason(&judgment, score);
        if reason.trim().is_empty() {
            return Err(ScoringError::failed(&self.name, "empty reason"));
        }

        Ok(ScoreResult {
            scorer: self.name.clone(),
            run_id: run.id,
            score,
            reason,
            preprocess: serde_json::to_value(&facts).unwrap_or_default(),
            analysis: serde_json::to_value(&judgment).unwrap_or_default(),
        })
    }
}

/// Provider-friendly schema name (`[a-zA-Z0-9_-]`)
fn response_schema_name(scorer: &str) -> String {
    scorer
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

fn judgment_schema<J: JsonSchema>() -> serde_json::Value {
    let mut schema = schema_value::<J>();
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("$schema");
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adk::error::ModelError;
    use crate::adk::run::RunItem;
    use serde::Deserialize;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    #[derive(Debug, Serialize, Deserialize, JsonSchema)]
    struct Verdict {
        good: bool,
        #[serde(default)]
        explanation: String,
    }

    #[derive(Serialize)]
    struct Facts {
        text: String,
    }

    struct CannedJudge {
        reply: Result<Value, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedJudge {
        fn new(reply: Result<Value, String>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Judge for CannedJudge {
        async fn judge(
            &self,
            _config: &JudgeConfig,
            prompt: &str,
            schema: &ResponseSchema,
        ) -> Result<Value, ModelError> {
            assert!(schema.schema["properties"]["good"].is_object());
            assert!(schema.schema.get("$schema").is_none());
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(ModelError::InvalidResponse)
        }
    }

    fn stages(analyze: Analyze<Facts, Verdict>) -> Stages<Facts, Verdict> {
        Stages {
            preprocess: Box::new(|run: &Run| Facts {
                text: run.final_response().to_string(),
            }),
            analyze,
            generate_score: |v| if v.good { 1.0 } else { 0.0 },
            generate_reason: |v, score| format!("good={} score={}", v.good, score),
        }
    }

    fn judged(judge: Arc<CannedJudge>) -> PipelineScorer<Facts, Verdict> {
        PipelineScorer::new(
            "Verdict Scorer",
            "test",
            stages(Analyze::Judge {
                config: JudgeConfig {
                    model: "openai/gpt-4o-mini".to_string(),
                    instructions: "judge".to_string(),
                },
                description: "verdict".to_string(),
                prompt: |f| format!("Text: {}", f.text),
                judge,
            }),
        )
    }

    fn run() -> Run {
        Run::new("agent", "q").with_items([RunItem::Text {
            content: "answer".to_string(),
        }])
    }

    #[tokio::test]
    async fn test_judged_pipeline_scores() {
        let judge = CannedJudge::new(Ok(json!({"good": true, "explanation": "fine"})));
        let scorer = judged(judge.clone());

        let result = scorer.score(&run()).await.unwrap();
        assert_eq!(result.score, 1.0);
        assert_eq!(result.reason, "good=true score=1");
        assert_eq!(result.preprocess, json!({"text": "answer"}));
        assert_eq!(result.analysis["explanation"], "fine");
        assert_eq!(judge.prompts.lock().unwrap()[0], "Text: answer");
    }

    #[tokio::test]
    async fn test_judge_error_is_scoring_failure() {
        let scorer = judged(CannedJudge::new(Err("503".to_string())));
        let err = scorer.score(&run()).await.unwrap_err();
        assert!(err.to_string().contains("Verdict Scorer"));
    }

    #[tokio::test]
    async fn test_non_conforming_judgment_is_scoring_failure() {
        let scorer = judged(CannedJudge::new(Ok(json!({"good": "yes"}))));
        assert!(scorer.score(&run()).await.is_err());

        let scorer = judged(CannedJudge::new(Ok(json!({"explanation": "no verdict"}))));
        assert!(scorer.score(&run()).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_explanation_defaults_to_empty() {
        let scorer = judged(CannedJudge::new(Ok(json!({"good": false}))));
        let result = scorer.score(&run()).await.unwrap();
        assert_eq!(result.score, 0.0);
        assert_eq!(result.analysis["explanation"], "");
    }

    #[tokio::test]
    async fn test_code_pipeline_needs_no_judge() {
        let scorer = PipelineScorer::new(
            "code",
            "test",
            stages(Analyze::Code(Box::new(|f: &Facts| Verdict {
                good: f.text == "answer",
                explanation: String::new(),
            }))),
        );
        assert_eq!(scorer.score(&run()).await.unwrap().score, 1.0);
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_rejected() {
        let mut bad = stages(Analyze::Code(Box::new(|_: &Facts| Verdict {
            good: true,
            explanation: String::new(),
        })));
        bad.generate_score = |_| 1.5;
        let scorer = PipelineScorer::new("bad", "test", bad);
        assert!(scorer.score(&run()).await.is_err());
    }

    #[test]
    fn test_response_schema_name_is_sanitized() {
        assert_eq!(
            response_schema_name("Promotion Creation Accuracy"),
            "promotion_creation_accuracy"
        );
    }
}
