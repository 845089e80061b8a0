// SPDX-License-Identifier: MIT

//! Scorers - post-hoc quality evaluation of agent runs
//!
//! A scorer inspects a finished [`Run`] and emits a score in `[0, 1]` with a
//! human-readable reason. Scorers attached to an agent are sampled, evaluated
//! concurrently against the same run, and isolated from one another: a
//! failing scorer is reported, never turned into a score, and never fails the
//! run it was scoring.

mod judge;
mod pipeline;

pub use judge::{Judge, JudgeConfig, ModelJudge};
pub use pipeline::{Analyze, PipelineScorer, Stages};

use crate::adk::error::ScoringError;
use crate::adk::run::Run;
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Result of one successful scorer evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub scorer: String,
    pub run_id: Uuid,
    pub score: f64,
    pub reason: String,
    /// Output of the preprocess stage
    pub preprocess: Value,
    /// Output of the analyze stage
    pub analysis: Value,
}

/// Core trait for scorers
#[async_trait]
pub trait Scorer: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    async fn score(&self, run: &Run) -> Result<ScoreResult, ScoringError>;
}

/// Which runs a scorer evaluates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Sampling {
    /// Never evaluate
    None,
    /// Evaluate this fraction of runs
    Ratio { rate: f64 },
}

impl Default for Sampling {
    fn default() -> Self {
        Sampling::Ratio { rate: 1.0 }
    }
}

impl Sampling {
    /// Deterministic per run: the same run id always gets the same answer.
    pub fn should_sample(&self, run_id: &Uuid) -> bool {
        match self {
            Sampling::None => false,
            Sampling::Ratio { rate } if *rate >= 1.0 => true,
            Sampling::Ratio { rate } if *rate <= 0.0 || rate.is_nan() => false,
            Sampling::Ratio { rate } => {
                let bytes = run_id.as_bytes();
                let mut head = [0u8; 8];
                head.copy_from_slice(&bytes[..8]);
                let position = u64::from_be_bytes(head) as f64 / u64::MAX as f64;
                position < *rate
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            Sampling::Ratio { rate } if !(0.0..=1.0).contains(rate) => {
                Err(format!("sampling rate {} outside [0, 1]", rate))
            }
            _ => Ok(()),
        }
    }
}

/// A scorer attached to an agent under a binding name
#[derive(Clone)]
pub struct ScorerBinding {
    pub name: String,
    pub scorer: Arc<dyn Scorer>,
    pub sampling: Sampling,
}

/// What happened to one scorer binding for one run
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScorerOutcome {
    Scored { name: String, result: ScoreResult },
    Skipped { name: String },
    Failed { name: String, error: String },
}

impl ScorerOutcome {
    pub fn name(&self) -> &str {
        match self {
            ScorerOutcome::Scored { name, .. }
            | ScorerOutcome::Skipped { name }
            | ScorerOutcome::Failed { name, .. } => name,
        }
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            ScorerOutcome::Scored { result, .. } => Some(result.score),
            _ => None,
        }
    }
}

/// Evaluate every binding against `run`, concurrently and independently.
///
/// Outcomes are returned in binding order.
pub async fn evaluate(
    bindings: &[ScorerBinding],
    run: &Run,
    timeout: Option<Duration>,
) -> Vec<ScorerOutcome> {
    let futures = bindings.iter().map(|binding| async move {
        if !binding.sampling.should_sample(&run.id) {
            log::debug!("Scorer {} skipped run {} by sampling", binding.name, run.id);
            return ScorerOutcome::Skipped {
                name: binding.name.clone(),
            };
        }

        let result = match timeout {
            Some(limit) => match tokio::time::timeout(limit, binding.scorer.score(run)).await {
                Ok(result) => result,
                Err(_) => Err(ScoringError::failed(
                    binding.scorer.name(),
                    format!("timed out after {}ms", limit.as_millis()),
                )),
            },
            None => binding.scorer.score(run).await,
        };

        match result {
            Ok(result) => {
                log::info!(
                    "Scorer {} scored run {}: {} ({})",
                    binding.name,
                    run.id,
                    result.score,
                    result.reason
                );
                ScorerOutcome::Scored {
                    name: binding.name.clone(),
                    result,
                }
            }
            Err(e) => {
                log::warn!("Scorer {} failed on run {}: {}", binding.name, run.id, e);
                ScorerOutcome::Failed {
                    name: binding.name.clone(),
                    error: e.to_string(),
                }
            }
        }
    });

    join_all(futures).await
}
