// SPDX-License-Identifier: MIT

//! Agent module - descriptors and the runtime that executes them
//!
//! - [`AgentDescriptor`] - immutable role configuration (instructions, tools, scorers)
//! - [`LLMAgent`] - tool-calling loop over a [`Model`](crate::adk::model::Model)
//!   that records a [`Run`] and scores it in the background

mod descriptor;
mod llm;

pub use descriptor::AgentDescriptor;
pub use llm::LLMAgent;

use crate::adk::error::CampaignError;
use crate::adk::run::Run;
use crate::adk::scorer::ScorerOutcome;
use async_trait::async_trait;
use serde::Serialize;
use std::future::Future;
use tokio::task::JoinHandle;

/// Scorers still running over a finished run
#[derive(Debug)]
pub struct PendingScores(JoinHandle<Vec<ScorerOutcome>>);

impl PendingScores {
    pub fn spawn<F>(scoring: F) -> Self
    where
        F: Future<Output = Vec<ScorerOutcome>> + Send + 'static,
    {
        Self(tokio::spawn(scoring))
    }

    pub async fn wait(self) -> Vec<ScorerOutcome> {
        match self.0.await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                log::error!("Scoring task did not finish: {}", e);
                Vec::new()
            }
        }
    }
}

/// Everything one agent turn produced
#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub text: String,
    pub run: Run,
    /// Scoring is never awaited before the reply; dropping this leaves it running
    #[serde(skip)]
    pub scoring: Option<PendingScores>,
}

impl AgentResponse {
    /// Wait for the background scorers; empty when there are none
    pub async fn scores(&mut self) -> Vec<ScorerOutcome> {
        match self.scoring.take() {
            Some(pending) => pending.wait().await,
            None => Vec::new(),
        }
    }
}

/// Core agent trait
#[async_trait]
pub trait Agent: Send + Sync {
    /// Returns the agent name
    fn name(&self) -> &str;

    /// Run the agent with the given input
    async fn run(&self, input: String) -> Result<AgentResponse, CampaignError>;
}
