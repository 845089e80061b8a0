// SPDX-License-Identifier: MIT

//! Campaign - everything the CLI and the server operate on
//!
//! Built once at startup: backends chosen by settings, the four tools in a
//! registry, one descriptor per agent definition and the promotion workflow.

use crate::adk::agent::{AgentDescriptor, LLMAgent};
use crate::adk::error::{CampaignError, WorkflowError};
use crate::adk::model::Model;
use crate::adk::run::Run;
use crate::adk::scorer::{self, Judge, ModelJudge, ScorerOutcome};
use crate::adk::workflow::{Workflow, WorkflowResult};
use crate::campaign::backend::Backends;
use crate::campaign::config::Settings;
use crate::campaign::definitions::{AgentDefinition, DefinitionLoader};
use crate::campaign::factory::AgentFactory;
use crate::campaign::registry::ToolRegistry;
use crate::campaign::tools::create_tools;
use crate::campaign::workflow::promotion_workflow;
use chrono::Local;
use serde_json::Value;
use std::sync::Arc;

struct AgentEntry {
    definition: AgentDefinition,
    descriptor: Arc<AgentDescriptor>,
}

pub struct Campaign {
    settings: Settings,
    registry: ToolRegistry,
    judge: Arc<dyn Judge>,
    agents: Vec<AgentEntry>,
    workflow: Workflow,
}

impl Campaign {
    /// Backends and judge from `settings`
    pub async fn from_settings(settings: Settings) -> Result<Self, CampaignError> {
        let backends = Backends::from_settings(&settings)?;
        Self::build(settings, backends, Arc::new(ModelJudge::new())).await
    }

    pub async fn build(
        settings: Settings,
        backends: Backends,
        judge: Arc<dyn Judge>,
    ) -> Result<Self, CampaignError> {
        let registry = ToolRegistry::new();
        registry
            .register_all(create_tools(&backends, settings.tool_timeout()))
            .await;

        let mut definitions = DefinitionLoader::builtin()?;
        if let Some(dir) = &settings.agents_dir {
            for def in DefinitionLoader::load_dir(dir)? {
                log::info!("Loaded agent definition '{}' from {}", def.name, dir.display());
                // A file named like a built-in agent replaces it.
                definitions.retain(|d| d.name != def.name);
                definitions.push(def);
            }
        }

        let today = Local::now().date_naive();
        let factory = AgentFactory::new(&registry, judge.clone(), &settings);
        let mut agents = Vec::with_capacity(definitions.len());
        for definition in definitions {
            let descriptor = Arc::new(factory.descriptor(&definition, today).await?);
            agents.push(AgentEntry {
                definition,
                descriptor,
            });
        }

        let workflow = promotion_workflow(backends.promotions.clone())?;

        Ok(Self {
            settings,
            registry,
            judge,
            agents,
            workflow,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<AgentDescriptor>> {
        self.agents.iter().map(|a| &a.descriptor)
    }

    fn entry(&self, name: &str) -> Result<&AgentEntry, CampaignError> {
        self.agents
            .iter()
            .find(|a| a.definition.name == name)
            .ok_or_else(|| CampaignError::AgentNotFound {
                name: name.to_string(),
            })
    }

    pub fn descriptor(&self, name: &str) -> Result<Arc<AgentDescriptor>, CampaignError> {
        Ok(self.entry(name)?.descriptor.clone())
    }

    pub fn definition(&self, name: &str) -> Result<&AgentDefinition, CampaignError> {
        Ok(&self.entry(name)?.definition)
    }

    /// Agent over the model its descriptor names
    pub fn agent(&self, name: &str) -> Result<LLMAgent, CampaignError> {
        let entry = self.entry(name)?;
        self.factory()
            .build(&entry.definition, entry.descriptor.clone())
    }

    pub fn agent_with_model(
        &self,
        name: &str,
        model: Arc<dyn Model>,
    ) -> Result<LLMAgent, CampaignError> {
        let entry = self.entry(name)?;
        Ok(self
            .factory()
            .build_with_model(&entry.definition, entry.descriptor.clone(), model))
    }

    pub async fn call_tool(&self, id: &str, input: Value) -> Result<Value, CampaignError> {
        let tool = self
            .registry
            .get(id)
            .await
            .ok_or_else(|| CampaignError::tool_not_found(id))?;
        log::info!("Calling tool {} with {}", id, input);
        Ok(tool.execute(input).await?)
    }

    /// Re-score a recorded run with the scorers bound to `agent`
    pub async fn score(&self, agent: &str, run: &Run) -> Result<Vec<ScorerOutcome>, CampaignError> {
        let descriptor = self.descriptor(agent)?;
        Ok(scorer::evaluate(descriptor.scorers(), run, self.settings.scorer_timeout()).await)
    }

    pub async fn run_workflow(&self, input: Value) -> Result<WorkflowResult, WorkflowError> {
        self.workflow.execute(input).await
    }

    fn factory(&self) -> AgentFactory<'_> {
        AgentFactory::new(&self.registry, self.judge.clone(), &self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adk::error::ToolError;
    use crate::adk::run::RunItem;
    use serde_json::json;

    async fn campaign() -> Campaign {
        Campaign::build(
            Settings::default(),
            Backends::fixture(),
            Arc::new(ModelJudge::new()),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_builds_builtin_agents() {
        let campaign = campaign().await;
        let names: Vec<&str> = campaign.descriptors().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["promotion-agent", "analysis-agent"]);
        assert_eq!(campaign.registry().list().await.len(), 4);
        assert!(matches!(
            campaign.descriptor("sales-agent"),
            Err(CampaignError::AgentNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_call_tool() {
        let campaign = campaign().await;
        let result = campaign
            .call_tool("search-products", json!({"query": "denim"}))
            .await
            .unwrap();
        assert_eq!(result["products"][0]["id"], "P-104");

        assert!(matches!(
            campaign.call_tool("send-email", json!({})).await,
            Err(CampaignError::ToolNotFound { .. })
        ));
        assert!(matches!(
            campaign.call_tool("search-products", json!({})).await,
            Err(CampaignError::Tool(ToolError::SchemaValidation { .. }))
        ));
    }

    #[tokio::test]
    async fn test_score_recorded_run_isolates_judge_failure() {
        // The judge provider is unknown, so judged scorers fail while code scorers score.
        let settings = Settings {
            judge_model: "acme/judge-1".to_string(),
            ..Settings::default()
        };
        let campaign = Campaign::build(settings, Backends::fixture(), Arc::new(ModelJudge::new()))
            .await
            .unwrap();
        let run = Run::new("promotion-agent", "Create a summer promotion").with_items([
            RunItem::ToolCall {
                tool: "create-promotion-link".to_string(),
                args: json!({"promotionName": "Summer"}),
            },
            RunItem::Text {
                content: "Your summer promotion is live.".to_string(),
            },
        ]);

        let outcomes = campaign.score("promotion-agent", &run).await.unwrap();
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].score(), Some(1.0));
        assert!(outcomes[1].score().is_some());
        assert!(matches!(outcomes[2], ScorerOutcome::Failed { .. }));
    }
}
