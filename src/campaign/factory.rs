// SPDX-License-Identifier: MIT

//! Agent factory - turns definitions into descriptors and runnable agents
//!
//! Tool ids are resolved against the [`ToolRegistry`], scorer selections are
//! instantiated with the shared judge, and the model is only constructed
//! when an agent is actually going to run.

use crate::adk::agent::{AgentDescriptor, LLMAgent};
use crate::adk::error::CampaignError;
use crate::adk::model::{create_model, Model};
use crate::adk::scorer::{Judge, ScorerBinding};
use crate::adk::tool::Tool;
use crate::campaign::config::Settings;
use crate::campaign::definitions::AgentDefinition;
use crate::campaign::registry::ToolRegistry;
use chrono::NaiveDate;
use std::sync::Arc;

pub struct AgentFactory<'a> {
    registry: &'a ToolRegistry,
    judge: Arc<dyn Judge>,
    settings: &'a Settings,
}

impl<'a> AgentFactory<'a> {
    pub fn new(
        registry: &'a ToolRegistry,
        judge: Arc<dyn Judge>,
        settings: &'a Settings,
    ) -> Self {
        Self {
            registry,
            judge,
            settings,
        }
    }

    /// Build the immutable descriptor, with instructions anchored to `today`
    pub async fn descriptor(
        &self,
        def: &AgentDefinition,
        today: NaiveDate,
    ) -> Result<AgentDescriptor, CampaignError> {
        let tools = self.collect_tools(def).await?;
        let scorers = self.collect_scorers(def);
        let model = def
            .model
            .clone()
            .unwrap_or_else(|| self.settings.model.clone());

        log::info!(
            "Built descriptor '{}' ({}) with {} tools and {} scorers",
            def.name,
            model,
            tools.len(),
            scorers.len()
        );

        Ok(AgentDescriptor::new(
            def.name.clone(),
            def.description.clone(),
            def.render_instructions(today),
            model,
            tools,
            scorers,
        ))
    }

    /// Runnable agent over `model`
    pub fn build_with_model(
        &self,
        def: &AgentDefinition,
        descriptor: Arc<AgentDescriptor>,
        model: Arc<dyn Model>,
    ) -> LLMAgent {
        let mut agent = LLMAgent::new(descriptor, model);
        if let Some(max_turns) = def.max_turns {
            agent = agent.with_max_turns(max_turns);
        }
        if let Some(timeout) = self.settings.scorer_timeout() {
            agent = agent.with_scorer_timeout(timeout);
        }
        agent
    }

    /// Runnable agent over the model its descriptor names
    pub fn build(
        &self,
        def: &AgentDefinition,
        descriptor: Arc<AgentDescriptor>,
    ) -> Result<LLMAgent, CampaignError> {
        log::debug!("Using model '{}' for agent '{}'", descriptor.model, def.name);
        let model = create_model(&descriptor.model)?;
        Ok(self.build_with_model(def, descriptor, model))
    }

    /// Unknown tool ids are a configuration error
    async fn collect_tools(
        &self,
        def: &AgentDefinition,
    ) -> Result<Vec<Arc<dyn Tool>>, CampaignError> {
        let mut tools: Vec<Arc<dyn Tool>> = Vec::with_capacity(def.tools.len());
        for tool_name in &def.tools {
            match self.registry.get(tool_name).await {
                Some(tool) => tools.push(tool),
                None => {
                    log::error!("Agent '{}' references unknown tool '{}'", def.name, tool_name);
                    return Err(CampaignError::tool_not_found(tool_name));
                }
            }
        }
        Ok(tools)
    }

    fn collect_scorers(&self, def: &AgentDefinition) -> Vec<ScorerBinding> {
        def.scorers
            .iter()
            .map(|binding| ScorerBinding {
                name: binding.name.clone(),
                scorer: binding.scorer.build(&self.judge, &self.settings.judge_model),
                sampling: binding.sampling.clone(),
            })
            .collect()
    }
}
