// SPDX-License-Identifier: MIT

//! Agent descriptors

use crate::adk::scorer::ScorerBinding;
use crate::adk::tool::Tool;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Immutable configuration for one conversational role.
///
/// The instruction text is advisory: it is honored by the model, not
/// enforced here. Attached scorers audit compliance after the fact.
pub struct AgentDescriptor {
    pub name: String,
    pub description: String,
    pub instructions: String,
    /// Provider-qualified model id, e.g. `openai/gpt-4o-mini`
    pub model: String,
    tools: Vec<Arc<dyn Tool>>,
    /// HashMap for O(1) tool lookups
    tool_map: HashMap<String, usize>,
    scorers: Vec<ScorerBinding>,
}

impl AgentDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        instructions: impl Into<String>,
        model: impl Into<String>,
        tools: Vec<Arc<dyn Tool>>,
        scorers: Vec<ScorerBinding>,
    ) -> Self {
        let tool_map: HashMap<String, usize> = tools
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name().to_string(), i))
            .collect();

        Self {
            name: name.into(),
            description: description.into(),
            instructions: instructions.into(),
            model: model.into(),
            tools,
            tool_map,
            scorers,
        }
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    /// O(1) tool lookup by name
    pub fn tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tool_map.get(name).map(|&i| &self.tools[i])
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn scorers(&self) -> &[ScorerBinding] {
        &self.scorers
    }

    pub fn scorer(&self, name: &str) -> Option<&ScorerBinding> {
        self.scorers.iter().find(|s| s.name == name)
    }
}

impl fmt::Debug for AgentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentDescriptor")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("tools", &self.tool_names())
            .field(
                "scorers",
                &self.scorers.iter().map(|s| &s.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}
