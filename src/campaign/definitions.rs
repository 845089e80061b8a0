// SPDX-License-Identifier: MIT

//! Agent definitions - YAML documents describing one conversational role
//!
//! The two built-in agents ship embedded in the binary; more can be loaded
//! from a directory of `*.yaml` / `*.yml` files.

use crate::adk::error::CampaignError;
use crate::adk::scorer::Sampling;
use crate::campaign::scorers::ScorerKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const TODAY_PLACEHOLDER: &str = "{{today}}";

const BUILTIN: [(&str, &str); 2] = [
    (
        "promotion-agent.yaml",
        include_str!("../../agents/promotion-agent.yaml"),
    ),
    (
        "analysis-agent.yaml",
        include_str!("../../agents/analysis-agent.yaml"),
    ),
];

/// Agent definition
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentDefinition {
    /// Lookup key, e.g. `promotion-agent`
    pub name: String,
    /// Human-facing title, e.g. `Promotion Creation Agent`
    #[serde(default)]
    pub display_name: Option<String>,
    pub description: String,
    /// May contain `{{today}}`, replaced with the ISO date when rendered
    pub instructions: String,
    /// Provider-qualified model id; falls back to the configured default
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub scorers: Vec<ScorerDefinition>,
    pub max_turns: Option<u32>,
}

/// A scorer binding: binding name, scorer selection and sampling policy
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScorerDefinition {
    pub name: String,
    pub scorer: ScorerKind,
    #[serde(default)]
    pub sampling: Sampling,
}

impl AgentDefinition {
    /// Instructions with the date anchor filled in
    pub fn render_instructions(&self, today: NaiveDate) -> String {
        self.instructions
            .replace(TODAY_PLACEHOLDER, &today.format("%Y-%m-%d").to_string())
    }

    pub fn title(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    pub fn validate(&self) -> Result<(), CampaignError> {
        if self.name.trim().is_empty() {
            return Err(CampaignError::config("agent name must not be empty"));
        }
        let mut seen = HashSet::new();
        for tool in &self.tools {
            if !seen.insert(tool.as_str()) {
                return Err(CampaignError::config(format!(
                    "agent '{}' lists tool '{}' twice",
                    self.name, tool
                )));
            }
        }
        let mut seen = HashSet::new();
        for scorer in &self.scorers {
            if !seen.insert(scorer.name.as_str()) {
                return Err(CampaignError::config(format!(
                    "agent '{}' binds scorer '{}' twice",
                    self.name, scorer.name
                )));
            }
            scorer.sampling.validate().map_err(|e| {
                CampaignError::config(format!(
                    "agent '{}' scorer '{}': {}",
                    self.name, scorer.name, e
                ))
            })?;
        }
        Ok(())
    }
}

/// Loads agent definitions from YAML
pub struct DefinitionLoader;

impl DefinitionLoader {
    /// Parse and validate one definition
    pub fn parse_yaml(content: &str) -> Result<AgentDefinition, CampaignError> {
        let def: AgentDefinition = serde_yaml::from_str(content)?;
        def.validate()?;
        Ok(def)
    }

    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<AgentDefinition, CampaignError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content).map_err(|e| {
            CampaignError::config(format!("{}: {}", path.display(), e))
        })
    }

    /// Every `*.yaml` / `*.yml` file in `dir`, in file name order
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<AgentDefinition>, CampaignError> {
        let mut paths: Vec<_> = fs::read_dir(dir.as_ref())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext == "yaml" || ext == "yml")
            })
            .collect();
        paths.sort();
        paths.iter().map(Self::load_file).collect()
    }

    /// The embedded promotion and analysis agents
    pub fn builtin() -> Result<Vec<AgentDefinition>, CampaignError> {
        BUILTIN
            .iter()
            .map(|(file, content)| {
                Self::parse_yaml(content)
                    .map_err(|e| CampaignError::config(format!("built-in {}: {}", file, e)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_definition() {
        let yaml = r#"
name: test-agent
description: "A test agent"
instructions: "Today is {{today}}."
model: openai/gpt-4o
tools:
  - search-products
scorers:
  - name: accuracy
    scorer:
      type: tool-call-accuracy
      expectedTool: search-products
      strictMode: true
    sampling:
      type: ratio
      rate: 0.5
  - name: completeness
    scorer:
      type: completeness
"#;
        let def = DefinitionLoader::parse_yaml(yaml).unwrap();
        assert_eq!(def.name, "test-agent");
        assert_eq!(def.title(), "test-agent");
        assert_eq!(def.model.as_deref(), Some("openai/gpt-4o"));
        assert_eq!(def.tools, vec!["search-products"]);
        assert_eq!(def.scorers.len(), 2);
        assert_eq!(def.scorers[0].sampling, Sampling::Ratio { rate: 0.5 });
        assert_eq!(def.scorers[1].sampling, Sampling::Ratio { rate: 1.0 });
        assert!(def.max_turns.is_none());

        let today = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(def.render_instructions(today), "Today is 2024-03-09.");
    }

    #[test]
    fn test_rejects_bad_sampling_and_duplicates() {
        let bad_rate = r#"
name: a
description: d
instructions: i
scorers:
  - name: c
    scorer: { type: completeness }
    sampling: { type: ratio, rate: 2 }
"#;
        assert!(DefinitionLoader::parse_yaml(bad_rate).is_err());

        let duplicate = r#"
name: a
description: d
instructions: i
scorers:
  - name: c
    scorer: { type: completeness }
  - name: c
    scorer: { type: completeness }
"#;
        assert!(DefinitionLoader::parse_yaml(duplicate).is_err());
    }

    #[test]
    fn test_invalid_yaml_returns_error() {
        let yaml = r#"
name:
  - invalid structure
"#;
        assert!(DefinitionLoader::parse_yaml(yaml).is_err());
    }

    #[test]
    fn test_builtin_agents() {
        let defs = DefinitionLoader::builtin().unwrap();
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["promotion-agent", "analysis-agent"]);

        let promotion = &defs[0];
        assert_eq!(promotion.title(), "Promotion Creation Agent");
        assert_eq!(promotion.tools, vec!["create-promotion-link", "search-products"]);
        assert!(promotion.instructions.contains(TODAY_PLACEHOLDER));
        let scorer_names: Vec<&str> = promotion.scorers.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            scorer_names,
            vec!["toolCallAppropriateness", "completeness", "promotionClarity"]
        );

        let analysis = &defs[1];
        assert_eq!(
            analysis.tools,
            vec!["get-promotion-metrics", "list-past-promotions"]
        );
        assert!(analysis
            .scorers
            .iter()
            .any(|s| s.scorer == ScorerKind::AnalysisQuality));
    }

    #[test]
    fn test_load_dir_reads_yaml_files() {
        let dir = std::env::temp_dir().join(format!("campaign-defs-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("b.yaml"),
            "name: b\ndescription: d\ninstructions: i\n",
        )
        .unwrap();
        fs::write(
            dir.join("a.yml"),
            "name: a\ndescription: d\ninstructions: i\n",
        )
        .unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let defs = DefinitionLoader::load_dir(&dir).unwrap();
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);

        fs::remove_dir_all(&dir).unwrap();
    }
}
