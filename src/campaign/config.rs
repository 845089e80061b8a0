// SPDX-License-Identifier: MIT

//! Runtime settings
//!
//! Read from an optional YAML file (`campaign.yaml`, or the path in
//! `CAMPAIGN_CONFIG`) and then overridden by `CAMPAIGN_*` environment
//! variables. OpenAI credentials stay in `OPENAI_API_KEY` / `OPENAI_BASE_URL`
//! and are read by the model itself.

use crate::adk::error::CampaignError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "campaign.yaml";
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Where the tools get their data from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Built-in literal data
    #[default]
    Fixture,
    /// JSON over HTTP at `backend.base_url`
    Http,
}

impl std::str::FromStr for BackendKind {
    type Err = CampaignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fixture" => Ok(BackendKind::Fixture),
            "http" => Ok(BackendKind::Http),
            other => Err(CampaignError::config(format!(
                "unknown backend '{}', expected 'fixture' or 'http'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub kind: BackendKind,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4111,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend: BackendSettings,
    /// Model id for agents whose descriptor does not name one
    pub model: String,
    /// Model id for LLM-judged scorers
    pub judge_model: String,
    pub tool_timeout_secs: Option<u64>,
    pub scorer_timeout_secs: Option<u64>,
    /// Extra agent descriptor files, loaded after the built-in ones
    pub agents_dir: Option<PathBuf>,
    pub server: ServerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: BackendSettings::default(),
            model: DEFAULT_MODEL.to_string(),
            judge_model: DEFAULT_MODEL.to_string(),
            tool_timeout_secs: Some(30),
            scorer_timeout_secs: Some(60),
            agents_dir: None,
            server: ServerSettings::default(),
        }
    }
}

impl Settings {
    /// File (if any) plus process environment
    pub fn load() -> Result<Self, CampaignError> {
        let path = env::var("CAMPAIGN_CONFIG").ok();
        let mut settings = match &path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };
        settings.apply_overrides(|key| env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CampaignError> {
        let path = path.as_ref();
        log::info!("Loading settings from {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| {
            CampaignError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse_yaml(&content)
    }

    pub fn parse_yaml(content: &str) -> Result<Self, CampaignError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply `CAMPAIGN_*` overrides from `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), CampaignError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(kind) = lookup("CAMPAIGN_BACKEND") {
            self.backend.kind = kind.parse()?;
        }
        if let Some(url) = lookup("CAMPAIGN_BACKEND_URL") {
            self.backend.base_url = Some(url);
        }
        if let Some(model) = lookup("CAMPAIGN_MODEL") {
            self.model = model;
        }
        if let Some(model) = lookup("CAMPAIGN_JUDGE_MODEL") {
            self.judge_model = model;
        }
        if let Some(secs) = lookup("CAMPAIGN_TOOL_TIMEOUT_SECS") {
            self.tool_timeout_secs = parse_secs("CAMPAIGN_TOOL_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = lookup("CAMPAIGN_SCORER_TIMEOUT_SECS") {
            self.scorer_timeout_secs = parse_secs("CAMPAIGN_SCORER_TIMEOUT_SECS", &secs)?;
        }
        if let Some(dir) = lookup("CAMPAIGN_AGENTS_DIR") {
            self.agents_dir = Some(PathBuf::from(dir));
        }
        if let Some(port) = lookup("CAMPAIGN_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| CampaignError::config(format!("invalid CAMPAIGN_PORT '{}'", port)))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), CampaignError> {
        if self.backend.kind == BackendKind::Http {
            let base = self.backend.base_url.as_deref().ok_or_else(|| {
                CampaignError::config("backend.kind is 'http' but no base_url is set")
            })?;
            url::Url::parse(base).map_err(|e| {
                CampaignError::config(format!("invalid backend base_url '{}': {}", base, e))
            })?;
        }
        if self.model.trim().is_empty() || self.judge_model.trim().is_empty() {
            return Err(CampaignError::config("model ids must not be empty"));
        }
        Ok(())
    }

    pub fn tool_timeout(&self) -> Option<Duration> {
        self.tool_timeout_secs.map(Duration::from_secs)
    }

    pub fn scorer_timeout(&self) -> Option<Duration> {
        self.scorer_timeout_secs.map(Duration::from_secs)
    }
}

/// `0` disables the timeout
fn parse_secs(key: &str, value: &str) -> Result<Option<u64>, CampaignError> {
    let secs: u64 = value
        .trim()
        .parse()
        .map_err(|_| CampaignError::config(format!("invalid {} '{}'", key, value)))?;
    Ok((secs > 0).then_some(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.backend.kind, BackendKind::Fixture);
        assert_eq!(settings.model, "openai/gpt-4o-mini");
        assert_eq!(settings.tool_timeout(), Some(Duration::from_secs(30)));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
backend:
  kind: http
  base_url: "http://localhost:9000"
judge_model: openai/gpt-4o
server:
  port: 8080
"#;
        let settings = Settings::parse_yaml(yaml).unwrap();
        assert_eq!(settings.backend.kind, BackendKind::Http);
        assert_eq!(settings.judge_model, "openai/gpt-4o");
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings
            .apply_overrides(lookup(&[
                ("CAMPAIGN_BACKEND", "HTTP"),
                ("CAMPAIGN_BACKEND_URL", "http://backend:8000"),
                ("CAMPAIGN_MODEL", "openai/gpt-4o"),
                ("CAMPAIGN_TOOL_TIMEOUT_SECS", "0"),
                ("CAMPAIGN_SCORER_TIMEOUT_SECS", "5"),
            ]))
            .unwrap();

        assert_eq!(settings.backend.kind, BackendKind::Http);
        assert_eq!(settings.backend.base_url.as_deref(), Some("http://backend:8000"));
        assert_eq!(settings.model, "openai/gpt-4o");
        assert_eq!(settings.tool_timeout(), None);
        assert_eq!(settings.scorer_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_invalid_overrides() {
        let mut settings = Settings::default();
        assert!(settings
            .apply_overrides(lookup(&[("CAMPAIGN_BACKEND", "postgres")]))
            .is_err());
        assert!(settings
            .apply_overrides(lookup(&[("CAMPAIGN_TOOL_TIMEOUT_SECS", "soon")]))
            .is_err());
    }

    #[test]
    fn test_http_backend_requires_valid_url() {
        let mut settings = Settings::default();
        settings.backend.kind = BackendKind::Http;
        assert!(matches!(settings.validate(), Err(CampaignError::Config(_))));

        settings.backend.base_url = Some("not a url".to_string());
        assert!(settings.validate().is_err());

        settings.backend.base_url = Some("https://api.example.com".to_string());
        assert!(settings.validate().is_ok());
    }
}
