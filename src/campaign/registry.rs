// SPDX-License-Identifier: MIT

use crate::adk::tool::Tool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Tools by id, shared between the CLI, the server and agent construction
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Arc<RwLock<HashMap<String, Arc<dyn Tool>>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registering an existing id replaces the previous tool
    pub async fn register(&self, tool: Arc<dyn Tool>) {
        let mut tools = self.tools.write().await;
        log::debug!("Registered tool: {}", tool.name());
        tools.insert(tool.name().to_string(), tool);
    }

    pub async fn register_all(&self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) {
        for tool in tools {
            self.register(tool).await;
        }
    }

    pub async fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().await;
        tools.get(name).cloned()
    }

    /// All tools, sorted by id
    pub async fn list(&self) -> Vec<Arc<dyn Tool>> {
        let tools = self.tools.read().await;
        let mut all: Vec<Arc<dyn Tool>> = tools.values().cloned().collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        all
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adk::error::ToolError;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    use once_cell::sync::Lazy;

    static MOCK_SCHEMA: Lazy<Value> = Lazy::new(|| {
        json!({
            "type": "object",
            "properties": {}
        })
    });

    struct MockTool {
        name: String,
        version: u32,
    }

    impl MockTool {
        fn new(name: &str, version: u32) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                version,
            })
        }
    }

    #[async_trait]
    impl Tool for MockTool {
        fn name(&self) -> &str {
            &self.name
        }

        fn description(&self) -> &str {
            "mock"
        }

        fn schema(&self) -> &Value {
            &MOCK_SCHEMA
        }

        fn output_schema(&self) -> &Value {
            &MOCK_SCHEMA
        }

        async fn execute(&self, _input: Value) -> Result<Value, ToolError> {
            Ok(json!({ "version": self.version }))
        }
    }

    #[tokio::test]
    async fn test_register_and_get_tool() {
        let registry = ToolRegistry::new();
        registry.register(MockTool::new("search-products", 1)).await;

        let retrieved = registry.get("search-products").await;
        assert_eq!(retrieved.unwrap().name(), "search-products");
        assert!(registry.get("nonexistent").await.is_none());
    }

    #[tokio::test]
    async fn test_register_overwrites_existing() {
        let registry = ToolRegistry::new();
        registry.register(MockTool::new("same", 1)).await;
        registry.register(MockTool::new("same", 2)).await;

        let tool = registry.get("same").await.unwrap();
        assert_eq!(tool.execute(json!({})).await.unwrap()["version"], 2);
        assert_eq!(registry.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_list_is_sorted() {
        let registry = ToolRegistry::new();
        let tools: Vec<Arc<dyn Tool>> = vec![MockTool::new("b", 1), MockTool::new("a", 1)];
        registry.register_all(tools).await;

        let names: Vec<String> = registry
            .list()
            .await
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_registry_is_clone() {
        let registry = ToolRegistry::new();
        let cloned = registry.clone();
        cloned.register(MockTool::new("tool2", 1)).await;
        assert!(registry.get("tool2").await.is_some());
    }
}
