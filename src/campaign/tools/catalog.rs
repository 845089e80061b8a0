// SPDX-License-Identifier: MIT

use crate::adk::error::ToolError;
use crate::adk::tool::TypedTool;
use crate::campaign::backend::{CatalogBackend, Product};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchInput {
    /// The search term (e.g., "summer dress", "shoes", "electronics").
    pub query: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct SearchOutput {
    pub products: Vec<Product>,
}

/// Catalog lookup by name or category; an empty page is a valid answer.
pub struct SearchProductsTool {
    backend: Arc<dyn CatalogBackend>,
}

impl SearchProductsTool {
    pub fn new(backend: Arc<dyn CatalogBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl TypedTool for SearchProductsTool {
    type Input = SearchInput;
    type Output = SearchOutput;

    fn id(&self) -> &'static str {
        "search-products"
    }

    fn description(&self) -> &'static str {
        "Searches the product catalog by name or category to retrieve product details and IDs."
    }

    async fn call(&self, input: SearchInput) -> Result<SearchOutput, ToolError> {
        let products = self.backend.search(&input.query).await?;
        log::debug!("Catalog search \"{}\" matched {}", input.query, products.len());
        Ok(SearchOutput { products })
    }
}
