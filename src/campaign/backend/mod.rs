// SPDX-License-Identifier: MIT

//! Data services behind the tools
//!
//! Each service is a capability trait with two implementations: the literal
//! [`fixture`] data and a JSON-over-HTTP client in [`http`]. Which one the
//! tools get is decided by [`Settings`], never by the tools themselves.

pub mod fixture;
pub mod http;

use crate::adk::error::{CampaignError, ToolError};
use crate::campaign::config::{BackendKind, Settings};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Storefront that promotion links point at
pub const STORE_URL: &str = "https://store.com/p/";

pub fn promotion_url(promotion_id: &str) -> String {
    format!("{}{}", STORE_URL, promotion_id)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromotionMetrics {
    pub promotion_id: String,
    pub revenue: f64,
    pub roi: f64,
    pub validations: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PastPromotion {
    pub id: String,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Product {
    /// Case-insensitive substring match on name or category
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self
                .category
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&query))
    }
}

/// A promotion as submitted for registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPromotion {
    pub product_ids: Vec<String>,
    pub promotion_name: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_flat_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredPromotion {
    pub promotion_id: String,
    pub url: String,
    pub status: String,
}

/// Campaign performance data (read-only)
#[async_trait]
pub trait MetricsBackend: Send + Sync {
    async fn metrics(&self, promotion_id: &str) -> Result<PromotionMetrics, ToolError>;

    async fn list_promotions(&self) -> Result<Vec<PastPromotion>, ToolError>;
}

#[async_trait]
pub trait CatalogBackend: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Product>, ToolError>;
}

/// Promotion registration (the only write)
#[async_trait]
pub trait PromotionBackend: Send + Sync {
    async fn register(&self, promotion: &NewPromotion) -> Result<RegisteredPromotion, ToolError>;
}

/// The set of services handed to tools and workflow steps
#[derive(Clone)]
pub struct Backends {
    pub metrics: Arc<dyn MetricsBackend>,
    pub catalog: Arc<dyn CatalogBackend>,
    pub promotions: Arc<dyn PromotionBackend>,
}

impl Backends {
    pub fn fixture() -> Self {
        Self::shared(Arc::new(fixture::FixtureBackend::new()))
    }

    pub fn http(base_url: &str) -> Result<Self, CampaignError> {
        Ok(Self::shared(Arc::new(http::HttpBackend::new(base_url)?)))
    }

    /// One value serving all three capabilities
    pub fn shared<B>(backend: Arc<B>) -> Self
    where
        B: MetricsBackend + CatalogBackend + PromotionBackend + 'static,
    {
        Self {
            metrics: backend.clone(),
            catalog: backend.clone(),
            promotions: backend,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, CampaignError> {
        match settings.backend.kind {
            BackendKind::Fixture => {
                log::info!("Using fixture backend");
                Ok(Self::fixture())
            }
            BackendKind::Http => {
                let base = settings.backend.base_url.as_deref().ok_or_else(|| {
                    CampaignError::config("backend.kind is 'http' but no base_url is set")
                })?;
                log::info!("Using HTTP backend at {}", base);
                Self::http(base)
            }
        }
    }
}
