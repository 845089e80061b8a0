// SPDX-License-Identifier: MIT

//! JSON-over-HTTP backend
//!
//! Routes, relative to the configured base URL:
//! - `GET  metrics/{id}`      -> [`PromotionMetrics`]
//! - `GET  promotions`        -> `[PastPromotion]`
//! - `GET  products?q=...`    -> `{ "products": [Product] }`
//! - `POST promotions`        -> [`RegisteredPromotion`]

use super::{
    CatalogBackend, MetricsBackend, NewPromotion, PastPromotion, Product, PromotionBackend,
    PromotionMetrics, RegisteredPromotion,
};
use crate::adk::error::{CampaignError, ToolError};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

const SERVICE: &str = "campaign-backend";

#[derive(Deserialize)]
struct ProductPage {
    products: Vec<Product>,
}

pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, CampaignError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, CampaignError> {
        let base = Url::parse(base_url).map_err(|e| {
            CampaignError::config(format!("invalid backend base_url '{}': {}", base_url, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(CampaignError::config(format!(
                "backend base_url '{}' cannot carry a path",
                base_url
            )));
        }
        Ok(Self { client, base })
    }

    /// Base URL with `segments` appended, each percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, ToolError> {
        let response = request
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ToolError::backend(SERVICE, e))?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        log::error!("{} returned {}: {}", SERVICE, status, body);
        Err(ToolError::backend(
            SERVICE,
            format!("HTTP {}: {}", status, body),
        ))
    }

    async fn decode<T: DeserializeOwned>(
        response: Response,
        what: &str,
    ) -> Result<T, ToolError> {
        let body = response
            .text()
            .await
            .map_err(|e| ToolError::backend(SERVICE, e))?;
        serde_json::from_str(&body)
            .map_err(|e| ToolError::output(SERVICE, format!("malformed {} response: {}", what, e)))
    }

    fn reject_not_found(response: &Response, path: &Url) -> Result<(), ToolError> {
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ToolError::backend(
                SERVICE,
                format!("route {} not found", path),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl MetricsBackend for HttpBackend {
    async fn metrics(&self, promotion_id: &str) -> Result<PromotionMetrics, ToolError> {
        let url = self.endpoint(&["metrics", promotion_id]);
        log::info!("Fetching metrics for {} from {}", promotion_id, url);
        let response = self.send(self.client.get(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ToolError::not_found("promotion", promotion_id));
        }
        Self::decode(response, "metrics").await
    }

    async fn list_promotions(&self) -> Result<Vec<PastPromotion>, ToolError> {
        let url = self.endpoint(&["promotions"]);
        let response = self.send(self.client.get(url.clone())).await?;
        Self::reject_not_found(&response, &url)?;
        Self::decode(response, "promotions").await
    }
}

#[async_trait]
impl CatalogBackend for HttpBackend {
    async fn search(&self, query: &str) -> Result<Vec<Product>, ToolError> {
        let mut url = self.endpoint(&["products"]);
        url.query_pairs_mut().append_pair("q", query);
        let response = self.send(self.client.get(url.clone())).await?;
        Self::reject_not_found(&response, &url)?;
        let page: ProductPage = Self::decode(response, "products").await?;
        Ok(page.products)
    }
}

#[async_trait]
impl PromotionBackend for HttpBackend {
    async fn register(&self, promotion: &NewPromotion) -> Result<RegisteredPromotion, ToolError> {
        let url = self.endpoint(&["promotions"]);
        log::info!("Registering promotion \"{}\"", promotion.promotion_name);
        let response = self
            .send(self.client.post(url.clone()).json(promotion))
            .await?;
        Self::reject_not_found(&response, &url)?;
        Self::decode(response, "registration").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_and_encodes() {
        let backend = HttpBackend::new("http://localhost:9000/api/").unwrap();
        assert_eq!(
            backend.endpoint(&["metrics", "PROMO 1"]).as_str(),
            "http://localhost:9000/api/metrics/PROMO%201"
        );

        let bare = HttpBackend::new("http://localhost:9000").unwrap();
        assert_eq!(
            bare.endpoint(&["promotions"]).as_str(),
            "http://localhost:9000/promotions"
        );
    }

    #[test]
    fn test_rejects_unusable_base() {
        assert!(HttpBackend::new("not a url").is_err());
        assert!(HttpBackend::new("mailto:ops@store.com").is_err());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_unavailable() {
        // Port 9 (discard) is closed on any sane test host.
        let backend = HttpBackend::new("http://127.0.0.1:9").unwrap();
        let err = backend.list_promotions().await.unwrap_err();
        assert!(matches!(err, ToolError::BackendUnavailable { .. }));
    }
}
