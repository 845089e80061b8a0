// SPDX-License-Identifier: MIT

//! Literal backend data for local runs and tests

use super::{
    promotion_url, CatalogBackend, MetricsBackend, NewPromotion, PastPromotion, Product,
    PromotionBackend, PromotionMetrics, RegisteredPromotion,
};
use crate::adk::error::ToolError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::sync::Mutex;
use uuid::Uuid;

static PAST_PROMOTIONS: Lazy<Vec<PastPromotion>> = Lazy::new(|| {
    [
        ("PROMO-1", "Black Friday", "2023-11-24", "2023-11-27"),
        ("PROMO-2", "Cyber Monday", "2023-11-28", "2023-11-28"),
        ("PROMO-3", "Christmas Sale", "2023-12-20", "2023-12-26"),
    ]
    .into_iter()
    .map(|(id, name, start, end)| PastPromotion {
        id: id.to_string(),
        name: name.to_string(),
        start_date: start.to_string(),
        end_date: end.to_string(),
    })
    .collect()
});

static CATALOG: Lazy<Vec<Product>> = Lazy::new(|| {
    [
        ("P-101", "Summer Floral Dress", 50.0, "Apparel"),
        ("P-102", "Summer Beach Hat", 20.0, "Accessories"),
        ("P-103", "Running Shoes", 85.0, "Footwear"),
        ("P-104", "Denim Jacket", 120.0, "Apparel"),
    ]
    .into_iter()
    .map(|(id, name, price, category)| Product {
        id: id.to_string(),
        name: name.to_string(),
        price,
        category: Some(category.to_string()),
    })
    .collect()
});

/// Fixed data set. Registrations are recorded but never show up in
/// [`MetricsBackend::list_promotions`], which always returns the seed list.
#[derive(Default)]
pub struct FixtureBackend {
    registered: Mutex<Vec<RegisteredPromotion>>,
}

impl FixtureBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Promotions registered through this instance, oldest first
    pub fn registered(&self) -> Vec<RegisteredPromotion> {
        self.registered
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn catalog() -> &'static [Product] {
        &CATALOG
    }
}

#[async_trait]
impl MetricsBackend for FixtureBackend {
    /// Every id gets the same record; the fixture has no notion of unknown ids.
    async fn metrics(&self, promotion_id: &str) -> Result<PromotionMetrics, ToolError> {
        log::info!("Fetching metrics for {}", promotion_id);
        Ok(PromotionMetrics {
            promotion_id: promotion_id.to_string(),
            revenue: 12000.0,
            roi: 2.4,
            validations: 530,
        })
    }

    async fn list_promotions(&self) -> Result<Vec<PastPromotion>, ToolError> {
        log::info!("Fetching past promotions list");
        Ok(PAST_PROMOTIONS.clone())
    }
}

#[async_trait]
impl CatalogBackend for FixtureBackend {
    async fn search(&self, query: &str) -> Result<Vec<Product>, ToolError> {
        log::info!("Searching catalog for \"{}\"", query);
        Ok(CATALOG.iter().filter(|p| p.matches(query)).cloned().collect())
    }
}

#[async_trait]
impl PromotionBackend for FixtureBackend {
    async fn register(&self, promotion: &NewPromotion) -> Result<RegisteredPromotion, ToolError> {
        let promotion_id = format!("PROMO-{}", Uuid::new_v4().simple()).to_uppercase();
        log::info!(
            "Registering promotion \"{}\" as {}",
            promotion.promotion_name,
            promotion_id
        );

        let registered = RegisteredPromotion {
            url: promotion_url(&promotion_id),
            promotion_id,
            status: "active".to_string(),
        };
        self.registered
            .lock()
            .map_err(|_| ToolError::backend("fixture", "registration log poisoned"))?
            .push(registered.clone());
        Ok(registered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn new_promotion() -> NewPromotion {
        NewPromotion {
            product_ids: vec!["P-101".to_string()],
            promotion_name: "Summer Kickoff".to_string(),
            start_date: "2024-06-01".to_string(),
            end_date: "2024-06-07".to_string(),
            discount_percentage: Some(20.0),
            discount_flat_value: None,
        }
    }

    #[tokio::test]
    async fn test_metrics_record() {
        let backend = FixtureBackend::new();
        let metrics = backend.metrics("PROMO-2").await.unwrap();
        assert_eq!(metrics.promotion_id, "PROMO-2");
        assert_eq!(metrics.revenue, 12000.0);
        assert_eq!(metrics.roi, 2.4);
        assert_eq!(metrics.validations, 530);
    }

    #[tokio::test]
    async fn test_seed_list_in_order() {
        let backend = FixtureBackend::new();
        let list = backend.list_promotions().await.unwrap();
        let ids: Vec<&str> = list.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["PROMO-1", "PROMO-2", "PROMO-3"]);
        assert_eq!(list[2].name, "Christmas Sale");
    }

    #[tokio::test]
    async fn test_search_summer() {
        let backend = FixtureBackend::new();
        let names: Vec<String> = backend
            .search("summer")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Summer Floral Dress", "Summer Beach Hat"]);
    }

    #[tokio::test]
    async fn test_search_by_category_and_miss() {
        let backend = FixtureBackend::new();
        assert_eq!(backend.search("APPAREL").await.unwrap().len(), 2);
        assert!(backend.search("electronics").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_registration_ids_are_unique() {
        let backend = FixtureBackend::new();
        let mut ids = HashSet::new();
        for _ in 0..50 {
            let r = backend.register(&new_promotion()).await.unwrap();
            assert!(r.promotion_id.starts_with("PROMO-"));
            assert!(r.url.ends_with(&r.promotion_id));
            assert_eq!(r.status, "active");
            ids.insert(r.promotion_id);
        }
        assert_eq!(ids.len(), 50);
        assert_eq!(backend.registered().len(), 50);
        assert_eq!(backend.list_promotions().await.unwrap().len(), 3);
    }
}
