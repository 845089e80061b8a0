// SPDX-License-Identifier: MIT

//! Campaign tools
//!
//! Tool ids are part of the wire contract: `get-promotion-metrics`,
//! `list-past-promotions`, `search-products`, `create-promotion-link`.

pub mod analysis;
pub mod catalog;
pub mod promotion;

use crate::adk::tool::{SchemaTool, Tool, TypedTool};
use crate::campaign::backend::Backends;
use std::sync::Arc;
use std::time::Duration;

fn wrap<T: TypedTool>(tool: T, timeout: Option<Duration>) -> Arc<dyn Tool> {
    let tool = SchemaTool::new(tool);
    match timeout {
        Some(limit) => Arc::new(tool.with_timeout(limit)),
        None => Arc::new(tool),
    }
}

/// All four tools, bound to `backends`
pub fn create_tools(backends: &Backends, timeout: Option<Duration>) -> Vec<Arc<dyn Tool>> {
    vec![
        wrap(
            analysis::GetPromotionMetricsTool::new(backends.metrics.clone()),
            timeout,
        ),
        wrap(
            analysis::ListPastPromotionsTool::new(backends.metrics.clone()),
            timeout,
        ),
        wrap(
            catalog::SearchProductsTool::new(backends.catalog.clone()),
            timeout,
        ),
        wrap(
            promotion::CreatePromotionLinkTool::new(backends.promotions.clone()),
            timeout,
        ),
    ]
}
