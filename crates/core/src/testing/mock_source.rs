//! Mock upstream source for testing.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::fixtures;
use crate::catalog::CatalogItem;
use crate::source::{item_id_from_url, CatalogItemDetail, CatalogSource, SourceError};

/// Mock implementation of the CatalogSource trait.
///
/// Provides controllable behavior for testing:
/// - Serve a configurable listing
/// - Track listing and detail requests for assertions
/// - Simulate listing outages and per-item detail failures
#[derive(Debug, Default)]
pub struct MockCatalogSource {
    items: Arc<RwLock<Vec<CatalogItem>>>,
    listing_down: Arc<RwLock<bool>>,
    failing_details: Arc<RwLock<HashSet<u32>>>,
    listing_calls: Arc<RwLock<usize>>,
    detail_calls: Arc<RwLock<Vec<String>>>,
}

impl MockCatalogSource {
    /// Create a mock with an empty listing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock serving `items`.
    pub fn with_items(items: Vec<CatalogItem>) -> Self {
        Self {
            items: Arc::new(RwLock::new(items)),
            ..Self::default()
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Replace the listing served from now on.
    pub async fn set_items(&self, items: Vec<CatalogItem>) {
        *self.items.write().await = items;
    }

    /// Make every listing request fail until `restore_listing` is called.
    pub async fn fail_listing(&self) {
        *self.listing_down.write().await = true;
    }

    pub async fn restore_listing(&self) {
        *self.listing_down.write().await = false;
    }

    /// Make detail requests for item `id` fail.
    pub async fn fail_detail_for(&self, id: u32) {
        self.failing_details.write().await.insert(id);
    }

    // =========================================================================
    // Request Recording
    // =========================================================================

    /// Number of listing requests, failed ones included.
    pub async fn listing_requests(&self) -> usize {
        *self.listing_calls.read().await
    }

    /// URLs of all detail requests, in call order.
    pub async fn detail_requests(&self) -> Vec<String> {
        self.detail_calls.read().await.clone()
    }
}

#[async_trait]
impl CatalogSource for MockCatalogSource {
    async fn fetch_all_items(&self) -> Result<Vec<CatalogItem>, SourceError> {
        *self.listing_calls.write().await += 1;

        if *self.listing_down.read().await {
            return Err(SourceError::ApiError {
                status: 503,
                message: "upstream unavailable".to_string(),
            });
        }

        let mut items = self.items.read().await.clone();
        items.sort_by_key(|item| item.id);
        Ok(items)
    }

    async fn fetch_item_detail(&self, url: &str) -> Result<CatalogItemDetail, SourceError> {
        self.detail_calls.write().await.push(url.to_string());

        let id = item_id_from_url(url).ok_or_else(|| SourceError::NotFound(url.to_string()))?;

        if self.failing_details.read().await.contains(&id) {
            return Err(SourceError::ApiError {
                status: 500,
                message: format!("detail {} failed", id),
            });
        }

        let items = self.items.read().await;
        let item = items
            .iter()
            .find(|item| item.id == id)
            .ok_or_else(|| SourceError::NotFound(url.to_string()))?;

        Ok(CatalogItemDetail {
            id,
            name: item.name.clone(),
            image_url: Some(fixtures::artwork_url(id)),
        })
    }
}
