//! Upstream catalog API client.
//!
//! The listing endpoint is read as one bounded page; per-item detail records
//! are only fetched when artwork enrichment is enabled.

mod pokeapi;
mod types;

pub use pokeapi::PokeApiClient;
pub use types::*;

use async_trait::async_trait;
use futures::future::join_all;
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::CatalogItem;
use crate::metrics::DETAIL_BATCHES_FAILED;

/// Errors that can occur when talking to the upstream API.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Source of catalog entries.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the listing page and return valid items sorted by id.
    async fn fetch_all_items(&self) -> Result<Vec<CatalogItem>, SourceError>;

    /// Fetch the detail record behind an item URL.
    async fn fetch_item_detail(&self, url: &str) -> Result<CatalogItemDetail, SourceError>;
}

/// Fetch details for `items` in consecutive batches of `batch_size`.
///
/// Requests inside a batch run concurrently and the next batch starts once
/// the previous one has finished. When any request of a batch fails the
/// whole batch is dropped.
pub async fn fetch_details_batched(
    source: &dyn CatalogSource,
    items: &[CatalogItem],
    batch_size: usize,
) -> Vec<CatalogItemDetail> {
    let batch_size = batch_size.max(1);
    let total_batches = items.len().div_ceil(batch_size);
    let mut details = Vec::with_capacity(items.len());

    for (index, batch) in items.chunks(batch_size).enumerate() {
        let results = join_all(batch.iter().map(|item| source.fetch_item_detail(&item.url))).await;

        match results.into_iter().collect::<Result<Vec<_>, _>>() {
            Ok(mut batch_details) => {
                details.append(&mut batch_details);
                info!("Processed detail batch {}/{}", index + 1, total_batches);
            }
            Err(e) => {
                DETAIL_BATCHES_FAILED.inc();
                warn!(
                    batch = index + 1,
                    total = total_batches,
                    error = %e,
                    "Detail batch failed, dropping its items"
                );
            }
        }
    }

    details
}

/// Attach artwork to items, keeping only the items that have a detail record.
pub fn merge_details(items: Vec<CatalogItem>, details: &[CatalogItemDetail]) -> Vec<CatalogItem> {
    items
        .into_iter()
        .filter_map(|mut item| {
            let detail = details.iter().find(|d| d.id == item.id)?;
            item.image = detail.image_url.clone();
            Some(item)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockCatalogSource};

    #[tokio::test]
    async fn test_fetch_details_batched_all_succeed() {
        let source = MockCatalogSource::with_items(fixtures::starter_items());
        let items = source.fetch_all_items().await.unwrap();

        let details = fetch_details_batched(&source, &items, 3).await;

        assert_eq!(details.len(), 4);
        assert_eq!(source.detail_requests().await.len(), 4);
        assert_eq!(details[0].id, 1);
        assert!(details[0].image_url.is_some());
    }

    #[tokio::test]
    async fn test_fetch_details_batched_drops_failed_batch() {
        let source = MockCatalogSource::with_items(fixtures::numbered_items(25));
        source.fail_detail_for(12).await;
        let items = source.fetch_all_items().await.unwrap();

        let details = fetch_details_batched(&source, &items, 10).await;

        // Batch 11..=20 is lost because of item 12
        assert_eq!(details.len(), 15);
        assert!(details.iter().all(|d| !(11..=20).contains(&d.id)));
        assert!(details.iter().any(|d| d.id == 10));
        assert!(details.iter().any(|d| d.id == 21));
    }

    #[tokio::test]
    async fn test_fetch_details_batched_empty_input() {
        let source = MockCatalogSource::new();
        let details = fetch_details_batched(&source, &[], 10).await;
        assert!(details.is_empty());
    }

    #[test]
    fn test_merge_details_keeps_only_detailed_items() {
        let items = fixtures::starter_items();
        let details = vec![
            CatalogItemDetail {
                id: 1,
                name: "bulbasaur".to_string(),
                image_url: Some("https://img.test/1.png".to_string()),
            },
            CatalogItemDetail {
                id: 4,
                name: "charmander".to_string(),
                image_url: None,
            },
        ];

        let merged = merge_details(items, &details);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].image.as_deref(), Some("https://img.test/1.png"));
        assert_eq!(merged[1].id, 4);
        assert!(merged[1].image.is_none());
    }
}
