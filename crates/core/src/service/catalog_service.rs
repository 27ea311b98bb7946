//! Catalog service implementation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use super::types::{
    CatalogState, CatalogStatus, PopulateTrigger, ReloadSummary, ServiceError, ServiceOptions,
};
use crate::catalog::search::{normalize_term, ranked_substring_matches};
use crate::catalog::{CatalogItem, CatalogMatch, CatalogStore};
use crate::config::SearchPolicy;
use crate::metrics::{CATALOG_ITEMS, POPULATE_DURATION, POPULATE_RUNS, SEARCHES};
use crate::source::{fetch_details_batched, merge_details, CatalogSource};

#[derive(Debug)]
struct Lifecycle {
    state: CatalogState,
    populated_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

/// Keeps the local cache in sync with the upstream source and serves
/// searches from the cache.
///
/// Reloads are serialized; searches never wait for them.
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    source: Arc<dyn CatalogSource>,
    options: ServiceOptions,
    lifecycle: RwLock<Lifecycle>,
    reload_lock: Mutex<()>,
}

impl CatalogService {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        source: Arc<dyn CatalogSource>,
        options: ServiceOptions,
    ) -> Self {
        Self {
            store,
            source,
            options,
            lifecycle: RwLock::new(Lifecycle {
                state: CatalogState::Uninitialized,
                populated_at: None,
                last_error: None,
            }),
            reload_lock: Mutex::new(()),
        }
    }

    pub fn search_policy(&self) -> SearchPolicy {
        self.options.search_policy
    }

    pub async fn state(&self) -> CatalogState {
        self.lifecycle.read().await.state
    }

    /// Populate the cache unless it is already present.
    ///
    /// A failed existence check counts as "absent", so an unreachable store
    /// leads to a (possibly redundant) population attempt rather than an
    /// empty catalog. Population errors are returned so the caller can
    /// decide whether to keep serving.
    pub async fn initialize(&self) -> Result<(), ServiceError> {
        let _guard = self.reload_lock.lock().await;
        info!("Checking catalog cache...");

        let present = match self.store.exists() {
            Ok(present) => present,
            Err(e) => {
                warn!(error = %e, "Cache existence check failed, treating cache as empty");
                false
            }
        };

        if present {
            let count = self.store.count().ok();
            if let Some(count) = count {
                CATALOG_ITEMS.set(count as i64);
            }
            info!(items = ?count, "Catalog cache present, skipping population");
            self.lifecycle.write().await.state = CatalogState::Ready;
            return Ok(());
        }

        info!("Catalog cache empty, populating from upstream");
        self.populate(PopulateTrigger::Startup, false).await?;
        Ok(())
    }

    /// Clear the cache and repopulate it from upstream.
    ///
    /// Waits for any reload already in progress. Returns once the new data
    /// is fully stored.
    pub async fn reload(&self) -> Result<ReloadSummary, ServiceError> {
        let _guard = self.reload_lock.lock().await;
        info!("Reloading catalog...");

        let count = self.populate(PopulateTrigger::Reload, true).await?;

        let message = "Catalog reloaded successfully".to_string();
        info!(count, "{}", message);
        Ok(ReloadSummary { message, count })
    }

    /// Search cached names with the configured policy. A blank term yields
    /// an empty result.
    pub async fn search(&self, term: &str) -> Result<Vec<CatalogMatch>, ServiceError> {
        if normalize_term(term).is_none() {
            return Ok(Vec::new());
        }

        let policy = self.options.search_policy;
        debug!(policy = policy.as_str(), "Searching catalog for {:?}", term);

        let result = match policy {
            SearchPolicy::Prefix => self.store.search_by_prefix(term),
            SearchPolicy::RankedSubstring => self
                .store
                .index_entries()
                .map(|entries| ranked_substring_matches(entries, term)),
        };

        match result {
            Ok(hits) => {
                let outcome = if hits.is_empty() { "miss" } else { "hit" };
                SEARCHES.with_label_values(&[policy.as_str(), outcome]).inc();
                debug!("Found {} matches for {:?}", hits.len(), term);
                Ok(hits)
            }
            Err(e) => {
                SEARCHES.with_label_values(&[policy.as_str(), "error"]).inc();
                error!(error = %e, "Catalog search failed");
                Err(e.into())
            }
        }
    }

    /// Look up one cached item. `Ok(None)` when the id is not cached.
    pub async fn get_item(&self, id: u32) -> Result<Option<CatalogItem>, ServiceError> {
        Ok(self.store.get(id)?)
    }

    pub async fn status(&self) -> CatalogStatus {
        let item_count = match self.store.count() {
            Ok(count) => Some(count),
            Err(e) => {
                warn!(error = %e, "Could not count cached items");
                None
            }
        };

        let lifecycle = self.lifecycle.read().await;
        CatalogStatus {
            state: lifecycle.state,
            item_count,
            populated_at: lifecycle.populated_at,
            search_policy: self.options.search_policy,
            last_error: lifecycle.last_error.clone(),
        }
    }

    /// Run one population cycle and record its outcome.
    ///
    /// Callers must hold `reload_lock`.
    async fn populate(
        &self,
        trigger: PopulateTrigger,
        clear_first: bool,
    ) -> Result<usize, ServiceError> {
        self.lifecycle.write().await.state = CatalogState::Populating;

        let timer = POPULATE_DURATION
            .with_label_values(&[trigger.as_str()])
            .start_timer();
        let result = self.fetch_and_store(clear_first).await;
        timer.observe_duration();

        let mut lifecycle = self.lifecycle.write().await;
        match &result {
            Ok(count) => {
                POPULATE_RUNS
                    .with_label_values(&[trigger.as_str(), "success"])
                    .inc();
                CATALOG_ITEMS.set(*count as i64);
                lifecycle.state = CatalogState::Ready;
                lifecycle.populated_at = Some(Utc::now());
                lifecycle.last_error = None;
                info!(trigger = trigger.as_str(), count, "Catalog population complete");
            }
            Err(e) => {
                POPULATE_RUNS
                    .with_label_values(&[trigger.as_str(), "failed"])
                    .inc();
                lifecycle.state = CatalogState::Failed;
                lifecycle.last_error = Some(e.to_string());
                error!(trigger = trigger.as_str(), error = %e, "Catalog population failed");
            }
        }

        result
    }

    async fn fetch_and_store(&self, clear_first: bool) -> Result<usize, ServiceError> {
        if clear_first {
            self.store.clear()?;
        }

        let mut items = self.source.fetch_all_items().await?;

        if self.options.fetch_details {
            let details = fetch_details_batched(
                self.source.as_ref(),
                &items,
                self.options.detail_batch_size,
            )
            .await;
            let fetched = items.len();
            items = merge_details(items, &details);
            info!("Kept {} of {} items after detail fetch", items.len(), fetched);
        }

        self.store.store(&items)?;
        Ok(items.len())
    }
}
