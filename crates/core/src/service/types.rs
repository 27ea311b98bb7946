//! Types for the catalog service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::CacheError;
use crate::config::{Config, SearchPolicy};
use crate::source::SourceError;

/// Lifecycle of the cached catalog within this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogState {
    /// Startup check has not run yet.
    Uninitialized,
    /// Fetching from upstream and writing the cache.
    Populating,
    /// Cache populated, searches are served from it.
    Ready,
    /// Last population failed; searches see whatever the cache holds.
    Failed,
}

impl CatalogState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogState::Uninitialized => "uninitialized",
            CatalogState::Populating => "populating",
            CatalogState::Ready => "ready",
            CatalogState::Failed => "failed",
        }
    }
}

/// What started a population run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulateTrigger {
    Startup,
    Reload,
}

impl PopulateTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            PopulateTrigger::Startup => "startup",
            PopulateTrigger::Reload => "reload",
        }
    }
}

/// Snapshot returned by `CatalogService::status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStatus {
    pub state: CatalogState,
    /// Entries currently in the cache (`None` when the store is unreachable).
    pub item_count: Option<usize>,
    /// When this process last populated the cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub populated_at: Option<DateTime<Utc>>,
    pub search_policy: SearchPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Result of a reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadSummary {
    pub message: String,
    pub count: usize,
}

/// Behavior knobs taken from configuration.
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub search_policy: SearchPolicy,
    pub fetch_details: bool,
    pub detail_batch_size: usize,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            search_policy: SearchPolicy::Prefix,
            fetch_details: false,
            detail_batch_size: 10,
        }
    }
}

impl From<&Config> for ServiceOptions {
    fn from(config: &Config) -> Self {
        Self {
            search_policy: config.catalog.search_policy,
            fetch_details: config.source.fetch_details,
            detail_batch_size: config.source.detail_batch_size,
        }
    }
}

/// Errors surfaced by the catalog service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Catalog source unavailable: {0}")]
    Source(#[from] SourceError),

    #[error("Catalog cache failure: {0}")]
    Store(#[from] CacheError),
}
