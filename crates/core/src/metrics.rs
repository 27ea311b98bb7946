//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Catalog population (runs, duration, stored items)
//! - Upstream detail batches
//! - Searches by policy

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Population Metrics
// =============================================================================

/// Population runs by trigger and result.
pub static POPULATE_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("dexcache_populate_runs_total", "Total catalog population runs"),
        &["trigger", "result"], // "startup" | "reload", "success" | "failed"
    )
    .unwrap()
});

/// Population duration in seconds.
pub static POPULATE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "dexcache_populate_duration_seconds",
            "Duration of a full fetch + store cycle",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["trigger"],
    )
    .unwrap()
});

/// Items held by the cache after the last successful population.
pub static CATALOG_ITEMS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("dexcache_catalog_items", "Number of items in the catalog cache").unwrap()
});

/// Detail batches dropped because one of their requests failed.
pub static DETAIL_BATCHES_FAILED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "dexcache_detail_batches_failed_total",
        "Detail batches dropped after a failed request",
    )
    .unwrap()
});

// =============================================================================
// Search Metrics
// =============================================================================

/// Searches by policy and outcome.
pub static SEARCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("dexcache_searches_total", "Total catalog searches"),
        &["policy", "result"], // "hit" | "miss" | "error"
    )
    .unwrap()
});

/// All core metrics, for registration in the server registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(POPULATE_RUNS.clone()),
        Box::new(POPULATE_DURATION.clone()),
        Box::new(CATALOG_ITEMS.clone()),
        Box::new(DETAIL_BATCHES_FAILED.clone()),
        Box::new(SEARCHES.clone()),
    ]
}
