//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock upstream and an in-memory cache, so the HTTP surface can be
//! exercised without network access.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use dexcache_core::{
    testing::MockCatalogSource, CatalogItem, CatalogService, CatalogSource, CatalogStore, Config,
    SearchPolicy, ServiceOptions,
};
use dexcache_core::catalog::SqliteCatalogStore;
use dexcache_server::{create_router, AppState};

/// Re-export fixtures for test convenience
pub use dexcache_core::testing::fixtures;

/// Test fixture for E2E testing with a mock upstream.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.get("/catalog/search?name=bulba").await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock upstream - configure the listing and failures
    pub source: Arc<MockCatalogSource>,
    /// The cache behind the service
    pub store: Arc<SqliteCatalogStore>,
    /// The service behind the router
    pub service: Arc<CatalogService>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
    pub body: Value,
}

impl TestFixture {
    /// Create a fixture with the starter dataset already cached.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let source = Arc::new(MockCatalogSource::with_items(test_config.items));
        if test_config.upstream_down {
            source.fail_listing().await;
        }

        let store =
            Arc::new(SqliteCatalogStore::in_memory().expect("Failed to create catalog store"));

        let mut config = Config::default();
        config.catalog.search_policy = test_config.search_policy;
        config.source.fetch_details = test_config.fetch_details;

        let service = Arc::new(CatalogService::new(
            Arc::clone(&store) as Arc<dyn CatalogStore>,
            Arc::clone(&source) as Arc<dyn CatalogSource>,
            ServiceOptions::from(&config),
        ));

        // Startup population; failures leave the service degraded
        let _ = service.initialize().await;

        let state = Arc::new(AppState::new(config, Arc::clone(&service)));
        let router = create_router(state);

        Self {
            router,
            source,
            store,
            service,
        }
    }

    /// Send a GET request.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.get_with_headers(path, &[]).await
    }

    /// Send a GET request with extra headers.
    pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        let mut request_builder = Request::builder().method("GET").uri(path);
        for (name, value) in headers {
            request_builder = request_builder.header(*name, *value);
        }
        let request = request_builder.body(Body::empty()).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            text,
            body,
        }
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Listing served by the mock upstream
    pub items: Vec<CatalogItem>,
    pub search_policy: SearchPolicy,
    pub fetch_details: bool,
    /// Make the upstream listing fail from the start
    pub upstream_down: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            items: fixtures::starter_items(),
            search_policy: SearchPolicy::Prefix,
            fetch_details: false,
            upstream_down: false,
        }
    }
}

impl TestConfig {
    /// Create config using the ranked substring search policy.
    pub fn ranked() -> Self {
        Self {
            search_policy: SearchPolicy::RankedSubstring,
            ..Default::default()
        }
    }

    /// Create config whose upstream is unreachable at startup.
    pub fn upstream_down() -> Self {
        Self {
            upstream_down: true,
            ..Default::default()
        }
    }
}
