use std::sync::Arc;

use dexcache_core::{CatalogService, Config};

/// Shared application state
pub struct AppState {
    config: Config,
    catalog: Arc<CatalogService>,
}

impl AppState {
    pub fn new(config: Config, catalog: Arc<CatalogService>) -> Self {
        Self { config, catalog }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &CatalogService {
        self.catalog.as_ref()
    }
}
