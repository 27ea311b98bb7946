pub mod catalog;
pub mod config;
pub mod metrics;
pub mod service;
pub mod source;
pub mod testing;

pub use catalog::{open_store, CacheError, CatalogItem, CatalogMatch, CatalogStore};
pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, CacheBackend,
    Config, ConfigError, SearchPolicy,
};
pub use service::{CatalogService, CatalogState, CatalogStatus, ReloadSummary, ServiceOptions};
pub use source::{CatalogSource, PokeApiClient, SourceError};
