//! Catalog service - populates the cache and answers searches from it.

mod catalog_service;
mod types;

pub use catalog_service::CatalogService;
pub use types::*;
