//! Catalog cache - the local copy of the upstream catalog.
//!
//! Items are stored as per-item records (`catalog:{id}`) plus one
//! id-ordered index (`catalog:index`) that search scans in full.

mod file;
pub mod search;
mod sqlite;
mod types;

pub use file::FileCatalogStore;
pub use sqlite::SqliteCatalogStore;
pub use types::*;

use std::sync::Arc;

use crate::config::CacheBackend;

/// Trait for catalog cache storage.
pub trait CatalogStore: Send + Sync {
    /// Whether the index exists (the cache has been populated).
    ///
    /// SQLite needs at least one index member; the file backend only needs
    /// the file, so an empty population still counts there.
    fn exists(&self) -> Result<bool, CacheError>;

    /// Write the records and index entries for `items` as one batch.
    ///
    /// Existing entries with the same id are overwritten. The batch is not
    /// retried on failure.
    fn store(&self, items: &[CatalogItem]) -> Result<(), CacheError>;

    /// Names starting with `prefix`, case-insensitive, ascending by id,
    /// capped at [`PREFIX_SEARCH_LIMIT`].
    ///
    /// A blank prefix returns an empty result without touching the store.
    fn search_by_prefix(&self, prefix: &str) -> Result<Vec<CatalogMatch>, CacheError>;

    /// The whole index, ascending by id.
    fn index_entries(&self) -> Result<Vec<CatalogMatch>, CacheError>;

    /// Point lookup of a single record.
    fn get(&self, id: u32) -> Result<Option<CatalogItem>, CacheError>;

    /// Number of entries in the index.
    fn count(&self) -> Result<usize, CacheError>;

    /// Delete every record and the index.
    fn clear(&self) -> Result<(), CacheError>;
}

/// Open the store selected by `cache.url`.
pub fn open_store(backend: &CacheBackend) -> Result<Arc<dyn CatalogStore>, CacheError> {
    let store: Arc<dyn CatalogStore> = match backend {
        CacheBackend::Sqlite(path) => Arc::new(SqliteCatalogStore::new(path)?),
        CacheBackend::SqliteMemory => Arc::new(SqliteCatalogStore::in_memory()?),
        CacheBackend::File(path) => Arc::new(FileCatalogStore::new(path.clone())),
    };
    Ok(store)
}
