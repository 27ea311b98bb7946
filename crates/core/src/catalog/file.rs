//! JSON-file catalog cache.
//!
//! The whole catalog lives in one pretty-printed JSON array. Every read
//! parses the file again; writes replace it through a temp file + rename.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};

use super::{search, CacheError, CatalogItem, CatalogMatch, CatalogStore};

/// Catalog cache backed by a single JSON file.
pub struct FileCatalogStore {
    path: PathBuf,
    /// Serializes writers; readers see either the old or the new file.
    write_lock: Mutex<()>,
}

impl FileCatalogStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all items. A missing file is an empty catalog.
    fn load(&self) -> Result<Vec<CatalogItem>, CacheError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CacheError::Read(format!("{}: {}", self.path.display(), e))),
        };

        serde_json::from_str(&content)
            .map_err(|e| CacheError::Corrupt(format!("{}: {}", self.path.display(), e)))
    }

    fn write(&self, items: &[CatalogItem]) -> Result<(), CacheError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| CacheError::Write(e.to_string()))?;
        }

        let json =
            serde_json::to_string_pretty(items).map_err(|e| CacheError::Write(e.to_string()))?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| CacheError::Write(e.to_string()))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| CacheError::Write(e.to_string()))?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, CacheError> {
        self.write_lock
            .lock()
            .map_err(|_| CacheError::Write("file lock poisoned".to_string()))
    }
}

impl CatalogStore for FileCatalogStore {
    fn exists(&self) -> Result<bool, CacheError> {
        self.path
            .try_exists()
            .map_err(|e| CacheError::Read(e.to_string()))
    }

    fn store(&self, items: &[CatalogItem]) -> Result<(), CacheError> {
        let _guard = self.lock()?;

        let mut merged = self.load()?;
        merged.retain(|existing| !items.iter().any(|i| i.id == existing.id));
        merged.extend(items.iter().cloned());
        merged.sort_by_key(|i| i.id);

        self.write(&merged)?;
        info!(
            "Stored {} catalog items in {}",
            items.len(),
            self.path.display()
        );
        Ok(())
    }

    fn search_by_prefix(&self, prefix: &str) -> Result<Vec<CatalogMatch>, CacheError> {
        if search::normalize_term(prefix).is_none() {
            return Ok(Vec::new());
        }

        let hits = search::prefix_matches(self.index_entries()?, prefix);
        debug!("Prefix search {:?}: {} hits", prefix, hits.len());
        Ok(hits)
    }

    fn index_entries(&self) -> Result<Vec<CatalogMatch>, CacheError> {
        let mut entries: Vec<CatalogMatch> = self.load()?.iter().map(CatalogMatch::from).collect();
        entries.sort_by_key(|e| e.id);
        Ok(entries)
    }

    fn get(&self, id: u32) -> Result<Option<CatalogItem>, CacheError> {
        Ok(self.load()?.into_iter().find(|i| i.id == id))
    }

    fn count(&self) -> Result<usize, CacheError> {
        Ok(self.load()?.len())
    }

    fn clear(&self) -> Result<(), CacheError> {
        let _guard = self.lock()?;

        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Removed catalog file {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::Write(e.to_string())),
        }
    }
}
