//! SQLite-backed catalog cache.
//!
//! Laid out as a small key-value keyspace: `cache_records` holds one row per
//! `catalog:{id}` key and `cache_sorted_sets` holds scored members of the
//! `catalog:index` set (score = id, member = `{"id":..,"name":..}`).

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use super::{
    record_key, search, CacheError, CatalogItem, CatalogMatch, CatalogStore, INDEX_KEY,
    RECORD_KEY_PREFIX,
};

/// SQLite-backed catalog cache.
pub struct SqliteCatalogStore {
    conn: Mutex<Connection>,
}

impl SqliteCatalogStore {
    /// Open (or create) the cache database at `path`.
    pub fn new(path: &Path) -> Result<Self, CacheError> {
        let conn = Connection::open(path).map_err(|e| CacheError::Read(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        info!("Opened SQLite catalog cache at {:?}", path);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite cache (useful for testing).
    pub fn in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory().map_err(|e| CacheError::Read(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CacheError> {
        conn.execute_batch(
            r#"
            -- Per-item records, keyed "catalog:{id}"
            CREATE TABLE IF NOT EXISTS cache_records (
                key TEXT PRIMARY KEY,
                id INTEGER NOT NULL,
                name TEXT NOT NULL,
                url TEXT NOT NULL,
                image TEXT
            );

            -- Scored set members; one member per score within a set
            CREATE TABLE IF NOT EXISTS cache_sorted_sets (
                set_key TEXT NOT NULL,
                score INTEGER NOT NULL,
                member TEXT NOT NULL,
                PRIMARY KEY (set_key, score)
            );
            "#,
        )
        .map_err(|e| CacheError::Write(e.to_string()))?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn
            .lock()
            .map_err(|_| CacheError::Read("connection lock poisoned".to_string()))
    }

    /// Read and decode every index member in score order.
    ///
    /// Members that fail to decode are skipped.
    fn read_index(&self) -> Result<Vec<CatalogMatch>, CacheError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT member FROM cache_sorted_sets WHERE set_key = ? ORDER BY score")
            .map_err(|e| CacheError::Read(e.to_string()))?;

        let rows = stmt
            .query_map(params![INDEX_KEY], |row| row.get::<_, String>(0))
            .map_err(|e| CacheError::Read(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            let member = row.map_err(|e| CacheError::Read(e.to_string()))?;
            match serde_json::from_str::<CatalogMatch>(&member) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("Skipping unparsable index member {:?}: {}", member, e),
            }
        }
        Ok(entries)
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn exists(&self) -> Result<bool, CacheError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM cache_sorted_sets WHERE set_key = ?)",
            params![INDEX_KEY],
            |row| row.get(0),
        )
        .map_err(|e| CacheError::Read(e.to_string()))
    }

    fn store(&self, items: &[CatalogItem]) -> Result<(), CacheError> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| CacheError::Write(e.to_string()))?;

        {
            let mut insert_record = tx
                .prepare(
                    "INSERT OR REPLACE INTO cache_records (key, id, name, url, image)
                     VALUES (?, ?, ?, ?, ?)",
                )
                .map_err(|e| CacheError::Write(e.to_string()))?;
            let mut insert_member = tx
                .prepare(
                    "INSERT OR REPLACE INTO cache_sorted_sets (set_key, score, member)
                     VALUES (?, ?, ?)",
                )
                .map_err(|e| CacheError::Write(e.to_string()))?;

            for item in items {
                insert_record
                    .execute(params![
                        record_key(item.id),
                        item.id,
                        &item.name,
                        &item.url,
                        &item.image,
                    ])
                    .map_err(|e| CacheError::Write(e.to_string()))?;

                let member = serde_json::to_string(&CatalogMatch::from(item))
                    .map_err(|e| CacheError::Write(e.to_string()))?;
                insert_member
                    .execute(params![INDEX_KEY, item.id, member])
                    .map_err(|e| CacheError::Write(e.to_string()))?;
            }
        }

        tx.commit().map_err(|e| CacheError::Write(e.to_string()))?;

        info!("Stored {} catalog items", items.len());
        Ok(())
    }

    fn search_by_prefix(&self, prefix: &str) -> Result<Vec<CatalogMatch>, CacheError> {
        if search::normalize_term(prefix).is_none() {
            return Ok(Vec::new());
        }

        let entries = self.read_index()?;
        let scanned = entries.len();
        let hits = search::prefix_matches(entries, prefix);
        debug!(
            "Prefix search {:?}: {} hits out of {} entries",
            prefix,
            hits.len(),
            scanned
        );
        Ok(hits)
    }

    fn index_entries(&self) -> Result<Vec<CatalogMatch>, CacheError> {
        self.read_index()
    }

    fn get(&self, id: u32) -> Result<Option<CatalogItem>, CacheError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, name, url, image FROM cache_records WHERE key = ?",
            params![record_key(id)],
            |row| {
                Ok(CatalogItem {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    url: row.get(2)?,
                    image: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(|e| CacheError::Read(e.to_string()))
    }

    fn count(&self) -> Result<usize, CacheError> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM cache_sorted_sets WHERE set_key = ?",
                params![INDEX_KEY],
                |row| row.get(0),
            )
            .map_err(|e| CacheError::Read(e.to_string()))?;
        Ok(count as usize)
    }

    fn clear(&self) -> Result<(), CacheError> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| CacheError::Write(e.to_string()))?;

        let records = tx
            .execute(
                "DELETE FROM cache_records WHERE key LIKE ?",
                params![format!("{}%", RECORD_KEY_PREFIX)],
            )
            .map_err(|e| CacheError::Write(e.to_string()))?;
        tx.execute(
            "DELETE FROM cache_sorted_sets WHERE set_key = ?",
            params![INDEX_KEY],
        )
        .map_err(|e| CacheError::Write(e.to_string()))?;

        tx.commit().map_err(|e| CacheError::Write(e.to_string()))?;

        info!("Cleared catalog cache ({} records)", records);
        Ok(())
    }
}
