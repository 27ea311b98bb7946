//! Types for the cached catalog.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key prefix of per-item records (`catalog:{id}`).
pub const RECORD_KEY_PREFIX: &str = "catalog:";

/// Key of the id-ordered index; its presence marks a populated cache.
pub const INDEX_KEY: &str = "catalog:index";

/// Result cap for prefix search.
pub const PREFIX_SEARCH_LIMIT: usize = 20;

/// Result cap for ranked substring search.
pub const RANKED_SEARCH_LIMIT: usize = 10;

/// Record key for an item id.
pub fn record_key(id: u32) -> String {
    format!("{}{}", RECORD_KEY_PREFIX, id)
}

/// A catalog entry mirrored from the upstream API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Upstream id (always > 0).
    pub id: u32,
    /// Lowercase name token, e.g. "bulbasaur".
    pub name: String,
    /// Upstream detail URL.
    pub url: String,
    /// Official artwork URL, only set when details were fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CatalogItem {
    pub fn new(id: u32, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            url: url.into(),
            image: None,
        }
    }
}

/// An index member and search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogMatch {
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl From<&CatalogItem> for CatalogMatch {
    fn from(item: &CatalogItem) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            image: item.image.clone(),
        }
    }
}

/// Errors for cache store operations.
///
/// "Not found" is never an error; lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache read failed: {0}")]
    Read(String),

    #[error("Cache write failed: {0}")]
    Write(String),

    #[error("Cache data is corrupt: {0}")]
    Corrupt(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_key() {
        assert_eq!(record_key(7), "catalog:7");
        assert!(INDEX_KEY.starts_with(RECORD_KEY_PREFIX));
    }

    #[test]
    fn test_item_without_image_omits_field() {
        let item = CatalogItem::new(7, "squirtle", "https://pokeapi.co/api/v2/pokemon/7/");
        let json = serde_json::to_string(&item).unwrap();
        assert!(!json.contains("image"));

        let parsed: CatalogItem = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, item);
    }

    #[test]
    fn test_match_from_item_keeps_image() {
        let mut item = CatalogItem::new(25, "pikachu", "https://pokeapi.co/api/v2/pokemon/25/");
        item.image = Some("https://img.test/25.png".to_string());

        let hit = CatalogMatch::from(&item);
        assert_eq!(hit.id, 25);
        assert_eq!(hit.name, "pikachu");
        assert_eq!(hit.image.as_deref(), Some("https://img.test/25.png"));
    }

    #[test]
    fn test_index_member_format() {
        let hit = CatalogMatch {
            id: 1,
            name: "bulbasaur".to_string(),
            image: None,
        };
        assert_eq!(
            serde_json::to_string(&hit).unwrap(),
            r#"{"id":1,"name":"bulbasaur"}"#
        );
    }
}
