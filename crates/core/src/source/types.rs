//! Types shared by catalog sources.

use serde::{Deserialize, Serialize};

/// Detail record of a single item, reduced to what the cache keeps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItemDetail {
    pub id: u32,
    pub name: String,
    /// Official artwork, falling back to the default sprite.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Extract the item id from the trailing path segment of its URL.
///
/// `https://pokeapi.co/api/v2/pokemon/25/` -> `Some(25)`. Non-numeric and
/// zero ids yield `None`.
pub fn item_id_from_url(url: &str) -> Option<u32> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()?
        .parse::<u32>()
        .ok()
        .filter(|id| *id > 0)
}
