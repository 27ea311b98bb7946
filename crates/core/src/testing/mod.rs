//! Testing utilities and a mock upstream source.
//!
//! Lets the service and the HTTP layer be exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use dexcache_core::testing::{fixtures, MockCatalogSource};
//!
//! let source = MockCatalogSource::with_items(fixtures::starter_items());
//! source.fail_detail_for(4).await;
//! ```

mod mock_source;

pub use mock_source::MockCatalogSource;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::CatalogItem;

    /// URL of an item as the upstream listing reports it.
    pub fn item_url(id: u32) -> String {
        format!("https://pokeapi.co/api/v2/pokemon/{}/", id)
    }

    /// Artwork URL the mock source reports for an item.
    pub fn artwork_url(id: u32) -> String {
        format!("https://img.test/artwork/{}.png", id)
    }

    /// A listing entry with no image.
    pub fn item(id: u32, name: &str) -> CatalogItem {
        CatalogItem::new(id, name, item_url(id))
    }

    /// The first four entries of the real catalog.
    pub fn starter_items() -> Vec<CatalogItem> {
        vec![
            item(1, "bulbasaur"),
            item(2, "ivysaur"),
            item(3, "venusaur"),
            item(4, "charmander"),
        ]
    }

    /// `count` entries named `mon-{id}`, ids starting at 1.
    pub fn numbered_items(count: u32) -> Vec<CatalogItem> {
        (1..=count).map(|id| item(id, &format!("mon-{}", id))).collect()
    }
}
