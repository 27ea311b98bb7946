//! PokéAPI client.
//!
//! Only two endpoints are used:
//! - `GET {base}/pokemon?limit=N` for the listing
//! - `GET {item url}` for a detail record

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::types::{item_id_from_url, CatalogItemDetail};
use super::{CatalogSource, SourceError};
use crate::catalog::CatalogItem;
use crate::config::SourceConfig;

fn default_user_agent() -> String {
    format!("dexcache/{}", env!("CARGO_PKG_VERSION"))
}

/// PokéAPI client.
pub struct PokeApiClient {
    client: Client,
    base_url: String,
    page_limit: u32,
}

impl PokeApiClient {
    /// Create a new client from the `[source]` configuration.
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let timeout = Duration::from_secs(u64::from(config.timeout_secs));
        let client = Client::builder()
            .user_agent(default_user_agent())
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_limit: config.page_limit,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let response = self.client.get(url).query(query).send().await?;
        let response = check_status(url, response).await?;

        response
            .json()
            .await
            .map_err(|e| SourceError::ParseError(format!("{}: {}", url, e)))
    }
}

async fn check_status(url: &str, response: Response) -> Result<Response, SourceError> {
    let status = response.status();
    if status == 404 {
        return Err(SourceError::NotFound(url.to_string()));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SourceError::ApiError {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(response)
}

#[async_trait]
impl CatalogSource for PokeApiClient {
    async fn fetch_all_items(&self) -> Result<Vec<CatalogItem>, SourceError> {
        let url = format!("{}/pokemon", self.base_url);
        info!("Fetching catalog listing from {} (limit {})", url, self.page_limit);

        let listing: ListingResponse = self
            .get_json(&url, &[("limit", self.page_limit.to_string())])
            .await?;

        if listing.count > listing.results.len() as u64 {
            warn!(
                "Upstream has {} entries but the page holds {}; the rest is not cached",
                listing.count,
                listing.results.len()
            );
        }

        let received = listing.results.len();
        let items = items_from_listing(listing.results);
        info!("Fetched {} entries, {} with a valid id", received, items.len());
        Ok(items)
    }

    async fn fetch_item_detail(&self, url: &str) -> Result<CatalogItemDetail, SourceError> {
        debug!("Fetching item detail {}", url);
        let detail: DetailResponse = self.get_json(url, &[]).await?;
        Ok(detail.into())
    }
}

/// Turn listing entries into items: derive ids, drop invalid ones, sort by id.
fn items_from_listing(results: Vec<ListingEntry>) -> Vec<CatalogItem> {
    let mut items: Vec<CatalogItem> = results
        .into_iter()
        .filter_map(|entry| match item_id_from_url(&entry.url) {
            Some(id) => Some(CatalogItem::new(id, entry.name, entry.url)),
            None => {
                debug!("Skipping entry {:?} without a numeric id", entry.name);
                None
            }
        })
        .collect();

    items.sort_by_key(|item| item.id);
    items
}

// ============================================================================
// PokéAPI Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListingResponse {
    #[serde(default)]
    count: u64,
    #[serde(default)]
    results: Vec<ListingEntry>,
}

#[derive(Debug, Deserialize)]
struct ListingEntry {
    name: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    id: u32,
    name: String,
    #[serde(default)]
    sprites: Sprites,
}

#[derive(Debug, Default, Deserialize)]
struct Sprites {
    #[serde(default)]
    front_default: Option<String>,
    #[serde(default)]
    other: HashMap<String, ArtworkSprites>,
}

#[derive(Debug, Default, Deserialize)]
struct ArtworkSprites {
    #[serde(default)]
    front_default: Option<String>,
}

impl From<DetailResponse> for CatalogItemDetail {
    fn from(detail: DetailResponse) -> Self {
        let artwork = detail
            .sprites
            .other
            .get("official-artwork")
            .and_then(|a| a.front_default.clone());

        CatalogItemDetail {
            id: detail.id,
            name: detail.name,
            image_url: artwork.or(detail.sprites.front_default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_from_listing_sorts_and_filters() {
        let listing: ListingResponse = serde_json::from_str(
            r#"{
                "count": 4,
                "next": null,
                "previous": null,
                "results": [
                    {"name": "ivysaur", "url": "https://pokeapi.co/api/v2/pokemon/2/"},
                    {"name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/"},
                    {"name": "broken", "url": "https://pokeapi.co/api/v2/pokemon/oops/"},
                    {"name": "venusaur", "url": "https://pokeapi.co/api/v2/pokemon/3/"}
                ]
            }"#,
        )
        .unwrap();

        let items = items_from_listing(listing.results);

        let ids: Vec<u32> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(items[0].name, "bulbasaur");
        assert_eq!(items[0].url, "https://pokeapi.co/api/v2/pokemon/1/");
        assert!(items[0].image.is_none());
    }

    #[test]
    fn test_detail_prefers_official_artwork() {
        let detail: DetailResponse = serde_json::from_str(
            r#"{
                "id": 25,
                "name": "pikachu",
                "sprites": {
                    "front_default": "https://img.test/sprites/25.png",
                    "other": {
                        "official-artwork": {"front_default": "https://img.test/artwork/25.png"},
                        "dream_world": {"front_default": null}
                    }
                }
            }"#,
        )
        .unwrap();

        let detail: CatalogItemDetail = detail.into();
        assert_eq!(detail.id, 25);
        assert_eq!(
            detail.image_url.as_deref(),
            Some("https://img.test/artwork/25.png")
        );
    }

    #[test]
    fn test_detail_falls_back_to_default_sprite() {
        let detail: DetailResponse = serde_json::from_str(
            r#"{
                "id": 10001,
                "name": "deoxys-attack",
                "sprites": {
                    "front_default": "https://img.test/sprites/10001.png",
                    "other": {"official-artwork": {"front_default": null}}
                }
            }"#,
        )
        .unwrap();

        let detail: CatalogItemDetail = detail.into();
        assert_eq!(
            detail.image_url.as_deref(),
            Some("https://img.test/sprites/10001.png")
        );
    }

    #[test]
    fn test_detail_without_sprites() {
        let detail: DetailResponse =
            serde_json::from_str(r#"{"id": 1, "name": "bulbasaur"}"#).unwrap();
        let detail: CatalogItemDetail = detail.into();
        assert!(detail.image_url.is_none());
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let config = SourceConfig {
            base_url: "http://localhost:9000/api/v2/".to_string(),
            ..Default::default()
        };
        let client = PokeApiClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9000/api/v2");
    }
}
