//! Catalog API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use dexcache_core::{CatalogItem, CatalogMatch, CatalogStatus, ReloadSummary};

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn internal_error(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /catalog/search?name=<term>
///
/// Search cached names. A missing or blank term returns an empty list.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<CatalogMatch>>, impl IntoResponse> {
    let term = params.name.unwrap_or_default();

    match state.catalog().search(&term).await {
        Ok(hits) => Ok(Json(hits)),
        Err(e) => {
            error!("Search for {:?} failed: {}", term, e);
            Err(internal_error("Failed to search catalog"))
        }
    }
}

/// GET /catalog/reload
///
/// Clear the cache and repopulate it from upstream. Responds once the new
/// data is stored.
pub async fn reload(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReloadSummary>, impl IntoResponse> {
    match state.catalog().reload().await {
        Ok(summary) => Ok(Json(summary)),
        Err(e) => {
            error!("Reload failed: {}", e);
            Err(internal_error("Failed to reload catalog"))
        }
    }
}

/// GET /catalog/status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<CatalogStatus> {
    Json(state.catalog().status().await)
}

/// GET /catalog/{id}
///
/// Get a single cached item.
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Json<CatalogItem>, impl IntoResponse> {
    match state.catalog().get_item(id).await {
        Ok(Some(item)) => Ok(Json(item)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Item not found: {}", id),
            }),
        )),
        Err(e) => {
            error!("Lookup of item {} failed: {}", id, e);
            Err(internal_error("Failed to read catalog"))
        }
    }
}
