//! Read-only catalog endpoints

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::{action_error, ApiError};
use crate::models::{CatalogQuery, CatalogResponse};
use crate::AppState;

/// GET /api/catalog?q=&includeShorts= - Catalog videos matching title or description
pub async fn list_catalog(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CatalogQuery>,
) -> impl IntoResponse {
    let videos = state
        .library
        .catalog(query.q.as_deref().unwrap_or_default(), query.include_shorts)
        .await;
    let total = videos.len();

    Json(CatalogResponse { videos, total })
}

/// POST /api/catalog/reload - Re-read the catalog from its source
pub async fn reload_catalog(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let count = state.library.reload_catalog().await.map_err(action_error)?;

    tracing::info!("Catalog reloaded: {} videos", count);

    Ok(Json(serde_json::json!({
        "success": true,
        "videos": count
    })))
}
