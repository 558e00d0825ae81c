//! Collection API endpoints
//!
//! Lists the merged view of auto series and custom collections, and
//! provides create/edit/delete plus the membership editor for custom
//! collections.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::{action_error, ApiError};
use crate::models::{
    CollectionKind, CollectionsResponse, CreateCollectionRequest, SearchQuery, SetMembersRequest,
    ToggleMemberRequest, UpdateCollectionRequest,
};
use crate::AppState;

/// GET /api/collections?q= - Merged, sorted, name-filtered collections
pub async fn list_collections(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let collections = state
        .library
        .list(query.q.as_deref().unwrap_or_default())
        .await;
    let total = collections.len();

    Json(CollectionsResponse { collections, total })
}

/// GET /api/collections/series/:base_name - One auto series
pub async fn get_series(
    State(state): State<Arc<AppState>>,
    Path(base_name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let series = state
        .library
        .get(CollectionKind::Series, &base_name)
        .await
        .map_err(action_error)?;
    Ok(Json(series))
}

/// GET /api/collections/custom/:id - One custom collection
pub async fn get_custom(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let collection = state
        .library
        .get(CollectionKind::Custom, &id)
        .await
        .map_err(action_error)?;
    Ok(Json(collection))
}

/// POST /api/collections - Create a custom collection
pub async fn create_collection(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateCollectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let collection = state
        .library
        .create_collection(payload)
        .await
        .map_err(action_error)?;

    tracing::info!("Created collection {} '{}'", collection.key, collection.name);

    Ok((StatusCode::CREATED, Json(collection)))
}

/// PUT /api/collections/custom/:id - Edit name, description or thumbnail
pub async fn update_collection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCollectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let collection = state
        .library
        .update_collection(&id, payload)
        .await
        .map_err(action_error)?;
    Ok(Json(collection))
}

/// DELETE /api/collections/custom/:id - Delete a custom collection
pub async fn delete_collection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .library
        .delete_collection(&id)
        .await
        .map_err(action_error)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "deleted": id
    })))
}

/// GET /api/collections/custom/:id/candidates?q= - Membership editor listing
pub async fn get_candidates(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state
        .library
        .membership_candidates(&id, query.q.as_deref().unwrap_or_default())
        .await
        .map_err(action_error)?;
    Ok(Json(response))
}

/// PUT /api/collections/custom/:id/members - Save the finalized member order
pub async fn set_members(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<SetMembersRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let collection = state
        .library
        .set_members(&id, &payload.video_ids)
        .await
        .map_err(action_error)?;
    Ok(Json(collection))
}

/// POST /api/collections/custom/:id/members/toggle - Add or remove one video
pub async fn toggle_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<ToggleMemberRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.video_id.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "videoId is required" })),
        ));
    }

    let collection = state
        .library
        .toggle_member(&id, &payload.video_id)
        .await
        .map_err(action_error)?;
    Ok(Json(collection))
}
