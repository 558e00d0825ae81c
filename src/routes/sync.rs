//! Unsynced-edit status and retry

use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use super::{action_error, ApiError};
use crate::AppState;

/// GET /api/sync - Keys whose local edits have not been persisted
pub async fn get_sync_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.library.sync_status().await)
}

/// POST /api/sync - Retry the document writes for unsynced maps
pub async fn retry_sync(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let status = state.library.sync().await.map_err(action_error)?;
    tracing::info!("Sync complete, local and stored maps agree");
    Ok(Json(status))
}
