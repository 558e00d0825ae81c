//! Auto-series presentation overrides

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::{action_error, ApiError};
use crate::models::SeriesOverrideRequest;
use crate::AppState;

/// PUT /api/series/:base_name/override - Set display name, description or thumbnail
pub async fn set_override(
    State(state): State<Arc<AppState>>,
    Path(base_name): Path<String>,
    Json(payload): Json<SeriesOverrideRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let series = state
        .library
        .set_series_override(&base_name, payload)
        .await
        .map_err(action_error)?;
    Ok(Json(series))
}

/// DELETE /api/series/:base_name/override - Revert to the derived defaults
pub async fn delete_override(
    State(state): State<Arc<AppState>>,
    Path(base_name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .library
        .delete_series_override(&base_name)
        .await
        .map_err(action_error)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "deleted": base_name
    })))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::services::testing::{test_library, video};
    use crate::test_app;

    async fn call(app: &axum::Router, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_override_rename_and_revert() {
        let harness = test_library(vec![
            video("1", "Night Shift EP01"),
            video("2", "Night Shift EP02"),
        ])
        .await;
        let app = test_app(harness.library);

        let (status, series) = call(
            &app,
            Method::PUT,
            "/api/series/Night%20Shift/override",
            json!({ "name": "Night Shift (Complete)", "description": "All episodes" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(series["name"], "Night Shift (Complete)");
        assert_eq!(series["key"], "Night Shift");

        let (status, _) = call(&app, Method::DELETE, "/api/series/Night%20Shift/override", Value::Null).await;
        assert_eq!(status, StatusCode::OK);

        let request = Request::builder()
            .uri("/api/collections/series/Night%20Shift")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let series: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(series["name"], "Night Shift");
    }

    #[tokio::test]
    async fn test_override_unknown_series_is_not_found() {
        let harness = test_library(vec![video("1", "Solo")]).await;
        let app = test_app(harness.library);

        let (status, _) = call(&app, Method::PUT, "/api/series/Solo/override", json!({ "name": "x" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
