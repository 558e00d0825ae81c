use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

/// Root endpoint - basic status
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "SeriesShelf Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "runtime": "rust"
    }))
}

/// Document store status
#[derive(Serialize)]
struct StoreStats {
    backend: &'static str,
    reachable: bool,
}

/// Health check response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: String,
    environment: String,
    uptime: u64,
    store: StoreStats,
    catalog_videos: usize,
    unsynced_overrides: usize,
    unsynced_collections: usize,
}

/// GET /health - Store reachability, catalog size and pending writes
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = state.start_time.elapsed().as_secs();

    let store = state.library.repository().store();
    let store_ok = store.ping().await;
    let catalog_videos = state.library.catalog_len().await;
    let sync = state.library.sync_status().await;

    // Unsynced edits or an empty catalog still serve requests
    let status = if store_ok && sync.is_clean() && catalog_videos > 0 {
        "ok"
    } else if store_ok {
        "degraded"
    } else {
        "unhealthy"
    };

    Json(HealthResponse {
        status: status.to_string(),
        environment: state.config.node_env.clone(),
        uptime,
        store: StoreStats {
            backend: store.backend_name(),
            reachable: store_ok,
        },
        catalog_videos,
        unsynced_overrides: sync.unsynced_overrides.len(),
        unsynced_collections: sync.unsynced_collections.len(),
    })
}

/// GET /metrics - Prometheus metrics
pub async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                b"Internal Server Error".to_vec(),
            )
        }
    }
}

/// Readiness probe (for Kubernetes)
pub async fn ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.library.repository().store().ping().await {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready - document store unavailable")
    }
}

/// Liveness probe (for Kubernetes)
pub async fn live() -> impl IntoResponse {
    (StatusCode::OK, "alive")
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::services::testing::{test_library, video};
    use crate::test_app;

    #[tokio::test]
    async fn test_health_reports_store_and_catalog() {
        let harness = test_library(vec![video("1", "Show EP01")]).await;
        let store = harness.store.clone();
        let app = test_app(harness.library);

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["catalogVideos"], 1);
        assert_eq!(body["store"]["reachable"], true);

        store.set_failing(true);
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
