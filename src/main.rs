mod config;
mod models;
mod routes;
mod services;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, StoreBackend};
use crate::services::{
    catalog::CatalogSource,
    library::Library,
    persistence::CollectionRepository,
    store::{DocumentStore, MemoryDocumentStore, RedisDocumentStore},
    uploader::ImgbbUploader,
};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub library: Library,
    pub start_time: Instant,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "series_shelf_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env();
    let port = config.port;

    tracing::info!("Starting SeriesShelf Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.node_env);

    // Document store
    let store: Arc<dyn DocumentStore> = match config.store_backend {
        StoreBackend::Redis => {
            let store = RedisDocumentStore::new(&config.redis_url, &config.store_key_prefix).await?;
            tracing::info!("Redis connected: {}", config.redis_url);
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory document store, edits are lost on restart");
            Arc::new(MemoryDocumentStore::new())
        }
    };
    let repository = CollectionRepository::new(store, config.user_doc_id.clone());

    // External collaborators
    let uploader = ImgbbUploader::new(
        &config.image_upload_url,
        config.image_upload_api_key.clone(),
        config.upload_timeout_ms,
        &config.user_agent,
    )?;
    if config.image_upload_api_key.is_none() {
        tracing::warn!("IMAGE_UPLOAD_API_KEY not set, thumbnail uploads will be rejected");
    }
    let catalog_source = CatalogSource::new(&config.catalog_url, &config.user_agent)?;

    // Catalog and both maps are read once here and held in memory
    let library = Library::new(
        repository,
        Arc::new(uploader),
        catalog_source,
        config.max_thumbnail_bytes(),
    );
    library.load().await;

    // Build application state
    let state = Arc::new(AppState {
        config,
        library,
        start_time: Instant::now(),
    });

    let app = router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the HTTP router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health endpoints
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .route("/ready", get(routes::health::ready))
        .route("/live", get(routes::health::live))
        // Collections (merged view + custom collection CRUD)
        .route(
            "/api/collections",
            get(routes::collections::list_collections).post(routes::collections::create_collection),
        )
        .route(
            "/api/collections/series/:base_name",
            get(routes::collections::get_series),
        )
        .route(
            "/api/collections/custom/:id",
            get(routes::collections::get_custom)
                .put(routes::collections::update_collection)
                .delete(routes::collections::delete_collection),
        )
        // Membership editor
        .route(
            "/api/collections/custom/:id/candidates",
            get(routes::collections::get_candidates),
        )
        .route(
            "/api/collections/custom/:id/members",
            put(routes::collections::set_members),
        )
        .route(
            "/api/collections/custom/:id/members/toggle",
            post(routes::collections::toggle_member),
        )
        // Auto-series overrides
        .route(
            "/api/series/:base_name/override",
            put(routes::series::set_override).delete(routes::series::delete_override),
        )
        // Unsynced edits
        .route(
            "/api/sync",
            get(routes::sync::get_sync_status).post(routes::sync::retry_sync),
        )
        // Catalog
        .route("/api/catalog", get(routes::catalog::list_catalog))
        .route("/api/catalog/reload", post(routes::catalog::reload_catalog))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Router over a prepared library, for handler tests
#[cfg(test)]
pub fn test_app(library: Library) -> Router {
    let state = Arc::new(AppState {
        config: Config::from_env(),
        library,
        start_time: Instant::now(),
    });
    router(state)
}
