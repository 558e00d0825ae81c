use std::env;

/// Which document store backs the persisted maps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    Memory,
}

impl StoreBackend {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => StoreBackend::Memory,
            _ => StoreBackend::Redis,
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,
    pub node_env: String,

    // Document store
    pub store_backend: StoreBackend,
    pub redis_url: String,
    pub store_key_prefix: String,
    pub user_doc_id: String,

    // Catalog
    pub catalog_url: String,

    // Image host
    pub image_upload_url: String,
    pub image_upload_api_key: Option<String>,
    pub upload_timeout_ms: u64,
    pub max_thumbnail_mb: usize,

    // Misc
    pub user_agent: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            // Server
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .unwrap_or(3001),
            node_env: env::var("NODE_ENV").unwrap_or_else(|_| "development".to_string()),

            // Document store
            store_backend: StoreBackend::parse(
                &env::var("STORE_BACKEND").unwrap_or_else(|_| "redis".to_string()),
            ),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            store_key_prefix: env::var("STORE_KEY_PREFIX")
                .unwrap_or_else(|_| "shelf:".to_string()),
            // Single-user deployment: every map lives under this one document id
            user_doc_id: env::var("USER_DOC_ID").unwrap_or_else(|_| "default".to_string()),

            // Catalog
            catalog_url: env::var("CATALOG_URL").unwrap_or_else(|_| "catalog.json".to_string()),

            // Image host
            image_upload_url: env::var("IMAGE_UPLOAD_URL")
                .unwrap_or_else(|_| "https://api.imgbb.com/1/upload".to_string()),
            image_upload_api_key: env::var("IMAGE_UPLOAD_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            upload_timeout_ms: env::var("UPLOAD_TIMEOUT_MS")
                .unwrap_or_else(|_| "30000".to_string())
                .parse()
                .unwrap_or(30_000), // 30 seconds
            max_thumbnail_mb: env::var("MAX_THUMBNAIL_MB")
                .unwrap_or_else(|_| "8".to_string())
                .parse()
                .unwrap_or(8),

            user_agent: env::var("USER_AGENT")
                .unwrap_or_else(|_| format!("SeriesShelf/{}", env!("CARGO_PKG_VERSION"))),
        }
    }

    /// Maximum decoded thumbnail size in bytes
    pub fn max_thumbnail_bytes(&self) -> usize {
        self.max_thumbnail_mb * 1024 * 1024
    }
}
