//! Video catalog loader
//!
//! The catalog is owned elsewhere; this service only reads a JSON array of
//! video records, either over HTTP or from a local file.

use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::models::Video;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Catalog loading errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("network error: {0}")]
    Network(String),
    #[error("catalog server returned HTTP {0}")]
    Http(u16),
    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where the catalog is read from
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogLocation {
    Remote(url::Url),
    File(PathBuf),
}

impl CatalogLocation {
    /// http(s) URLs are fetched, anything else is treated as a path
    pub fn parse(value: &str) -> Self {
        match url::Url::parse(value) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                CatalogLocation::Remote(url)
            }
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(CatalogLocation::File)
                .unwrap_or_else(|_| CatalogLocation::File(PathBuf::from(value))),
            _ => CatalogLocation::File(PathBuf::from(value)),
        }
    }
}

impl std::fmt::Display for CatalogLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogLocation::Remote(url) => write!(f, "{}", url),
            CatalogLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Reads the catalog snapshot
pub struct CatalogSource {
    http: Client,
    location: CatalogLocation,
}

impl CatalogSource {
    pub fn new(location: &str, user_agent: &str) -> Result<Self, CatalogError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(user_agent)
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            http,
            location: CatalogLocation::parse(location),
        })
    }

    pub fn location(&self) -> &CatalogLocation {
        &self.location
    }

    pub async fn load(&self) -> Result<Vec<Video>, CatalogError> {
        let body = match &self.location {
            CatalogLocation::Remote(url) => {
                let response = self
                    .http
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|e| CatalogError::Network(e.to_string()))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(CatalogError::Http(status.as_u16()));
                }
                response
                    .text()
                    .await
                    .map_err(|e| CatalogError::Network(e.to_string()))?
            }
            CatalogLocation::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| CatalogError::Io {
                        path: path.display().to_string(),
                        source,
                    })?
            }
        };

        let videos: Vec<Video> = serde_json::from_str(&body)?;
        info!("Loaded {} catalog videos from {}", videos.len(), self.location);
        Ok(videos)
    }
}
