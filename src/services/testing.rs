//! Test doubles for the external collaborators

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::models::{ThumbnailUpload, Video};
use crate::services::catalog::CatalogSource;
use crate::services::library::Library;
use crate::services::persistence::CollectionRepository;
use crate::services::store::{DocumentStore, MemoryDocumentStore, StoreError};
use crate::services::uploader::{ImageHost, UploadError};

const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

/// In-memory store whose writes can be made to fail
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryDocumentStore,
    failing: AtomicBool,
}

impl FlakyStore {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get(&self, collection: &str, doc_id: &str) -> Result<Option<Value>, StoreError> {
        self.inner.get(collection, doc_id).await
    }

    async fn set(&self, collection: &str, doc_id: &str, data: &Value) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated outage".to_string()));
        }
        self.inner.set(collection, doc_id, data).await
    }

    async fn ping(&self) -> bool {
        !self.failing.load(Ordering::SeqCst)
    }

    fn backend_name(&self) -> &'static str {
        "flaky-memory"
    }
}

/// Image host returning predictable URLs
#[derive(Default)]
pub struct StubHost {
    failing: AtomicBool,
    uploads: AtomicUsize,
}

impl StubHost {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageHost for StubHost {
    async fn upload(&self, _image: Vec<u8>, file_name: &str) -> Result<String, UploadError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(UploadError::Http(500));
        }
        let n = self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://img.example/{}/{}", n, file_name))
    }
}

pub struct TestHarness {
    pub library: Library,
    pub store: Arc<FlakyStore>,
    pub host: Arc<StubHost>,
}

impl TestHarness {
    /// Fresh library over the same store, as after a restart
    pub async fn reopen(&self) -> Library {
        let library = new_library(self.store.clone(), self.host.clone());
        library.load().await;
        library
    }
}

fn new_library(store: Arc<FlakyStore>, host: Arc<StubHost>) -> Library {
    let repository = CollectionRepository::new(store, "test-user");
    // Nothing lives at this path, so load() starts with an empty catalog
    let source = CatalogSource::new("/nonexistent/series-shelf/catalog.json", "test")
        .expect("http client");
    Library::new(repository, host, source, 1024 * 1024)
}

pub async fn test_library(videos: Vec<Video>) -> TestHarness {
    let store = Arc::new(FlakyStore::default());
    let host = Arc::new(StubHost::default());
    let library = new_library(store.clone(), host.clone());
    library.load().await;
    library.replace_catalog(videos).await;
    TestHarness {
        library,
        store,
        host,
    }
}

pub fn video(id: &str, title: &str) -> Video {
    Video {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        is_short: false,
        custom_thumbnail_url: None,
        views: 0,
    }
}

pub fn png_thumbnail() -> ThumbnailUpload {
    ThumbnailUpload {
        data: STANDARD.encode(PNG_HEADER),
        file_name: Some("cover.png".to_string()),
    }
}
