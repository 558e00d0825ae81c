//! In-memory collection state and user actions
//!
//! The override and custom-collection maps are read once at startup and then
//! held here. Every mutation is applied locally first and then written back as
//! a full document. A failed write leaves the local change in place and marks
//! the touched key unsynced until a later write of the same map succeeds.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::models::{
    CandidatesResponse, CollectionKind, CollectionMap, CreateCollectionRequest, CustomCollection,
    DisplaySeries, OverrideMap, SeriesOverride, SeriesOverrideRequest, SyncStatus,
    ThumbnailUpload, UpdateCollectionRequest, Video,
};
use crate::services::catalog::{CatalogError, CatalogSource};
use crate::services::membership;
use crate::services::merger::{filter_by_name, index_catalog, merge_collections, resolve_collection};
use crate::services::metrics;
use crate::services::persistence::CollectionRepository;
use crate::services::series_builder::build_auto_series;
use crate::services::store::StoreError;
use crate::services::uploader::{decode_thumbnail, thumbnail_file_name, ImageHost, UploadError};

/// Failure of a user-triggered action
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("{0}")]
    Validation(String),
    #[error("{kind} '{key}' not found")]
    NotFound { kind: CollectionKind, key: String },
    #[error("thumbnail upload failed: {0}")]
    Upload(#[from] UploadError),
    #[error("changes kept locally but could not be saved: {0}")]
    Persist(#[from] StoreError),
    #[error("catalog reload failed: {0}")]
    Catalog(#[from] CatalogError),
}

impl ActionError {
    fn not_found(kind: CollectionKind, key: &str) -> Self {
        ActionError::NotFound {
            kind,
            key: key.to_string(),
        }
    }
}

/// Which persisted map a write covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MapKind {
    Overrides,
    Collections,
}

#[derive(Debug, Default)]
struct LibraryState {
    catalog: Vec<Video>,
    overrides: OverrideMap,
    collections: CollectionMap,
    unsynced_overrides: BTreeSet<String>,
    unsynced_collections: BTreeSet<String>,
    last_error: Option<String>,
    last_attempt_at: Option<DateTime<Utc>>,
}

impl LibraryState {
    fn unsynced_mut(&mut self, kind: MapKind) -> &mut BTreeSet<String> {
        match kind {
            MapKind::Overrides => &mut self.unsynced_overrides,
            MapKind::Collections => &mut self.unsynced_collections,
        }
    }

    fn is_unsynced(&self, series: &DisplaySeries) -> bool {
        match series.kind {
            CollectionKind::Series => self.unsynced_overrides.contains(&series.key),
            CollectionKind::Custom => self.unsynced_collections.contains(&series.key),
        }
    }

    /// Merged, sorted, unfiltered view
    fn display_list(&self) -> Vec<DisplaySeries> {
        let auto = build_auto_series(&self.catalog, &self.overrides);
        let mut merged = merge_collections(auto, &self.collections, &self.catalog);
        for series in merged.iter_mut() {
            series.unsynced = self.is_unsynced(series);
        }
        merged
    }

    fn auto_series_exists(&self, base_name: &str) -> bool {
        build_auto_series(&self.catalog, &self.overrides)
            .iter()
            .any(|s| s.key == base_name)
    }

    fn display_custom(&self, id: &str) -> Option<DisplaySeries> {
        let collection = self.collections.get(id)?;
        let mut series = resolve_collection(id, collection, &index_catalog(&self.catalog));
        series.unsynced = self.unsynced_collections.contains(id);
        Some(series)
    }

    fn sync_status(&self) -> SyncStatus {
        SyncStatus {
            unsynced_overrides: self.unsynced_overrides.iter().cloned().collect(),
            unsynced_collections: self.unsynced_collections.iter().cloned().collect(),
            last_error: self.last_error.clone(),
            last_attempt_at: self.last_attempt_at,
        }
    }
}

/// Collection state plus its collaborators
pub struct Library {
    state: RwLock<LibraryState>,
    repository: CollectionRepository,
    uploader: Arc<dyn ImageHost>,
    catalog_source: CatalogSource,
    max_thumbnail_bytes: usize,
}

impl Library {
    pub fn new(
        repository: CollectionRepository,
        uploader: Arc<dyn ImageHost>,
        catalog_source: CatalogSource,
        max_thumbnail_bytes: usize,
    ) -> Self {
        Self {
            state: RwLock::new(LibraryState::default()),
            repository,
            uploader,
            catalog_source,
            max_thumbnail_bytes,
        }
    }

    pub fn repository(&self) -> &CollectionRepository {
        &self.repository
    }

    /// Initial load of catalog and both maps. Failures leave the affected
    /// part empty so the service still serves whatever it could read.
    pub async fn load(&self) {
        let catalog = match self.catalog_source.load().await {
            Ok(videos) => {
                metrics::CATALOG_RELOADS.with_label_values(&["success"]).inc();
                videos
            }
            Err(e) => {
                metrics::CATALOG_RELOADS.with_label_values(&["failure"]).inc();
                warn!("Catalog unavailable ({}), starting empty: {}", self.catalog_source.location(), e);
                Vec::new()
            }
        };

        let overrides = self.repository.load_overrides().await.unwrap_or_else(|e| {
            warn!("Failed to load series overrides, using none: {}", e);
            OverrideMap::new()
        });

        let collections = self
            .repository
            .load_custom_collections()
            .await
            .unwrap_or_else(|e| {
                warn!("Failed to load custom collections, using none: {}", e);
                CollectionMap::new()
            });

        info!(
            "Library loaded: {} videos, {} overrides, {} custom collections",
            catalog.len(),
            overrides.len(),
            collections.len()
        );

        let mut state = self.state.write().await;
        state.catalog = catalog;
        state.overrides = overrides;
        state.collections = collections;
    }

    /// Replace the catalog snapshot
    pub async fn replace_catalog(&self, videos: Vec<Video>) {
        let mut state = self.state.write().await;
        state.catalog = videos;
    }

    pub async fn reload_catalog(&self) -> Result<usize, ActionError> {
        let videos = match self.catalog_source.load().await {
            Ok(videos) => {
                metrics::CATALOG_RELOADS.with_label_values(&["success"]).inc();
                videos
            }
            Err(e) => {
                metrics::CATALOG_RELOADS.with_label_values(&["failure"]).inc();
                error!("Catalog reload failed: {}", e);
                return Err(e.into());
            }
        };
        let count = videos.len();
        self.replace_catalog(videos).await;
        Ok(count)
    }

    pub async fn catalog_len(&self) -> usize {
        self.state.read().await.catalog.len()
    }

    /// Catalog listing, filtered on title or description
    pub async fn catalog(&self, query: &str, include_shorts: bool) -> Vec<Video> {
        let state = self.state.read().await;
        state
            .catalog
            .iter()
            .filter(|v| include_shorts || !v.is_short)
            .filter(|v| v.matches_query(query))
            .cloned()
            .collect()
    }

    // ============ Views ============

    /// Merged auto series and custom collections, filtered by display name
    pub async fn list(&self, query: &str) -> Vec<DisplaySeries> {
        let state = self.state.read().await;
        filter_by_name(state.display_list(), query)
    }

    /// One expanded entry
    pub async fn get(&self, kind: CollectionKind, key: &str) -> Result<DisplaySeries, ActionError> {
        let state = self.state.read().await;
        let found = match kind {
            CollectionKind::Custom => state.display_custom(key),
            CollectionKind::Series => state
                .display_list()
                .into_iter()
                .find(|s| s.kind == CollectionKind::Series && s.key == key),
        };
        found.ok_or_else(|| ActionError::not_found(kind, key))
    }

    // ============ Custom collections ============

    pub async fn create_collection(
        &self,
        request: CreateCollectionRequest,
    ) -> Result<DisplaySeries, ActionError> {
        let name = required_name(&request.name)?;
        let thumbnail_url = self.upload_thumbnail(request.thumbnail.as_ref()).await?;

        let id = uuid::Uuid::new_v4().to_string();
        let mut state = self.state.write().await;
        let collection = CustomCollection {
            name,
            videos: membership::finalize(&request.video_ids, &state.catalog),
            custom_thumbnail_url: thumbnail_url,
            description: request.description.as_deref().and_then(clean_text),
        };
        info!(
            "Creating custom collection {} '{}' with {} videos",
            id,
            collection.name,
            collection.videos.len()
        );
        state.collections.insert(id.clone(), collection);

        self.persist(&mut state, MapKind::Collections, Some(&id)).await?;
        state
            .display_custom(&id)
            .ok_or_else(|| ActionError::not_found(CollectionKind::Custom, &id))
    }

    pub async fn update_collection(
        &self,
        id: &str,
        request: UpdateCollectionRequest,
    ) -> Result<DisplaySeries, ActionError> {
        let name = request.name.as_deref().map(required_name).transpose()?;
        if !self.state.read().await.collections.contains_key(id) {
            return Err(ActionError::not_found(CollectionKind::Custom, id));
        }
        let thumbnail_url = self.upload_thumbnail(request.thumbnail.as_ref()).await?;

        let mut state = self.state.write().await;
        let collection = state
            .collections
            .get_mut(id)
            .ok_or_else(|| ActionError::not_found(CollectionKind::Custom, id))?;
        if let Some(name) = name {
            collection.name = name;
        }
        if let Some(description) = request.description.as_deref() {
            collection.description = clean_text(description);
        }
        if thumbnail_url.is_some() {
            collection.custom_thumbnail_url = thumbnail_url;
        }

        self.persist(&mut state, MapKind::Collections, Some(id)).await?;
        state
            .display_custom(id)
            .ok_or_else(|| ActionError::not_found(CollectionKind::Custom, id))
    }

    pub async fn delete_collection(&self, id: &str) -> Result<(), ActionError> {
        let mut state = self.state.write().await;
        let removed = state
            .collections
            .remove(id)
            .ok_or_else(|| ActionError::not_found(CollectionKind::Custom, id))?;
        info!("Deleted custom collection {} '{}'", id, removed.name);
        self.persist(&mut state, MapKind::Collections, Some(id)).await
    }

    // ============ Membership editor ============

    pub async fn membership_candidates(
        &self,
        id: &str,
        query: &str,
    ) -> Result<CandidatesResponse, ActionError> {
        let state = self.state.read().await;
        let collection = state
            .collections
            .get(id)
            .ok_or_else(|| ActionError::not_found(CollectionKind::Custom, id))?;
        let selected = collection.member_ids();
        let candidates = membership::candidates(&state.catalog, &selected, query);
        let total = candidates.len();
        Ok(CandidatesResponse {
            candidates,
            selected,
            total,
        })
    }

    /// Toggle one video and persist the resulting membership
    pub async fn toggle_member(&self, id: &str, video_id: &str) -> Result<DisplaySeries, ActionError> {
        let mut state = self.state.write().await;
        let mut ids = state
            .collections
            .get(id)
            .map(CustomCollection::member_ids)
            .ok_or_else(|| ActionError::not_found(CollectionKind::Custom, id))?;

        let is_member = ids.iter().any(|m| m == video_id);
        if !is_member {
            match state.catalog.iter().find(|v| v.id == video_id) {
                None => {
                    return Err(ActionError::Validation(format!(
                        "video '{}' is not in the catalog",
                        video_id
                    )))
                }
                Some(v) if v.is_short => {
                    return Err(ActionError::Validation(
                        "short-form videos cannot be added to collections".to_string(),
                    ))
                }
                Some(_) => {}
            }
        }
        membership::toggle(&mut ids, video_id);

        self.store_members(&mut state, id, &ids).await
    }

    /// Save the editor's finalized, ordered membership
    pub async fn set_members(&self, id: &str, video_ids: &[String]) -> Result<DisplaySeries, ActionError> {
        let mut state = self.state.write().await;
        if !state.collections.contains_key(id) {
            return Err(ActionError::not_found(CollectionKind::Custom, id));
        }
        self.store_members(&mut state, id, video_ids).await
    }

    async fn store_members(
        &self,
        state: &mut LibraryState,
        id: &str,
        video_ids: &[String],
    ) -> Result<DisplaySeries, ActionError> {
        let videos = membership::finalize(video_ids, &state.catalog);
        let collection = state
            .collections
            .get_mut(id)
            .ok_or_else(|| ActionError::not_found(CollectionKind::Custom, id))?;
        collection.videos = videos;
        info!("Collection {} now has {} videos", id, collection.videos.len());

        self.persist(state, MapKind::Collections, Some(id)).await?;
        state
            .display_custom(id)
            .ok_or_else(|| ActionError::not_found(CollectionKind::Custom, id))
    }

    // ============ Series overrides ============

    pub async fn set_series_override(
        &self,
        base_name: &str,
        request: SeriesOverrideRequest,
    ) -> Result<DisplaySeries, ActionError> {
        if !self.state.read().await.auto_series_exists(base_name) {
            return Err(ActionError::not_found(CollectionKind::Series, base_name));
        }
        let thumbnail_url = self.upload_thumbnail(request.thumbnail.as_ref()).await?;

        let mut state = self.state.write().await;
        let entry = state
            .overrides
            .entry(base_name.to_string())
            .or_insert_with(|| SeriesOverride {
                name: base_name.to_string(),
                custom_thumbnail_url: None,
                description: None,
            });
        if let Some(name) = request.name.as_deref() {
            entry.name = clean_text(name).unwrap_or_else(|| base_name.to_string());
        }
        if let Some(description) = request.description.as_deref() {
            entry.description = clean_text(description);
        }
        if thumbnail_url.is_some() {
            entry.custom_thumbnail_url = thumbnail_url;
        }
        info!("Updated override for series '{}' -> '{}'", base_name, entry.name);

        self.persist(&mut state, MapKind::Overrides, Some(base_name)).await?;
        state
            .display_list()
            .into_iter()
            .find(|s| s.kind == CollectionKind::Series && s.key == base_name)
            .ok_or_else(|| ActionError::not_found(CollectionKind::Series, base_name))
    }

    pub async fn delete_series_override(&self, base_name: &str) -> Result<(), ActionError> {
        let mut state = self.state.write().await;
        if state.overrides.remove(base_name).is_none() {
            return Err(ActionError::not_found(CollectionKind::Series, base_name));
        }
        info!("Removed override for series '{}'", base_name);
        self.persist(&mut state, MapKind::Overrides, Some(base_name)).await
    }

    // ============ Sync ============

    pub async fn sync_status(&self) -> SyncStatus {
        self.state.read().await.sync_status()
    }

    /// Retry the write of every map holding unsynced edits
    pub async fn sync(&self) -> Result<SyncStatus, ActionError> {
        let mut state = self.state.write().await;
        let mut failure = None;

        for kind in [MapKind::Overrides, MapKind::Collections] {
            if state.unsynced_mut(kind).is_empty() {
                continue;
            }
            if let Err(e) = self.persist(&mut state, kind, None).await {
                failure = Some(e);
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(state.sync_status()),
        }
    }

    /// Full-document write of one map
    async fn persist(
        &self,
        state: &mut LibraryState,
        kind: MapKind,
        touched: Option<&str>,
    ) -> Result<(), ActionError> {
        state.last_attempt_at = Some(Utc::now());
        metrics::STORE_WRITES.inc();

        let result = match kind {
            MapKind::Overrides => self.repository.save_overrides(&state.overrides).await,
            MapKind::Collections => {
                self.repository
                    .save_custom_collections(&state.collections)
                    .await
            }
        };

        match result {
            Ok(()) => {
                // The write covered the whole map, earlier failures included
                state.unsynced_mut(kind).clear();
                if state.unsynced_overrides.is_empty() && state.unsynced_collections.is_empty() {
                    state.last_error = None;
                }
                Ok(())
            }
            Err(e) => {
                metrics::STORE_WRITE_FAILURES.inc();
                error!("Failed to persist {:?}, keeping local changes: {}", kind, e);
                if let Some(key) = touched {
                    state.unsynced_mut(kind).insert(key.to_string());
                }
                state.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    async fn upload_thumbnail(
        &self,
        thumbnail: Option<&ThumbnailUpload>,
    ) -> Result<Option<String>, ActionError> {
        let Some(upload) = thumbnail else {
            return Ok(None);
        };

        let result = match decode_thumbnail(upload, self.max_thumbnail_bytes) {
            Ok(bytes) => self.uploader.upload(bytes, &thumbnail_file_name(upload)).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(url) => {
                metrics::THUMBNAIL_UPLOADS.with_label_values(&["success"]).inc();
                info!("Thumbnail uploaded: {}", url);
                Ok(Some(url))
            }
            Err(e) => {
                metrics::THUMBNAIL_UPLOADS.with_label_values(&["failure"]).inc();
                warn!("Thumbnail upload failed: {}", e);
                Err(e.into())
            }
        }
    }
}

fn required_name(name: &str) -> Result<String, ActionError> {
    clean_text(name).ok_or_else(|| ActionError::Validation("name is required".to_string()))
}

/// Trimmed text, `None` when blank
fn clean_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
