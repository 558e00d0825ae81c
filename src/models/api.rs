use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::{Video, VideoSummary};
use super::collection::DisplaySeries;

/// Image payload carried inside JSON requests
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailUpload {
    /// Base64 image bytes, optionally as a `data:` URL
    pub data: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

/// Request to create a custom collection
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollectionRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub video_ids: Vec<String>,
    #[serde(default)]
    pub thumbnail: Option<ThumbnailUpload>,
}

/// Request to edit a custom collection (absent fields stay unchanged)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCollectionRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<ThumbnailUpload>,
}

/// Request to edit the presentation of an auto series
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesOverrideRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<ThumbnailUpload>,
}

/// Finalized membership from the editor
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetMembersRequest {
    pub video_ids: Vec<String>,
}

/// Single membership toggle
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleMemberRequest {
    pub video_id: String,
}

/// Search query for collection and editor listings
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

/// Query parameters for the catalog listing
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub include_shorts: bool,
}

/// Collections list response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionsResponse {
    pub collections: Vec<DisplaySeries>,
    pub total: usize,
}

/// One row of the membership editor
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipCandidate {
    #[serde(flatten)]
    pub video: VideoSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub selected: bool,
}

/// Membership editor response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatesResponse {
    pub candidates: Vec<MembershipCandidate>,
    /// Persisted member ids, stale ones included
    pub selected: Vec<String>,
    pub total: usize,
}

/// Catalog listing response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub videos: Vec<Video>,
    pub total: usize,
}

/// Keys with local edits that have not reached the document store
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub unsynced_overrides: Vec<String>,
    pub unsynced_collections: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_attempt_at: Option<DateTime<Utc>>,
}

impl SyncStatus {
    pub fn is_clean(&self) -> bool {
        self.unsynced_overrides.is_empty() && self.unsynced_collections.is_empty()
    }
}
