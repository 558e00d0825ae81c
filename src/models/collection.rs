use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::catalog::VideoSummary;

/// Presentation override for an auto-derived series, keyed by base name.
/// Never holds membership: auto series are always recomputed from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesOverride {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// User-curated collection. Membership is the ordered list of video ids;
/// the other fields of each entry are a snapshot refreshed at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomCollection {
    pub name: String,
    #[serde(default)]
    pub videos: Vec<VideoSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CustomCollection {
    /// Ordered member ids as persisted
    pub fn member_ids(&self) -> Vec<String> {
        self.videos.iter().map(|v| v.id.clone()).collect()
    }
}

/// Overrides keyed by auto-series base name
pub type OverrideMap = BTreeMap<String, SeriesOverride>;

/// Custom collections keyed by collection id
pub type CollectionMap = BTreeMap<String, CustomCollection>;

/// Origin of a displayed collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    /// Derived from title patterns
    Series,
    /// Created by the user
    Custom,
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionKind::Series => write!(f, "series"),
            CollectionKind::Custom => write!(f, "custom"),
        }
    }
}

/// Unified view model for both auto series and custom collections.
/// Recomputed on every request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySeries {
    /// Base name for auto series, collection id for custom collections
    pub key: String,
    pub kind: CollectionKind,
    pub name: String,
    pub videos: Vec<VideoSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Local edits not yet written to the document store
    pub unsynced: bool,
}
