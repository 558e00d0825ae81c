use serde::{Deserialize, Serialize};

/// Catalog video record (owned by the external catalog, read-only here)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Short-form videos never take part in series grouping
    #[serde(default)]
    pub is_short: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_thumbnail_url: Option<String>,
    #[serde(default)]
    pub views: u64,
}

impl Video {
    /// Case-insensitive match on title or description
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false)
    }
}

/// Denormalized video entry as listed inside a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_thumbnail_url: Option<String>,
    #[serde(default)]
    pub views: u64,
}

impl From<&Video> for VideoSummary {
    fn from(video: &Video) -> Self {
        Self {
            id: video.id.clone(),
            title: video.title.clone(),
            custom_thumbnail_url: video.custom_thumbnail_url.clone(),
            views: video.views,
        }
    }
}
