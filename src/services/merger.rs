//! Reconciles auto series with user-authored custom collections

use std::collections::HashMap;

use crate::models::{CollectionKind, CollectionMap, CustomCollection, DisplaySeries, Video, VideoSummary};
use crate::services::title::compare_names;

/// Resolve a custom collection's stored references against the live catalog.
///
/// Entries whose id is gone from the catalog are left out of the display;
/// the stored collection itself is not touched.
pub fn resolve_collection(
    id: &str,
    collection: &CustomCollection,
    catalog: &HashMap<&str, &Video>,
) -> DisplaySeries {
    let videos = collection
        .videos
        .iter()
        .filter_map(|entry| catalog.get(entry.id.as_str()))
        .map(|video| VideoSummary::from(*video))
        .collect();

    DisplaySeries {
        key: id.to_string(),
        kind: CollectionKind::Custom,
        name: collection.name.clone(),
        videos,
        custom_thumbnail_url: collection.custom_thumbnail_url.clone(),
        description: collection.description.clone(),
        unsynced: false,
    }
}

/// Index the catalog by video id
pub fn index_catalog(videos: &[Video]) -> HashMap<&str, &Video> {
    videos.iter().map(|v| (v.id.as_str(), v)).collect()
}

/// Union of auto series and resolved custom collections, sorted by display name
pub fn merge_collections(
    auto_series: Vec<DisplaySeries>,
    custom: &CollectionMap,
    videos: &[Video],
) -> Vec<DisplaySeries> {
    let catalog = index_catalog(videos);

    let mut merged = auto_series;
    merged.extend(
        custom
            .iter()
            .map(|(id, collection)| resolve_collection(id, collection, &catalog)),
    );

    merged.sort_by(|a, b| compare_names(&a.name, &b.name));
    merged
}

/// Case-insensitive substring filter on display name; blank query keeps all
pub fn filter_by_name(collections: Vec<DisplaySeries>, query: &str) -> Vec<DisplaySeries> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return collections;
    }

    collections
        .into_iter()
        .filter(|c| c.name.to_lowercase().contains(&needle))
        .collect()
}
