//! Membership editor for custom collections

use std::collections::HashSet;

use crate::models::{MembershipCandidate, Video, VideoSummary};
use crate::services::merger::index_catalog;

/// Toggle one id: append when absent, remove (keeping the rest in order) when present
pub fn toggle(ids: &mut Vec<String>, video_id: &str) -> bool {
    if let Some(pos) = ids.iter().position(|id| id == video_id) {
        ids.remove(pos);
        false
    } else {
        ids.push(video_id.to_string());
        true
    }
}

/// Non-short catalog videos matching the query, flagged when already a member
pub fn candidates(catalog: &[Video], members: &[String], query: &str) -> Vec<MembershipCandidate> {
    let selected: HashSet<&str> = members.iter().map(String::as_str).collect();

    catalog
        .iter()
        .filter(|v| !v.is_short)
        .filter(|v| v.matches_query(query))
        .map(|v| MembershipCandidate {
            video: VideoSummary::from(v),
            description: v.description.clone(),
            selected: selected.contains(v.id.as_str()),
        })
        .collect()
}

/// Turn the editor's ordered id list into persisted entries.
///
/// Duplicates collapse to their first position. Ids missing from the
/// catalog or pointing at short-form videos are dropped; snapshot fields
/// come from the live catalog.
pub fn finalize(ids: &[String], catalog: &[Video]) -> Vec<VideoSummary> {
    let index = index_catalog(catalog);
    let mut seen = HashSet::new();

    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .filter_map(|id| index.get(id.as_str()))
        .filter(|video| !video.is_short)
        .map(|video| VideoSummary::from(*video))
        .collect()
}
