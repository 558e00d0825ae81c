//! Auto-series derivation
//!
//! Groups catalog videos by the base name of their titles. Overrides only
//! change presentation; group identity is always the base name.

use std::collections::HashMap;

use crate::models::{CollectionKind, DisplaySeries, OverrideMap, Video, VideoSummary};
use crate::services::title::{compare_names, TitleParser};

/// Videos accumulated under one base name during grouping
#[derive(Debug)]
struct SeriesAccumulator<'a> {
    base_name: String,
    videos: Vec<&'a Video>,
}

/// Build the auto-derived series from the catalog and persisted overrides.
///
/// Short-form videos are skipped, singleton groups are dropped, episodes are
/// ordered by extracted episode number (stable on ties), and the result is
/// sorted by display name.
pub fn build_auto_series(videos: &[Video], overrides: &OverrideMap) -> Vec<DisplaySeries> {
    // First-seen group order during accumulation
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<SeriesAccumulator> = Vec::new();

    for video in videos.iter().filter(|v| !v.is_short) {
        let base_name = TitleParser::base_name(&video.title);
        match index.get(&base_name) {
            Some(&pos) => groups[pos].videos.push(video),
            None => {
                index.insert(base_name.clone(), groups.len());
                groups.push(SeriesAccumulator {
                    base_name,
                    videos: vec![video],
                });
            }
        }
    }

    let mut series: Vec<DisplaySeries> = groups
        .into_iter()
        .filter(|group| group.videos.len() > 1)
        .map(|group| build_display_series(group, overrides))
        .collect();

    series.sort_by(|a, b| compare_names(&a.name, &b.name));
    series
}

/// Attach override fields and order episodes
fn build_display_series(group: SeriesAccumulator, overrides: &OverrideMap) -> DisplaySeries {
    let mut videos = group.videos;
    // sort_by_key is stable: equal episode numbers keep catalog order
    videos.sort_by_key(|v| TitleParser::episode_number(&v.title));

    let series_override = overrides.get(&group.base_name);
    let name = series_override
        .map(|o| o.name.trim())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| group.base_name.clone());

    DisplaySeries {
        key: group.base_name,
        kind: CollectionKind::Series,
        name,
        videos: videos.into_iter().map(VideoSummary::from).collect(),
        custom_thumbnail_url: series_override.and_then(|o| o.custom_thumbnail_url.clone()),
        description: series_override.and_then(|o| o.description.clone()),
        unsynced: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeriesOverride;
    use std::collections::HashSet;

    fn video(id: &str, title: &str) -> Video {
        Video {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            is_short: false,
            custom_thumbnail_url: None,
            views: 0,
        }
    }

    fn ids(series: &DisplaySeries) -> Vec<&str> {
        series.videos.iter().map(|v| v.id.as_str()).collect()
    }

    #[test]
    fn test_groups_episodes_and_drops_singletons() {
        let videos = vec![
            video("2", "Show EP02"),
            video("1", "Show EP01"),
            video("3", "Other"),
        ];
        let series = build_auto_series(&videos, &OverrideMap::new());
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].name, "Show");
        assert_eq!(series[0].key, "Show");
        assert_eq!(series[0].kind, CollectionKind::Series);
        assert_eq!(ids(&series[0]), vec!["1", "2"]);
    }

    #[test]
    fn test_shorts_never_grouped() {
        let mut short = video("s", "Show EP03");
        short.is_short = true;
        let videos = vec![video("1", "Show EP01"), short];
        // Only one non-short video left, so no series
        assert!(build_auto_series(&videos, &OverrideMap::new()).is_empty());
    }

    #[test]
    fn test_equal_episode_numbers_keep_catalog_order() {
        let videos = vec![
            video("b", "Trip Special"),
            video("c", "Trip EP1"),
            video("a", "Trip (Special)"),
            video("d", "Trip Special"),
        ];
        let series = build_auto_series(&videos, &OverrideMap::new());
        let trip: Vec<_> = series.iter().filter(|s| s.key == "Trip Special").collect();
        assert_eq!(trip.len(), 1);
        assert_eq!(ids(trip[0]), vec!["b", "d"]);

        let videos = vec![
            video("x", "Cook 1"),
            video("y", "Cook EP1"),
            video("z", "Cook"),
        ];
        let series = build_auto_series(&videos, &OverrideMap::new());
        assert_eq!(series.len(), 1);
        // "Cook" has episode 0, then the two episode-1 titles in catalog order
        assert_eq!(ids(&series[0]), vec!["z", "x", "y"]);
    }

    #[test]
    fn test_override_changes_presentation_only() {
        let videos = vec![
            video("1", "Show EP01"),
            video("2", "Show EP02"),
            video("3", "Alpha 1"),
            video("4", "Alpha 2"),
        ];
        let mut overrides = OverrideMap::new();
        overrides.insert(
            "Show".to_string(),
            SeriesOverride {
                name: "Zebra Show".to_string(),
                custom_thumbnail_url: Some("http://img/show.png".to_string()),
                description: Some("The show".to_string()),
            },
        );

        let series = build_auto_series(&videos, &overrides);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "Alpha");
        assert_eq!(series[1].name, "Zebra Show");
        assert_eq!(series[1].key, "Show");
        assert_eq!(series[1].custom_thumbnail_url.as_deref(), Some("http://img/show.png"));
        assert_eq!(series[1].description.as_deref(), Some("The show"));
        assert_eq!(ids(&series[1]), vec!["1", "2"]);
    }

    #[test]
    fn test_blank_override_name_falls_back_to_base_name() {
        let videos = vec![video("1", "Show EP01"), video("2", "Show EP02")];
        let mut overrides = OverrideMap::new();
        overrides.insert(
            "Show".to_string(),
            SeriesOverride {
                name: "  ".to_string(),
                custom_thumbnail_url: None,
                description: Some("desc".to_string()),
            },
        );
        let series = build_auto_series(&videos, &overrides);
        assert_eq!(series[0].name, "Show");
        assert_eq!(series[0].description.as_deref(), Some("desc"));
    }

    #[test]
    fn test_every_group_has_two_or_more_and_no_overlap() {
        let titles = [
            "Drama 2x05 HD",
            "Drama 2x06",
            "Drama 3",
            "Comedy EP1",
            "Comedy EP2",
            "Lonely",
            "Vlog (1)",
            "Vlog (2)",
            "Vlog [3] SD",
            "Misc",
        ];
        let videos: Vec<Video> = titles
            .iter()
            .enumerate()
            .map(|(i, t)| video(&i.to_string(), t))
            .collect();

        let series = build_auto_series(&videos, &OverrideMap::new());
        let mut seen = HashSet::new();
        for s in &series {
            assert!(s.videos.len() >= 2, "group {} too small", s.name);
            for v in &s.videos {
                assert!(seen.insert(v.id.clone()), "video {} in two groups", v.id);
            }
        }
        let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Comedy", "Drama", "Vlog"]);
    }
}
