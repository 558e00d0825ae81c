use lazy_static::lazy_static;
use lru::LruCache;
use regex::Regex;
use std::cmp::Ordering;
use std::num::NonZeroUsize;
use std::sync::Mutex;

// Cache for base_name (LRU with 10k max entries)
lazy_static! {
    static ref BASE_NAME_CACHE: Mutex<LruCache<String, String>> =
        Mutex::new(LruCache::new(NonZeroUsize::new(10000).unwrap()));

    // ============ NORMALIZATION PATTERNS (applied in order) ============
    /// Quality/resolution marker and everything after it ("Drama HD 2" -> "Drama")
    static ref QUALITY_TAIL: Regex = Regex::new(r"(?i)\s*\b(?:HLA|HD|SD)\b.*$").unwrap();
    /// Run of standalone trailing numbers or NxM pairs ("Show 3", "Show 2x10")
    static ref TRAILING_NUMBER: Regex =
        Regex::new(r"(?i)(?:^|\s)(?:\d+(?:x\d+)?\s*)+$").unwrap();
    /// Embedded episode marker: EP12, E.3, a bare 7, [4], (5)
    static ref EPISODE_MARKER: Regex =
        Regex::new(r"(?i)\s*(?:(?:\bEP?\.?\s*)?\d+|\[\d+\]|\(\d+\))\s*").unwrap();

    // ============ EXTRACTORS ============
    static ref EXTRACTOR_EPISODE: Regex = Regex::new(r"(?i)(?:EP?\.?\s*)?(\d+)").unwrap();
}

/// Title heuristics used to group catalog videos into series
pub struct TitleParser;

impl TitleParser {
    /// Derive the grouping key of a title.
    ///
    /// Total over any input: the key may be empty but never fails.
    /// The pipeline is re-applied until the key stops changing, so the
    /// result is always a fixed point (`base_name(base_name(t)) == base_name(t)`).
    pub fn base_name(title: &str) -> String {
        if let Ok(mut cache) = BASE_NAME_CACHE.lock() {
            if let Some(cached) = cache.get(title) {
                return cached.clone();
            }
        }

        let mut current = Self::normalize_once(title);
        loop {
            // Every pass that changes the string makes it strictly shorter
            let next = Self::normalize_once(&current);
            if next == current {
                break;
            }
            current = next;
        }

        if let Ok(mut cache) = BASE_NAME_CACHE.lock() {
            cache.put(title.to_string(), current.clone());
        }
        current
    }

    fn normalize_once(title: &str) -> String {
        let result = QUALITY_TAIL.replace(title, "");
        let result = TRAILING_NUMBER.replace(&result, "");
        let result = EPISODE_MARKER.replace_all(&result, " ");
        result.trim().to_string()
    }

    /// Episode number used for ordering within a series; 0 when absent
    pub fn episode_number(title: &str) -> u32 {
        EXTRACTOR_EPISODE
            .captures(title)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    }

    /// Clear the base name cache
    pub fn clear_cache() {
        if let Ok(mut cache) = BASE_NAME_CACHE.lock() {
            cache.clear();
        }
    }
}

/// Display-name ordering: case-insensitive, raw name breaks ties
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
