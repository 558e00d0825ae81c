//! Persistence adapter for the two user-owned maps
//!
//! Each map is stored as one document per user: a JSON object whose keys
//! are the map keys. Saves always replace the full document.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::{CollectionMap, OverrideMap};
use crate::services::store::{DocumentStore, StoreError};

/// Collection holding series presentation overrides
pub const SERIES_DATA_COLLECTION: &str = "seriesData";
/// Collection holding custom collections
pub const CUSTOM_COLLECTIONS_COLLECTION: &str = "customCollections";

/// Loads and saves overrides and custom collections for the single user
#[derive(Clone)]
pub struct CollectionRepository {
    store: Arc<dyn DocumentStore>,
    user_doc_id: String,
}

impl CollectionRepository {
    pub fn new(store: Arc<dyn DocumentStore>, user_doc_id: impl Into<String>) -> Self {
        Self {
            store,
            user_doc_id: user_doc_id.into(),
        }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub async fn load_overrides(&self) -> Result<OverrideMap, StoreError> {
        let doc = self
            .store
            .get(SERIES_DATA_COLLECTION, &self.user_doc_id)
            .await?;
        Ok(doc.map(overrides_from_document).unwrap_or_default())
    }

    pub async fn save_overrides(&self, overrides: &OverrideMap) -> Result<(), StoreError> {
        let doc = overrides_to_document(overrides)?;
        self.store
            .set(SERIES_DATA_COLLECTION, &self.user_doc_id, &doc)
            .await?;
        debug!("Saved {} series overrides", overrides.len());
        Ok(())
    }

    pub async fn load_custom_collections(&self) -> Result<CollectionMap, StoreError> {
        let doc = self
            .store
            .get(CUSTOM_COLLECTIONS_COLLECTION, &self.user_doc_id)
            .await?;
        Ok(doc.map(collections_from_document).unwrap_or_default())
    }

    pub async fn save_custom_collections(
        &self,
        collections: &CollectionMap,
    ) -> Result<(), StoreError> {
        let doc = collections_to_document(collections)?;
        self.store
            .set(CUSTOM_COLLECTIONS_COLLECTION, &self.user_doc_id, &doc)
            .await?;
        debug!("Saved {} custom collections", collections.len());
        Ok(())
    }
}

pub fn overrides_to_document(overrides: &OverrideMap) -> Result<Value, StoreError> {
    map_to_document(overrides)
}

pub fn overrides_from_document(doc: Value) -> OverrideMap {
    map_from_document(doc, SERIES_DATA_COLLECTION)
}

pub fn collections_to_document(collections: &CollectionMap) -> Result<Value, StoreError> {
    map_to_document(collections)
}

pub fn collections_from_document(doc: Value) -> CollectionMap {
    map_from_document(doc, CUSTOM_COLLECTIONS_COLLECTION)
}

fn map_to_document<T: Serialize>(map: &BTreeMap<String, T>) -> Result<Value, StoreError> {
    let mut object = Map::with_capacity(map.len());
    for (key, entry) in map {
        object.insert(key.clone(), serde_json::to_value(entry)?);
    }
    Ok(Value::Object(object))
}

/// Decode entry by entry; malformed entries are skipped so one bad record
/// does not hide the rest of the map
fn map_from_document<T: DeserializeOwned>(doc: Value, collection: &str) -> BTreeMap<String, T> {
    let object = match doc {
        Value::Object(object) => object,
        Value::Null => return BTreeMap::new(),
        other => {
            warn!(
                "Ignoring {} document: expected object, found {}",
                collection,
                json_kind(&other)
            );
            return BTreeMap::new();
        }
    };

    let mut map = BTreeMap::new();
    for (key, value) in object {
        match serde_json::from_value::<T>(value) {
            Ok(entry) => {
                map.insert(key, entry);
            }
            Err(e) => warn!("Skipping malformed {} entry '{}': {}", collection, key, e),
        }
    }
    map
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomCollection, SeriesOverride, VideoSummary};
    use crate::services::store::MemoryDocumentStore;
    use serde_json::json;

    fn repository() -> CollectionRepository {
        CollectionRepository::new(Arc::new(MemoryDocumentStore::new()), "default")
    }

    fn sample_overrides() -> OverrideMap {
        let mut overrides = OverrideMap::new();
        overrides.insert(
            "Show".to_string(),
            SeriesOverride {
                name: "The Show".to_string(),
                custom_thumbnail_url: Some("http://img/show.png".to_string()),
                description: None,
            },
        );
        overrides.insert(
            "Drama".to_string(),
            SeriesOverride {
                name: "Drama".to_string(),
                custom_thumbnail_url: None,
                description: Some("Weekly drama".to_string()),
            },
        );
        overrides
    }

    #[tokio::test]
    async fn test_overrides_round_trip() {
        let repo = repository();
        let overrides = sample_overrides();
        repo.save_overrides(&overrides).await.unwrap();

        let loaded = repo.load_overrides().await.unwrap();
        assert_eq!(loaded, overrides);
        assert_eq!(
            loaded.keys().collect::<Vec<_>>(),
            vec!["Drama", "Show"]
        );
    }

    #[tokio::test]
    async fn test_custom_collections_round_trip() {
        let repo = repository();
        let mut collections = CollectionMap::new();
        collections.insert(
            "c1".to_string(),
            CustomCollection {
                name: "Favs".to_string(),
                videos: vec![VideoSummary {
                    id: "a".to_string(),
                    title: "Alpha".to_string(),
                    custom_thumbnail_url: None,
                    views: 3,
                }],
                custom_thumbnail_url: None,
                description: Some("mine".to_string()),
            },
        );
        repo.save_custom_collections(&collections).await.unwrap();
        assert_eq!(repo.load_custom_collections().await.unwrap(), collections);

        // The two maps live in separate documents
        assert!(repo.load_overrides().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_documents_load_empty() {
        let repo = repository();
        assert!(repo.load_overrides().await.unwrap().is_empty());
        assert!(repo.load_custom_collections().await.unwrap().is_empty());
    }

    #[test]
    fn test_document_layout_is_keyed_object() {
        let doc = overrides_to_document(&sample_overrides()).unwrap();
        assert_eq!(doc["Show"]["name"], json!("The Show"));
        assert_eq!(doc["Show"]["customThumbnailUrl"], json!("http://img/show.png"));
        assert!(doc["Show"].get("description").is_none());
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let doc = json!({
            "good": {"name": "Good", "videos": [{"id": "a"}]},
            "bad": {"videos": "not a list"},
            "worse": 42
        });
        let collections = collections_from_document(doc);
        assert_eq!(collections.len(), 1);
        assert!(collections.contains_key("good"));

        assert!(overrides_from_document(json!(["not", "an", "object"])).is_empty());
        assert!(overrides_from_document(Value::Null).is_empty());
    }
}
