//! Document store backends
//!
//! A document is a JSON value addressed by `(collection, doc_id)`. Writes
//! replace the whole document; there is no patching and no versioning.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Document store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value document persistence
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a whole document; `None` when it was never written
    async fn get(&self, collection: &str, doc_id: &str) -> Result<Option<Value>, StoreError>;

    /// Replace a whole document
    async fn set(&self, collection: &str, doc_id: &str, data: &Value) -> Result<(), StoreError>;

    /// Connectivity probe for health checks
    async fn ping(&self) -> bool;

    /// Backend label for logs and health output
    fn backend_name(&self) -> &'static str;
}

/// Redis-backed store: one JSON string per document key, no expiry
#[derive(Clone)]
pub struct RedisDocumentStore {
    conn: ConnectionManager,
    key_prefix: String,
}

impl RedisDocumentStore {
    /// Create a new Redis store with connection pooling
    pub async fn new(redis_url: &str, key_prefix: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self {
            conn,
            key_prefix: key_prefix.to_string(),
        })
    }

    fn key(&self, collection: &str, doc_id: &str) -> String {
        document_key(&self.key_prefix, collection, doc_id)
    }
}

fn document_key(prefix: &str, collection: &str, doc_id: &str) -> String {
    format!("{}{}:{}", prefix, collection, doc_id)
}

#[async_trait]
impl DocumentStore for RedisDocumentStore {
    async fn get(&self, collection: &str, doc_id: &str) -> Result<Option<Value>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(self.key(collection, doc_id)).await?;
        match value {
            Some(v) => Ok(Some(serde_json::from_str(&v)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, collection: &str, doc_id: &str, data: &Value) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let serialized = serde_json::to_string(data)?;
        let _: () = conn.set(self.key(collection, doc_id), serialized).await?;
        Ok(())
    }

    async fn ping(&self) -> bool {
        let mut conn = self.conn.clone();
        let pong: Result<String, redis::RedisError> =
            redis::cmd("PING").query_async(&mut conn).await;
        matches!(pong.as_deref(), Ok("PONG"))
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

/// Process-local store for development and tests
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<(String, String), Value>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, doc_id: &str) -> Result<Option<Value>, StoreError> {
        let documents = self.documents.read().await;
        Ok(documents
            .get(&(collection.to_string(), doc_id.to_string()))
            .cloned())
    }

    async fn set(&self, collection: &str, doc_id: &str, data: &Value) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        documents.insert((collection.to_string(), doc_id.to_string()), data.clone());
        Ok(())
    }

    async fn ping(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
