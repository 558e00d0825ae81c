use lazy_static::lazy_static;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

lazy_static! {
    pub static ref STORE_WRITES: IntCounter = register_int_counter!(
        "shelf_store_writes_total",
        "Full-document writes sent to the document store"
    )
    .unwrap();
    pub static ref STORE_WRITE_FAILURES: IntCounter = register_int_counter!(
        "shelf_store_write_failures_total",
        "Document writes that failed and left local edits unsynced"
    )
    .unwrap();
    pub static ref THUMBNAIL_UPLOADS: IntCounterVec = register_int_counter_vec!(
        "shelf_thumbnail_uploads_total",
        "Thumbnail uploads by outcome",
        &["outcome"]
    )
    .unwrap();
    pub static ref CATALOG_RELOADS: IntCounterVec = register_int_counter_vec!(
        "shelf_catalog_reloads_total",
        "Catalog loads by outcome",
        &["outcome"]
    )
    .unwrap();
}
