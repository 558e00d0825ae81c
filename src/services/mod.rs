pub mod catalog;
pub mod library;
pub mod membership;
pub mod merger;
pub mod metrics;
pub mod persistence;
pub mod series_builder;
pub mod store;
pub mod title;
pub mod uploader;

#[cfg(test)]
pub mod testing;
