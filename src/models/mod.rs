pub mod api;
pub mod catalog;
pub mod collection;

pub use api::*;
pub use catalog::{Video, VideoSummary};
pub use collection::{
    CollectionKind, CollectionMap, CustomCollection, DisplaySeries, OverrideMap, SeriesOverride,
};
