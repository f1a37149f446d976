//! Series sources and the fetch cache

pub mod cache;
pub mod json_dir;
pub mod provider;
pub mod static_source;

pub use cache::{CacheEntry, CacheKey, EnsureOutcome, FetchCache, FetchStatus, Settled};
pub use json_dir::{JsonDirSource, SeriesFile};
pub use provider::{
    FetchError, FetchResult, Footnote, RawDataPoint, SeriesFuture, SeriesMetadata, SeriesSource,
};
pub use static_source::StaticSource;
