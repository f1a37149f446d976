//! StatLab Core — selection, fetch caching and period alignment for
//! economic time series.
//!
//! This crate contains the engine behind a statistics dashboard:
//! - Domain types (identifiers, column keys, period codes, time ranges)
//! - Series source trait with in-memory and JSON-directory implementations
//! - Fetch cache keyed by (identifier, range) with in-flight de-duplication
//!   and failure isolation
//! - Bounded, ordered selection set
//! - Dimension expansion of broken-down series into per-value columns
//! - Compositor merging ready series into one chronologically sorted timeline
//! - Chart and table projections of that timeline
//! - A session store tying it all together

pub mod compose;
pub mod config;
pub mod data;
pub mod domain;
pub mod selection;
pub mod session;
pub mod view;

pub use compose::{compose, AlignedRow, AlignedTimeline, Column, DimensionExpander, ExpansionPolicy};
pub use config::{CompositorConfig, ConfigError};
pub use data::{FetchError, FetchResult, RawDataPoint, SeriesMetadata, SeriesSource};
pub use domain::{ColumnKey, Identifier, PeriodCode, PeriodKey, TimeRangeSpec};
pub use selection::{SelectionLimitExceeded, SelectionSet, Toggle};
pub use session::{SelectionEntry, SeriesSession, SeriesState};
