//! Compositor: merge per-series results into one aligned timeline.

pub mod align;
pub mod expand;
pub mod timeline;

pub use align::compose;
pub use expand::{DimensionExpander, ExpansionPolicy};
pub use timeline::{AlignedRow, AlignedTimeline, Column};
