//! Series source trait, fetch payload types and structured fetch errors.
//!
//! The SeriesSource trait abstracts over wherever series come from (an HTTP
//! backend, a directory of JSON files, an in-memory fixture) so the cache can
//! be driven against a mock in tests. Sources never see the cache.

use crate::domain::{Identifier, TimeRangeSpec};
use futures::future::LocalBoxFuture;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Footnote attached to a single observation (preliminary, revised, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footnote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub text: String,
}

/// One observation as delivered by a source.
///
/// `value` is `None` when the source publishes the period without a number.
/// `breakdown` carries the nested per-dimension payload (dimension-value code
/// to number) for series that are broken down by sex, age, race and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDataPoint {
    pub year: i32,
    pub period_code: String,
    pub period_label: String,
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub breakdown: IndexMap<String, Option<f64>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub footnotes: Vec<Footnote>,
}

impl RawDataPoint {
    pub fn new(
        year: i32,
        period_code: impl Into<String>,
        period_label: impl Into<String>,
        value: Option<f64>,
    ) -> Self {
        Self {
            year,
            period_code: period_code.into(),
            period_label: period_label.into(),
            value,
            breakdown: IndexMap::new(),
            footnotes: Vec::new(),
        }
    }

    /// Attach a dimension breakdown, replacing any existing one.
    pub fn with_breakdown<I, K>(mut self, breakdown: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<f64>)>,
        K: Into<String>,
    {
        self.breakdown = breakdown.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self
    }

    pub fn with_footnote(mut self, text: impl Into<String>) -> Self {
        self.footnotes.push(Footnote {
            code: None,
            text: text.into(),
        });
        self
    }
}

/// Descriptive metadata returned with a series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesMetadata {
    pub display_name: String,
    /// Human-readable labels for breakdown codes (e.g. `"F"` → `"Women"`).
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub dimension_labels: IndexMap<String, String>,
}

impl SeriesMetadata {
    pub fn named(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            dimension_labels: IndexMap::new(),
        }
    }

    pub fn with_label(mut self, code: impl Into<String>, label: impl Into<String>) -> Self {
        self.dimension_labels.insert(code.into(), label.into());
        self
    }
}

/// Result of a successful fetch for one identifier over one range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    pub identifier: Identifier,
    pub requested_range: TimeRangeSpec,
    pub data_points: Vec<RawDataPoint>,
    pub metadata: SeriesMetadata,
}

impl FetchResult {
    /// True when the series resolved but carried no observations in range.
    pub fn is_empty(&self) -> bool {
        self.data_points.is_empty()
    }
}

/// Structured error types for fetch operations.
///
/// These are recorded on failed cache entries and shown next to the
/// selection, so every variant renders as a short human-readable line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("series not found: {identifier}")]
    NotFound { identifier: Identifier },

    #[error("data source unavailable: {0}")]
    Unavailable(String),

    #[error("malformed response for {identifier}: {message}")]
    Malformed {
        identifier: Identifier,
        message: String,
    },

    #[error("source answered for '{actual}' when '{requested}' was requested")]
    IdentifierMismatch {
        requested: Identifier,
        actual: Identifier,
    },

    #[error("fetch error: {0}")]
    Other(String),
}

/// Asynchronous series fetch, resolved on the caller's thread.
pub type SeriesFuture = LocalBoxFuture<'static, Result<FetchResult, FetchError>>;

/// Trait for series sources.
///
/// Implementations return a future that owns everything it needs, so the
/// cache can keep it in flight independently of the source borrow.
pub trait SeriesSource {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch one series over a time range.
    fn fetch_series(&self, identifier: &Identifier, range: TimeRangeSpec) -> SeriesFuture;
}
