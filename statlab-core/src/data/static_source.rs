//! In-memory series source for fixtures, demos and tests.

use super::provider::{
    FetchError, FetchResult, RawDataPoint, SeriesFuture, SeriesMetadata, SeriesSource,
};
use crate::domain::{Identifier, TimeRangeSpec};
use futures::future::{self, FutureExt};
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Canned {
    Series {
        metadata: SeriesMetadata,
        points: Vec<RawDataPoint>,
    },
    Failure(FetchError),
}

/// Source answering from a fixed table, resolving immediately.
///
/// Counts calls per identifier so callers can assert how often a series was
/// actually requested.
#[derive(Debug, Default)]
pub struct StaticSource {
    series: HashMap<Identifier, Canned>,
    calls: RefCell<HashMap<Identifier, usize>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a series.
    pub fn with_series(
        mut self,
        id: impl Into<Identifier>,
        metadata: SeriesMetadata,
        points: Vec<RawDataPoint>,
    ) -> Self {
        self.series
            .insert(id.into(), Canned::Series { metadata, points });
        self
    }

    /// Register an identifier that always fails with `error`.
    pub fn with_failure(mut self, id: impl Into<Identifier>, error: FetchError) -> Self {
        self.series.insert(id.into(), Canned::Failure(error));
        self
    }

    /// How many times `id` has been fetched.
    pub fn fetch_count(&self, id: &Identifier) -> usize {
        self.calls.borrow().get(id).copied().unwrap_or(0)
    }

    /// Total fetches across all identifiers.
    pub fn total_fetches(&self) -> usize {
        self.calls.borrow().values().sum()
    }
}

impl SeriesSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch_series(&self, identifier: &Identifier, range: TimeRangeSpec) -> SeriesFuture {
        *self
            .calls
            .borrow_mut()
            .entry(identifier.clone())
            .or_insert(0) += 1;

        let outcome = match self.series.get(identifier) {
            Some(Canned::Series { metadata, points }) => Ok(FetchResult {
                identifier: identifier.clone(),
                requested_range: range,
                data_points: points.clone(),
                metadata: metadata.clone(),
            }),
            Some(Canned::Failure(error)) => Err(error.clone()),
            None => Err(FetchError::NotFound {
                identifier: identifier.clone(),
            }),
        };
        future::ready(outcome).boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn serves_registered_series_and_counts_calls() {
        let source = StaticSource::new().with_series(
            "X",
            SeriesMetadata::named("Series X"),
            vec![RawDataPoint::new(2020, "M01", "Jan 2020", Some(1.0))],
        );
        let id = Identifier::new("X");

        let result = block_on(source.fetch_series(&id, TimeRangeSpec::AllTime)).unwrap();
        assert_eq!(result.data_points.len(), 1);
        assert_eq!(result.metadata.display_name, "Series X");
        assert_eq!(source.fetch_count(&id), 1);
    }

    #[test]
    fn unknown_identifier_is_not_found() {
        let source = StaticSource::new();
        let id = Identifier::new("NOPE");
        let err = block_on(source.fetch_series(&id, TimeRangeSpec::AllTime)).unwrap_err();
        assert_eq!(err, FetchError::NotFound { identifier: id });
    }

    #[test]
    fn canned_failure_is_returned() {
        let source =
            StaticSource::new().with_failure("BAD", FetchError::Unavailable("503".into()));
        let err = block_on(source.fetch_series(&"BAD".into(), TimeRangeSpec::AllTime))
            .unwrap_err();
        assert_eq!(err, FetchError::Unavailable("503".into()));
        assert_eq!(source.total_fetches(), 1);
    }
}
