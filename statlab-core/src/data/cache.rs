//! In-memory fetch cache keyed by `(identifier, range)`.
//!
//! Features:
//! - At most one in-flight fetch per key; `ensure` on a Pending or Ready
//!   entry is a no-op
//! - Failure isolation: source errors become `Failed` entries, never panics
//!   or propagated errors; the next `ensure` retries them
//! - Range invalidation drops every entry that does not match the active
//!   range
//! - Completions that arrive after their entry was invalidated are discarded
//! - Points older than the entry's resolved start year are trimmed
//!
//! Entry lifecycle: `Idle (absent) → Pending → Ready | Failed`. Only
//! `invalidate` / `invalidate_all` take an entry back to Idle.

use super::provider::{FetchError, FetchResult, SeriesSource};
use crate::domain::{Identifier, TimeRangeSpec};
use futures::future::{FutureExt, LocalBoxFuture};
use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Cache key: one entry per identifier per requested range.
pub type CacheKey = (Identifier, TimeRangeSpec);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Pending,
    Ready,
    Failed,
}

#[derive(Debug, Clone)]
enum EntryState {
    Pending,
    Ready(FetchResult),
    Failed(FetchError),
}

/// One cached fetch.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    requested_range: TimeRangeSpec,
    state: EntryState,
    ticket: u64,
}

impl CacheEntry {
    pub fn status(&self) -> FetchStatus {
        match self.state {
            EntryState::Pending => FetchStatus::Pending,
            EntryState::Ready(_) => FetchStatus::Ready,
            EntryState::Failed(_) => FetchStatus::Failed,
        }
    }

    /// The fetched series, once Ready.
    pub fn result(&self) -> Option<&FetchResult> {
        match &self.state {
            EntryState::Ready(result) => Some(result),
            _ => None,
        }
    }

    /// Why the fetch failed, when Failed.
    pub fn error(&self) -> Option<&FetchError> {
        match &self.state {
            EntryState::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn requested_range(&self) -> TimeRangeSpec {
        self.requested_range
    }
}

/// What `ensure` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// A new fetch was issued (no entry, or a Failed one being retried).
    Issued,
    AlreadyPending,
    AlreadyReady,
}

/// A fetch that finished and was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settled {
    pub identifier: Identifier,
    pub range: TimeRangeSpec,
    pub status: FetchStatus,
}

struct Completion {
    key: CacheKey,
    ticket: u64,
    outcome: Result<FetchResult, FetchError>,
}

/// The fetch cache.
pub struct FetchCache {
    source: Rc<dyn SeriesSource>,
    entries: HashMap<CacheKey, CacheEntry>,
    in_flight: FuturesUnordered<LocalBoxFuture<'static, Completion>>,
    active_range: TimeRangeSpec,
    reference_year: i32,
    next_ticket: u64,
}

impl FetchCache {
    /// Create an empty cache over `source`. `reference_year` anchors
    /// `LastYears` ranges.
    pub fn new(
        source: Rc<dyn SeriesSource>,
        active_range: TimeRangeSpec,
        reference_year: i32,
    ) -> Self {
        Self {
            source,
            entries: HashMap::new(),
            in_flight: FuturesUnordered::new(),
            active_range,
            reference_year,
            next_ticket: 0,
        }
    }

    pub fn active_range(&self) -> TimeRangeSpec {
        self.active_range
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    /// Make sure data for `(id, range)` exists or is on its way.
    ///
    /// Issues a fetch only when there is no entry or the entry is Failed.
    pub fn ensure(&mut self, id: &Identifier, range: TimeRangeSpec) -> EnsureOutcome {
        let key = (id.clone(), range);
        match self.entries.get(&key).map(CacheEntry::status) {
            Some(FetchStatus::Pending) => return EnsureOutcome::AlreadyPending,
            Some(FetchStatus::Ready) => return EnsureOutcome::AlreadyReady,
            Some(FetchStatus::Failed) => debug!("retrying failed fetch for {id} ({range})"),
            None => debug!("fetching {id} ({range}) from {}", self.source.name()),
        }

        let ticket = self.next_ticket;
        self.next_ticket += 1;

        let fetch = self.source.fetch_series(id, range);
        let completion_key = key.clone();
        self.in_flight.push(
            fetch
                .map(move |outcome| Completion {
                    key: completion_key,
                    ticket,
                    outcome,
                })
                .boxed_local(),
        );

        self.entries.insert(
            key,
            CacheEntry {
                requested_range: range,
                state: EntryState::Pending,
                ticket,
            },
        );
        EnsureOutcome::Issued
    }

    /// Entry for `id` under the active range.
    pub fn get(&self, id: &Identifier) -> Option<&CacheEntry> {
        self.get_for(id, self.active_range)
    }

    /// Entry for `id` under an explicit range.
    pub fn get_for(&self, id: &Identifier, range: TimeRangeSpec) -> Option<&CacheEntry> {
        self.entries.get(&(id.clone(), range))
    }

    /// Status of `id` under the active range; `None` means Idle.
    pub fn status(&self, id: &Identifier) -> Option<FetchStatus> {
        self.get(id).map(CacheEntry::status)
    }

    /// Make `range` the active range and drop every entry keyed by another
    /// range. Returns how many entries were dropped.
    pub fn invalidate(&mut self, range: TimeRangeSpec) -> usize {
        self.active_range = range;
        let before = self.entries.len();
        self.entries.retain(|(_, entry_range), _| *entry_range == range);
        let dropped = before - self.entries.len();
        if dropped > 0 {
            debug!("invalidated {dropped} cache entries outside {range}");
        }
        dropped
    }

    /// Drop every entry. Fetches still in flight are discarded on arrival.
    pub fn invalidate_all(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    /// Number of entries (any status).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries still waiting on their fetch.
    pub fn pending_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| e.status() == FetchStatus::Pending)
            .count()
    }

    /// True while any fetch future is outstanding, including ones whose
    /// entry has since been invalidated.
    pub fn has_in_flight(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Record every fetch that has already finished, without waiting.
    pub fn poll_completed(&mut self) -> Vec<Settled> {
        let mut settled = Vec::new();
        while let Some(Some(completion)) = self.in_flight.next().now_or_never() {
            if let Some(done) = self.apply(completion) {
                settled.push(done);
            }
        }
        settled
    }

    /// Wait for the next fetch to finish and record it. Returns `None` once
    /// nothing is left in flight.
    pub async fn next_completed(&mut self) -> Option<Settled> {
        loop {
            let completion = self.in_flight.next().await?;
            if let Some(done) = self.apply(completion) {
                return Some(done);
            }
        }
    }

    fn apply(&mut self, completion: Completion) -> Option<Settled> {
        let Completion {
            key,
            ticket,
            outcome,
        } = completion;
        let (id, range) = &key;

        let Some(entry) = self.entries.get_mut(&key) else {
            debug!("discarding result for {id} ({range}): entry was invalidated");
            return None;
        };
        if entry.ticket != ticket || entry.status() != FetchStatus::Pending {
            debug!("discarding stale result for {id} ({range})");
            return None;
        }

        let start_year = range.start_year(self.reference_year);
        entry.state = match outcome.and_then(|result| validate(id, result)) {
            Ok(mut result) => {
                if let Some(start) = start_year {
                    let before = result.data_points.len();
                    result.data_points.retain(|p| p.year >= start);
                    let trimmed = before - result.data_points.len();
                    if trimmed > 0 {
                        debug!("trimmed {trimmed} points before {start} from {id}");
                    }
                }
                if result.is_empty() {
                    warn!("{id} returned no data points for {range}");
                }
                EntryState::Ready(result)
            }
            Err(error) => {
                warn!("fetch failed for {id} ({range}): {error}");
                EntryState::Failed(error)
            }
        };

        Some(Settled {
            identifier: id.clone(),
            range: *range,
            status: entry.status(),
        })
    }
}

fn validate(requested: &Identifier, result: FetchResult) -> Result<FetchResult, FetchError> {
    if &result.identifier != requested {
        return Err(FetchError::IdentifierMismatch {
            requested: requested.clone(),
            actual: result.identifier,
        });
    }
    Ok(result)
}

impl fmt::Debug for FetchCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchCache")
            .field("source", &self.source.name())
            .field("entries", &self.entries.len())
            .field("in_flight", &self.in_flight.len())
            .field("active_range", &self.active_range)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::{RawDataPoint, SeriesFuture, SeriesMetadata};
    use crate::data::static_source::StaticSource;
    use futures::channel::oneshot;
    use std::cell::RefCell;

    fn point(year: i32, code: &str, value: f64) -> RawDataPoint {
        RawDataPoint::new(year, code, format!("{code} {year}"), Some(value))
    }

    fn static_source() -> Rc<StaticSource> {
        Rc::new(
            StaticSource::new()
                .with_series(
                    "X",
                    SeriesMetadata::named("X"),
                    vec![point(2019, "M12", 1.0), point(2020, "M01", 2.0)],
                )
                .with_failure("BAD", FetchError::Unavailable("down".into())),
        )
    }

    /// Source whose fetches resolve only when the test sends the result.
    #[derive(Default)]
    struct ManualSource {
        senders: RefCell<Vec<(Identifier, oneshot::Sender<Result<FetchResult, FetchError>>)>>,
    }

    impl SeriesSource for ManualSource {
        fn name(&self) -> &str {
            "manual"
        }

        fn fetch_series(&self, identifier: &Identifier, _range: TimeRangeSpec) -> SeriesFuture {
            let (tx, rx) = oneshot::channel();
            self.senders.borrow_mut().push((identifier.clone(), tx));
            rx.map(|r| r.unwrap_or_else(|_| Err(FetchError::Other("dropped".into()))))
                .boxed_local()
        }
    }

    impl ManualSource {
        fn resolve_next(&self, range: TimeRangeSpec) {
            let (id, tx) = self.senders.borrow_mut().remove(0);
            let _ = tx.send(Ok(FetchResult {
                identifier: id,
                requested_range: range,
                data_points: vec![point(2020, "M01", 1.0)],
                metadata: SeriesMetadata::named("manual"),
            }));
        }
    }

    #[test]
    fn ensure_issues_once_and_becomes_ready() {
        let source = static_source();
        let mut cache = FetchCache::new(source.clone(), TimeRangeSpec::AllTime, 2024);
        let x = Identifier::new("X");

        assert_eq!(cache.ensure(&x, TimeRangeSpec::AllTime), EnsureOutcome::Issued);
        assert_eq!(cache.status(&x), Some(FetchStatus::Pending));
        assert_eq!(
            cache.ensure(&x, TimeRangeSpec::AllTime),
            EnsureOutcome::AlreadyPending
        );

        let settled = cache.poll_completed();
        assert_eq!(settled.len(), 1);
        assert_eq!(settled[0].status, FetchStatus::Ready);
        assert_eq!(
            cache.ensure(&x, TimeRangeSpec::AllTime),
            EnsureOutcome::AlreadyReady
        );
        assert_eq!(source.fetch_count(&x), 1);
    }

    #[test]
    fn failure_is_recorded_and_retried_on_ensure() {
        let source = static_source();
        let mut cache = FetchCache::new(source.clone(), TimeRangeSpec::AllTime, 2024);
        let bad = Identifier::new("BAD");

        cache.ensure(&bad, TimeRangeSpec::AllTime);
        cache.poll_completed();
        let entry = cache.get(&bad).unwrap();
        assert_eq!(entry.status(), FetchStatus::Failed);
        assert!(entry.result().is_none());
        assert_eq!(entry.error(), Some(&FetchError::Unavailable("down".into())));

        assert_eq!(cache.ensure(&bad, TimeRangeSpec::AllTime), EnsureOutcome::Issued);
        assert_eq!(source.fetch_count(&bad), 2);
    }

    #[test]
    fn invalidate_drops_other_ranges() {
        let source = static_source();
        let mut cache = FetchCache::new(source.clone(), TimeRangeSpec::LastYears(1), 2020);
        let x = Identifier::new("X");

        cache.ensure(&x, TimeRangeSpec::LastYears(1));
        cache.poll_completed();
        assert_eq!(cache.invalidate(TimeRangeSpec::AllTime), 1);
        assert!(cache.get(&x).is_none());
        assert_eq!(cache.active_range(), TimeRangeSpec::AllTime);

        cache.ensure(&x, TimeRangeSpec::AllTime);
        assert_eq!(cache.invalidate(TimeRangeSpec::AllTime), 0);
        assert_eq!(source.fetch_count(&x), 2);
    }

    #[test]
    fn points_before_range_start_are_trimmed() {
        let mut cache = FetchCache::new(static_source(), TimeRangeSpec::LastYears(1), 2020);
        let x = Identifier::new("X");

        cache.ensure(&x, TimeRangeSpec::LastYears(1));
        cache.poll_completed();
        let result = cache.get(&x).unwrap().result().unwrap();
        assert_eq!(result.data_points.len(), 1);
        assert_eq!(result.data_points[0].year, 2020);
    }

    #[test]
    fn completion_after_invalidate_all_is_discarded() {
        let source = Rc::new(ManualSource::default());
        let mut cache = FetchCache::new(source.clone(), TimeRangeSpec::AllTime, 2024);
        let x = Identifier::new("X");

        cache.ensure(&x, TimeRangeSpec::AllTime);
        assert!(cache.poll_completed().is_empty());
        cache.invalidate_all();

        source.resolve_next(TimeRangeSpec::AllTime);
        assert!(cache.poll_completed().is_empty());
        assert!(cache.get(&x).is_none());
        assert!(!cache.has_in_flight());
    }

    #[test]
    fn refetch_after_invalidate_ignores_the_older_completion() {
        let source = Rc::new(ManualSource::default());
        let mut cache = FetchCache::new(source.clone(), TimeRangeSpec::AllTime, 2024);
        let x = Identifier::new("X");

        cache.ensure(&x, TimeRangeSpec::AllTime);
        cache.invalidate_all();
        cache.ensure(&x, TimeRangeSpec::AllTime);

        // First (stale) fetch lands: entry stays pending.
        source.resolve_next(TimeRangeSpec::AllTime);
        assert!(cache.poll_completed().is_empty());
        assert_eq!(cache.status(&x), Some(FetchStatus::Pending));

        source.resolve_next(TimeRangeSpec::AllTime);
        assert_eq!(cache.poll_completed().len(), 1);
        assert_eq!(cache.status(&x), Some(FetchStatus::Ready));
    }

    #[test]
    fn mismatched_identifier_is_a_failure() {
        struct Liar;
        impl SeriesSource for Liar {
            fn name(&self) -> &str {
                "liar"
            }
            fn fetch_series(&self, _id: &Identifier, range: TimeRangeSpec) -> SeriesFuture {
                futures::future::ready(Ok(FetchResult {
                    identifier: Identifier::new("OTHER"),
                    requested_range: range,
                    data_points: Vec::new(),
                    metadata: SeriesMetadata::default(),
                }))
                .boxed_local()
            }
        }

        let mut cache = FetchCache::new(Rc::new(Liar), TimeRangeSpec::AllTime, 2024);
        let x = Identifier::new("X");
        cache.ensure(&x, TimeRangeSpec::AllTime);
        cache.poll_completed();
        assert!(matches!(
            cache.get(&x).unwrap().error(),
            Some(FetchError::IdentifierMismatch { .. })
        ));
    }

    #[test]
    fn next_completed_drains_in_flight() {
        let mut cache = FetchCache::new(static_source(), TimeRangeSpec::AllTime, 2024);
        cache.ensure(&"X".into(), TimeRangeSpec::AllTime);
        cache.ensure(&"BAD".into(), TimeRangeSpec::AllTime);

        let mut statuses = Vec::new();
        while let Some(done) = futures::executor::block_on(cache.next_completed()) {
            statuses.push(done.status);
        }
        statuses.sort_by_key(|s| *s == FetchStatus::Failed);
        assert_eq!(statuses, vec![FetchStatus::Ready, FetchStatus::Failed]);
        assert_eq!(cache.pending_count(), 0);
    }
}
