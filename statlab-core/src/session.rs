//! Page-session store.
//!
//! One explicit object owns the selection, the fetch cache, the dimension
//! label cache and the active range. It is mutated only through `toggle`,
//! `set_range`, `clear`, `clear_cache`, `refresh`, `set_expansion` and by
//! recording finished fetches. The aligned timeline is derived on demand
//! from the current state and memoized until the next mutation.

use crate::compose::{compose, AlignedTimeline, DimensionExpander, ExpansionPolicy};
use crate::config::CompositorConfig;
use crate::data::{CacheEntry, EnsureOutcome, FetchCache, FetchStatus, SeriesSource, Settled};
use crate::domain::{Identifier, TimeRangeSpec};
use crate::selection::{SelectionLimitExceeded, SelectionSet, Toggle};
use crate::view::{to_chart_series, to_table, ChartSeries, Table};
use log::{info, warn};
use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

/// What the UI shows next to a selected identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesState {
    /// No fetch for the active range yet.
    Idle,
    Pending,
    Ready { points: usize },
    /// Resolved, but with no data points in range.
    Empty,
    Failed(String),
}

impl SeriesState {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for SeriesState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Pending => write!(f, "loading"),
            Self::Ready { points } => write!(f, "ready ({points} points)"),
            Self::Empty => write!(f, "no data in range"),
            Self::Failed(message) => write!(f, "failed: {message}"),
        }
    }
}

/// One selected identifier with its current status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEntry {
    /// Position in selection order.
    pub index: usize,
    pub identifier: Identifier,
    /// Series display name, once its data is ready.
    pub display_name: Option<String>,
    pub state: SeriesState,
}

pub struct SeriesSession {
    selection: SelectionSet,
    cache: FetchCache,
    expander: DimensionExpander,
    range: TimeRangeSpec,
    missing_token: String,
    timeline: OnceCell<AlignedTimeline>,
}

impl SeriesSession {
    pub fn new(source: Rc<dyn SeriesSource>, config: &CompositorConfig) -> Self {
        let range = config.default_range;
        Self {
            selection: SelectionSet::new(config.max_selection),
            cache: FetchCache::new(source, range, config.resolved_reference_year()),
            expander: DimensionExpander::new(config.expansion.clone()),
            range,
            missing_token: config.missing_token.clone(),
            timeline: OnceCell::new(),
        }
    }

    // ── Inputs ───────────────────────────────────────────────────────

    /// Select or deselect `id`. Selecting starts its fetch if needed; a full
    /// selection rejects the add and issues nothing.
    pub fn toggle(&mut self, id: impl Into<Identifier>) -> Result<Toggle, SelectionLimitExceeded> {
        let id = id.into();
        let toggled = self.selection.toggle(&id).map_err(|e| {
            warn!("cannot select {id}: {e}");
            e
        })?;
        if toggled == Toggle::Added {
            self.cache.ensure(&id, self.range);
        }
        self.touch();
        Ok(toggled)
    }

    /// Switch the time range. Every cached entry for another range is
    /// dropped and every selected series is refetched. Returns false when
    /// the range is unchanged.
    pub fn set_range(&mut self, range: TimeRangeSpec) -> bool {
        if range == self.range {
            return false;
        }
        info!("time range {} -> {range}", self.range);
        self.range = range;
        self.cache.invalidate(range);
        self.ensure_selected();
        self.touch();
        true
    }

    /// Deselect everything. Cached results are kept for reuse.
    pub fn clear(&mut self) {
        self.selection.clear();
        self.touch();
    }

    /// Drop every cached result and refetch the current selection.
    pub fn clear_cache(&mut self) {
        self.cache.invalidate_all();
        self.ensure_selected();
        self.touch();
    }

    /// Re-ensure every selected series; this is how failed ones are
    /// retried. Returns the number of fetches issued.
    pub fn refresh(&mut self) -> usize {
        let issued = self.ensure_selected();
        if issued > 0 {
            self.touch();
        }
        issued
    }

    pub fn set_expansion(&mut self, policy: ExpansionPolicy) {
        self.expander.set_policy(policy);
        self.touch();
    }

    // ── Driving fetches ──────────────────────────────────────────────

    /// Record every fetch that has already finished.
    pub fn poll_fetches(&mut self) -> Vec<Settled> {
        let settled = self.cache.poll_completed();
        for done in &settled {
            self.record(done);
        }
        if !settled.is_empty() {
            self.touch();
        }
        settled
    }

    /// Wait for every outstanding fetch and record it. Returns the number
    /// of fetches recorded.
    pub async fn settle(&mut self) -> usize {
        let mut recorded = 0;
        while let Some(done) = self.cache.next_completed().await {
            self.record(&done);
            self.touch();
            recorded += 1;
        }
        recorded
    }

    /// True once nothing is in flight.
    pub fn is_settled(&self) -> bool {
        !self.cache.has_in_flight()
    }

    // ── Outputs ──────────────────────────────────────────────────────

    /// The aligned timeline for the current selection and cache state.
    pub fn timeline(&self) -> &AlignedTimeline {
        self.timeline.get_or_init(|| {
            let ready = self
                .selection
                .iter()
                .filter_map(|id| self.cache.get_for(id, self.range))
                .filter_map(CacheEntry::result);
            compose(ready, &self.expander)
        })
    }

    /// Selected identifiers in order, with per-identifier status.
    pub fn selection_snapshot(&self) -> Vec<SelectionEntry> {
        self.selection
            .iter()
            .enumerate()
            .map(|(index, id)| {
                let entry = self.cache.get_for(id, self.range);
                SelectionEntry {
                    index,
                    identifier: id.clone(),
                    display_name: entry
                        .and_then(CacheEntry::result)
                        .map(|r| r.metadata.display_name.clone()),
                    state: entry.map_or(SeriesState::Idle, state_of),
                }
            })
            .collect()
    }

    /// Every timeline column as a chart series.
    pub fn chart_series(&self) -> Vec<ChartSeries> {
        let timeline = self.timeline();
        to_chart_series(timeline, &timeline.column_keys())
    }

    /// Every timeline column as a table, using the configured missing token.
    pub fn table(&self) -> Table {
        let timeline = self.timeline();
        to_table(timeline, &timeline.column_keys()).with_missing_token(self.missing_token.clone())
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn cache(&self) -> &FetchCache {
        &self.cache
    }

    pub fn expander(&self) -> &DimensionExpander {
        &self.expander
    }

    pub fn range(&self) -> TimeRangeSpec {
        self.range
    }

    // ── Internals ────────────────────────────────────────────────────

    fn ensure_selected(&mut self) -> usize {
        let range = self.range;
        let ids: Vec<Identifier> = self.selection.iter().cloned().collect();
        ids.iter()
            .filter(|id| self.cache.ensure(id, range) == EnsureOutcome::Issued)
            .count()
    }

    fn record(&mut self, done: &Settled) {
        if done.status != FetchStatus::Ready {
            return;
        }
        if let Some(result) = self
            .cache
            .get_for(&done.identifier, done.range)
            .and_then(CacheEntry::result)
        {
            self.expander.observe(result);
        }
    }

    /// Forget the memoized timeline.
    fn touch(&mut self) {
        self.timeline.take();
    }
}

fn state_of(entry: &CacheEntry) -> SeriesState {
    match entry.status() {
        FetchStatus::Pending => SeriesState::Pending,
        FetchStatus::Ready => match entry.result() {
            Some(result) if !result.is_empty() => SeriesState::Ready {
                points: result.data_points.len(),
            },
            _ => SeriesState::Empty,
        },
        FetchStatus::Failed => SeriesState::Failed(
            entry
                .error()
                .map(ToString::to_string)
                .unwrap_or_default(),
        ),
    }
}

impl fmt::Debug for SeriesSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeriesSession")
            .field("selection", &self.selection)
            .field("cache", &self.cache)
            .field("range", &self.range)
            .finish()
    }
}
