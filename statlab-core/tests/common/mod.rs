//! Shared helpers for integration tests.

#![allow(dead_code)]

use futures::channel::oneshot;
use futures::future::FutureExt;
use std::cell::RefCell;
use statlab_core::data::{SeriesFuture, SeriesSource};
use statlab_core::{FetchError, FetchResult, Identifier, RawDataPoint, SeriesMetadata, TimeRangeSpec};

type Reply = oneshot::Sender<Result<FetchResult, FetchError>>;

/// A fetch the test has not answered yet.
pub struct Outstanding {
    pub identifier: Identifier,
    pub range: TimeRangeSpec,
    reply: Reply,
}

/// Source whose fetches stay pending until the test answers them, in
/// whatever order it likes.
#[derive(Default)]
pub struct ManualSource {
    outstanding: RefCell<Vec<Outstanding>>,
    issued: RefCell<Vec<(Identifier, TimeRangeSpec)>>,
}

impl ManualSource {
    /// Every fetch ever issued, in issue order.
    pub fn issued(&self) -> Vec<(Identifier, TimeRangeSpec)> {
        self.issued.borrow().clone()
    }

    pub fn issued_count(&self) -> usize {
        self.issued.borrow().len()
    }

    pub fn outstanding_count(&self) -> usize {
        self.outstanding.borrow().len()
    }

    /// Answer the oldest outstanding fetch for `id`.
    pub fn answer(&self, id: &str, outcome: Result<Vec<RawDataPoint>, FetchError>) {
        let pending = {
            let mut outstanding = self.outstanding.borrow_mut();
            let pos = outstanding
                .iter()
                .position(|o| o.identifier.as_str() == id)
                .unwrap_or_else(|| panic!("no outstanding fetch for {id}"));
            outstanding.remove(pos)
        };
        let result = outcome.map(|points| FetchResult {
            identifier: pending.identifier.clone(),
            requested_range: pending.range,
            data_points: points,
            metadata: SeriesMetadata::named(format!("Series {id}")),
        });
        let _ = pending.reply.send(result);
    }
}

impl SeriesSource for ManualSource {
    fn name(&self) -> &str {
        "manual"
    }

    fn fetch_series(&self, identifier: &Identifier, range: TimeRangeSpec) -> SeriesFuture {
        let (tx, rx) = oneshot::channel();
        self.issued.borrow_mut().push((identifier.clone(), range));
        self.outstanding.borrow_mut().push(Outstanding {
            identifier: identifier.clone(),
            range,
            reply: tx,
        });
        rx.map(|r| r.unwrap_or_else(|_| Err(FetchError::Other("request dropped".into()))))
            .boxed_local()
    }
}

pub fn monthly(year: i32, month: u8, value: f64) -> RawDataPoint {
    RawDataPoint::new(
        year,
        format!("M{month:02}"),
        format!("{year}-{month:02}"),
        Some(value),
    )
}
