//! Multi-series period alignment.
//!
//! Given the ready fetch results of the selected series (in selection
//! order), merge them onto one timeline holding the union of their periods.
//! A series missing a period simply has no cell there: nothing is
//! zero-filled and nothing is forward-filled.

use super::expand::DimensionExpander;
use super::timeline::{AlignedRow, AlignedTimeline, Column};
use crate::data::FetchResult;
use crate::domain::{ColumnKey, PeriodCode, PeriodKey};
use indexmap::IndexMap;
use log::warn;

/// Merge ready results into an aligned timeline.
///
/// Pure: the output depends only on the results (and their order) and the
/// expander. Callers pass results in selection order, never arrival order,
/// so the timeline does not depend on which fetch finished first.
///
/// The first point seen for a period creates its row and fixes the row's
/// label. Null and non-finite values are never stored. Points whose period
/// code does not parse are skipped.
pub fn compose<'a, I>(ready: I, expander: &DimensionExpander) -> AlignedTimeline
where
    I: IntoIterator<Item = &'a FetchResult>,
{
    let mut rows: IndexMap<PeriodKey, AlignedRow> = IndexMap::new();
    let mut columns: IndexMap<ColumnKey, Column> = IndexMap::new();

    for result in ready {
        let id = &result.identifier;
        for point in &result.data_points {
            let code = match PeriodCode::parse(&point.period_code) {
                Ok(code) => code,
                Err(e) => {
                    warn!("skipping {id} point in {}: {e}", point.year);
                    continue;
                }
            };
            let period = PeriodKey::new(point.year, code);
            let row = rows
                .entry(period)
                .or_insert_with(|| AlignedRow::new(period, point.period_label.clone()));

            for (column, value) in expander.cells(id, point) {
                if !columns.contains_key(&column) {
                    let described = expander.describe(&column, &result.metadata);
                    columns.insert(column.clone(), described);
                }
                if let Some(v) = value.filter(|v| v.is_finite()) {
                    row.values.insert(column, v);
                }
            }
        }
    }

    let mut rows: Vec<AlignedRow> = rows.into_values().collect();
    // Stable: equal sort keys keep first-seen order.
    rows.sort_by_key(|r| r.sort_key);

    AlignedTimeline {
        columns: columns.into_values().collect(),
        rows,
    }
}
