//! View projection: read-only transforms of an aligned timeline into chart
//! and table form. Column keys become display strings here and nowhere else.

pub mod chart;
pub mod table;

pub use chart::{to_chart_series, ChartPoint, ChartSeries};
pub use table::{to_table, Table, TableRow, MISSING_CELL};

use crate::compose::AlignedTimeline;
use crate::domain::ColumnKey;

/// Header text for a column.
///
/// Plain columns show the series name; dimensional ones append the
/// dimension label in parentheses. Columns the timeline does not know fall
/// back to their raw key parts.
pub fn column_title(timeline: &AlignedTimeline, key: &ColumnKey) -> String {
    match (timeline.column(key), key) {
        (Some(col), _) => match &col.dimension_label {
            Some(label) => format!("{} ({label})", col.series_name),
            None => col.series_name.clone(),
        },
        (None, ColumnKey::Plain(id)) => id.to_string(),
        (None, ColumnKey::Dimensional(id, code)) => format!("{id} ({code})"),
    }
}
