//! Chart projection: one renderable series per column.

use super::column_title;
use crate::compose::AlignedTimeline;
use crate::domain::ColumnKey;
use serde::Serialize;

/// One x position of a chart series. `y: None` is a gap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: String,
    pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub key: ColumnKey,
    pub name: String,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    /// Contiguous runs of present values, for renderers that do not
    /// connect across gaps.
    pub fn segments(&self) -> Vec<&[ChartPoint]> {
        self.points
            .split(|p| p.y.is_none())
            .filter(|run| !run.is_empty())
            .collect()
    }

    /// Number of points carrying a value.
    pub fn value_count(&self) -> usize {
        self.points.iter().filter(|p| p.y.is_some()).count()
    }
}

/// Project `columns` of the timeline into chart series.
///
/// Every series spans every timeline row so all series share one x axis.
pub fn to_chart_series(timeline: &AlignedTimeline, columns: &[ColumnKey]) -> Vec<ChartSeries> {
    columns
        .iter()
        .map(|key| ChartSeries {
            key: key.clone(),
            name: column_title(timeline, key),
            points: timeline
                .rows()
                .iter()
                .map(|row| ChartPoint {
                    x: row.period_label.clone(),
                    y: row.get(key),
                })
                .collect(),
        })
        .collect()
}
