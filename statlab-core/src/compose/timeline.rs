//! Output types of the compositor.

use crate::domain::{ColumnKey, PeriodKey};
use serde::Serialize;
use std::collections::BTreeMap;

/// A column that contributed to a timeline, with the raw pieces of its
/// display name. Formatting those pieces into a header is a view concern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub key: ColumnKey,
    /// Display name of the owning series, from its fetch metadata.
    pub series_name: String,
    /// Label of the dimension value, for dimensional columns.
    pub dimension_label: Option<String>,
}

/// One period of the merged timeline.
///
/// A column missing from `values` means "no data for this period", which is
/// not the same thing as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    pub period_key: PeriodKey,
    pub period_label: String,
    pub sort_key: i64,
    pub values: BTreeMap<ColumnKey, f64>,
}

impl AlignedRow {
    pub fn new(period_key: PeriodKey, period_label: impl Into<String>) -> Self {
        Self {
            period_key,
            period_label: period_label.into(),
            sort_key: period_key.sort_key(),
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, column: &ColumnKey) -> Option<f64> {
        self.values.get(column).copied()
    }
}

/// Chronologically ordered union of every period of every ready, selected
/// series. Never mutated; rebuilt whenever its inputs change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedTimeline {
    pub(crate) columns: Vec<Column>,
    pub(crate) rows: Vec<AlignedRow>,
}

impl AlignedTimeline {
    pub fn rows(&self) -> &[AlignedRow] {
        &self.rows
    }

    /// Contributing columns: selection order, then dimension codes in the
    /// order they were first seen.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_keys(&self) -> Vec<ColumnKey> {
        self.columns.iter().map(|c| c.key.clone()).collect()
    }

    pub fn column(&self, key: &ColumnKey) -> Option<&Column> {
        self.columns.iter().find(|c| &c.key == key)
    }

    pub fn row(&self, period: &PeriodKey) -> Option<&AlignedRow> {
        self.rows.iter().find(|r| &r.period_key == period)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
