//! Dimension expansion: one column per breakdown code of a series.
//!
//! A series broken down by, say, sex carries per-period payloads like
//! `{"M": 7.9, "F": 8.1}`. Under expansion each code becomes its own
//! `Dimensional(id, code)` column. Codes are only ever added where they are
//! observed, so a code that appears in 2019 has no cells before 2019.

use super::timeline::Column;
use crate::data::{FetchResult, RawDataPoint, SeriesMetadata};
use crate::domain::{ColumnKey, Identifier};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which series get broken out into dimensional columns.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionPolicy {
    #[default]
    Never,
    Always,
    Only(BTreeSet<Identifier>),
}

impl ExpansionPolicy {
    pub fn applies_to(&self, id: &Identifier) -> bool {
        match self {
            Self::Never => false,
            Self::Always => true,
            Self::Only(ids) => ids.contains(id),
        }
    }
}

/// Expansion policy plus the label cache for dimension codes.
///
/// Labels are resolved from the series metadata the first time a code is
/// observed and kept from then on, even if later fetches carry different
/// metadata.
#[derive(Debug, Clone, Default)]
pub struct DimensionExpander {
    policy: ExpansionPolicy,
    labels: IndexMap<Identifier, IndexMap<String, String>>,
}

impl DimensionExpander {
    pub fn new(policy: ExpansionPolicy) -> Self {
        Self {
            policy,
            labels: IndexMap::new(),
        }
    }

    pub fn policy(&self) -> &ExpansionPolicy {
        &self.policy
    }

    pub fn set_policy(&mut self, policy: ExpansionPolicy) {
        self.policy = policy;
    }

    pub fn expands(&self, id: &Identifier) -> bool {
        self.policy.applies_to(id)
    }

    /// Record labels for every breakdown code in `result` not seen before.
    /// Returns how many codes were new.
    pub fn observe(&mut self, result: &FetchResult) -> usize {
        let known = self.labels.entry(result.identifier.clone()).or_default();
        let mut added = 0;
        for code in result.data_points.iter().flat_map(|p| p.breakdown.keys()) {
            if known.contains_key(code) {
                continue;
            }
            let label = result
                .metadata
                .dimension_labels
                .get(code)
                .cloned()
                .unwrap_or_else(|| code.clone());
            known.insert(code.clone(), label);
            added += 1;
        }
        added
    }

    /// Cached label for a dimension code.
    pub fn label(&self, id: &Identifier, code: &str) -> Option<&str> {
        self.labels
            .get(id)
            .and_then(|codes| codes.get(code))
            .map(String::as_str)
    }

    /// All codes observed for `id`, in first-seen order.
    pub fn observed_codes(&self, id: &Identifier) -> Vec<&str> {
        self.labels
            .get(id)
            .map(|codes| codes.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Flatten one point into `(column, value)` cells.
    ///
    /// The scalar value always feeds the plain column. Under expansion each
    /// breakdown code feeds its dimensional column, and a null scalar next
    /// to a breakdown is dropped rather than emitted as an empty plain cell.
    pub fn cells(&self, id: &Identifier, point: &RawDataPoint) -> Vec<(ColumnKey, Option<f64>)> {
        let expand = self.expands(id) && !point.breakdown.is_empty();
        let mut cells = Vec::with_capacity(1 + point.breakdown.len());

        if !expand || point.value.is_some() {
            cells.push((ColumnKey::Plain(id.clone()), point.value));
        }
        if expand {
            cells.extend(point.breakdown.iter().map(|(code, value)| {
                (ColumnKey::Dimensional(id.clone(), code.clone()), *value)
            }));
        }
        cells
    }

    /// Describe a column for the timeline header list.
    pub fn describe(&self, key: &ColumnKey, metadata: &SeriesMetadata) -> Column {
        let dimension_label = key.dimension().map(|code| {
            self.label(key.identifier(), code)
                .or_else(|| metadata.dimension_labels.get(code).map(String::as_str))
                .unwrap_or(code)
                .to_string()
        });
        Column {
            key: key.clone(),
            series_name: metadata.display_name.clone(),
            dimension_label,
        }
    }
}
