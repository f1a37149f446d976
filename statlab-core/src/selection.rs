//! Bounded, ordered selection of series identifiers.
//!
//! Order is insertion order and never changes for surviving members, so a
//! member's index can drive stable legend/colour assignment.

use crate::domain::Identifier;
use thiserror::Error;

/// Default cap on simultaneously selected series.
pub const DEFAULT_SELECTION_LIMIT: usize = 5;

/// Soft rejection: adding would grow the selection past its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("selection limit reached ({limit} series max)")]
pub struct SelectionLimitExceeded {
    pub limit: usize,
}

/// What a successful `toggle` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSet {
    ids: Vec<Identifier>,
    limit: usize,
}

impl SelectionSet {
    /// Empty selection holding at most `limit` identifiers (at least one).
    pub fn new(limit: usize) -> Self {
        Self {
            ids: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Remove `id` if present, otherwise append it if there is room.
    ///
    /// A full selection is left untouched and the rejection is returned.
    pub fn toggle(&mut self, id: &Identifier) -> Result<Toggle, SelectionLimitExceeded> {
        if let Some(pos) = self.index_of(id) {
            self.ids.remove(pos);
            return Ok(Toggle::Removed);
        }
        if self.ids.len() >= self.limit {
            return Err(SelectionLimitExceeded { limit: self.limit });
        }
        self.ids.push(id.clone());
        Ok(Toggle::Added)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.ids.contains(id)
    }

    /// Position of `id` in selection order.
    pub fn index_of(&self, id: &Identifier) -> Option<usize> {
        self.ids.iter().position(|i| i == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Identifier> {
        self.ids.iter()
    }

    pub fn as_slice(&self) -> &[Identifier] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.ids.len() >= self.limit
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for SelectionSet {
    fn default() -> Self {
        Self::new(DEFAULT_SELECTION_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Identifier> {
        (0..n).map(|i| Identifier::new(format!("S{i}"))).collect()
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut sel = SelectionSet::default();
        let x = Identifier::new("X");
        assert_eq!(sel.toggle(&x), Ok(Toggle::Added));
        assert!(sel.contains(&x));
        assert_eq!(sel.toggle(&x), Ok(Toggle::Removed));
        assert!(sel.is_empty());
    }

    #[test]
    fn rejects_past_limit_and_leaves_set_unchanged() {
        let mut sel = SelectionSet::new(5);
        for id in ids(5) {
            sel.toggle(&id).unwrap();
        }
        let before = sel.clone();
        let err = sel.toggle(&Identifier::new("SIXTH")).unwrap_err();
        assert_eq!(err, SelectionLimitExceeded { limit: 5 });
        assert_eq!(sel, before);
    }

    #[test]
    fn removing_from_full_set_is_allowed() {
        let mut sel = SelectionSet::new(2);
        let all = ids(2);
        for id in &all {
            sel.toggle(id).unwrap();
        }
        assert!(sel.is_full());
        assert_eq!(sel.toggle(&all[0]), Ok(Toggle::Removed));
        assert_eq!(sel.len(), 1);
    }

    #[test]
    fn order_is_preserved_across_removals() {
        let mut sel = SelectionSet::default();
        let all = ids(4);
        for id in &all {
            sel.toggle(id).unwrap();
        }
        sel.toggle(&all[1]).unwrap();
        let order: Vec<&str> = sel.iter().map(Identifier::as_str).collect();
        assert_eq!(order, vec!["S0", "S2", "S3"]);
        assert_eq!(sel.index_of(&all[3]), Some(2));
    }

    #[test]
    fn zero_limit_is_clamped() {
        let mut sel = SelectionSet::new(0);
        assert_eq!(sel.limit(), 1);
        assert!(sel.toggle(&Identifier::new("X")).is_ok());
    }

    #[test]
    fn clear_empties() {
        let mut sel = SelectionSet::default();
        for id in ids(3) {
            sel.toggle(&id).unwrap();
        }
        sel.clear();
        assert!(sel.is_empty());
    }
}
