use serde::{Deserialize, Serialize};

use crate::combination::Combination;

/// Saved combinations for one session, in save order.
///
/// Never holds two combinations with the same triple.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCombinations {
    items: Vec<Combination>,
}

impl SavedCombinations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unless the triple is already saved. Returns whether it was added.
    pub fn save(&mut self, combination: &Combination) -> bool {
        if self.contains_triple(combination) {
            return false;
        }
        self.items.push(combination.clone());
        true
    }

    /// Remove by `created_at` key. Returns whether anything was removed.
    pub fn remove(&mut self, key: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|c| c.created_at != key);
        self.items.len() != before
    }

    pub fn contains_triple(&self, combination: &Combination) -> bool {
        self.items.iter().any(|c| c.same_triple(combination))
    }

    /// Fill in a late description on the saved copy of `combination`.
    ///
    /// Matches on key and triple: two rolls can share a millisecond.
    pub(crate) fn fill_description(&mut self, combination: &Combination, description: &str) {
        let matching = self
            .items
            .iter_mut()
            .filter(|c| c.created_at == combination.created_at && c.same_triple(combination));
        for item in matching {
            if item.description.is_none() {
                item.description = Some(description.to_string());
            }
        }
    }

    pub fn list(&self) -> &[Combination] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
