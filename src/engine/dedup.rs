//! Deduplication of accepting windows.
//!
//! The simulation can reach the same accept state at the same offset through
//! several epsilon paths, and two patterns of one rule can accept the same
//! window. Both collapse to one entry here. Windows that differ in start or
//! end are always kept apart.
//!
//! `MatchKey` uses the internal `RuleId` (registration order) rather than the
//! rule's key so the final sort can break `(start, end)` ties deterministically.

use super::compiled_rules::RuleId;
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct MatchKey {
    pub(crate) rule: RuleId,
    pub(crate) start: usize,
    pub(crate) end: usize,
}

/// Insertion-ordered set of match keys.
#[derive(Debug, Default)]
pub(crate) struct MatchSet {
    seen: FxHashSet<MatchKey>,
    keys: Vec<MatchKey>,
}

impl MatchSet {
    /// Returns `false` when the window was already recorded.
    pub(crate) fn insert(&mut self, key: MatchKey) -> bool {
        if !self.seen.insert(key) {
            return false;
        }
        self.keys.push(key);
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    /// Keys ordered by `(start, end)`, ties by registration order.
    pub(crate) fn into_sorted(self) -> Vec<MatchKey> {
        let mut keys = self.keys;
        keys.sort_by_key(|k| (k.start, k.end, k.rule));
        keys
    }
}
