//! Trigger scanning (document pre-classification).
//!
//! Before simulating, the parser scans the document once and records which
//! literal text values occur in it, restricted to the attribute keys that some
//! fragment requires (typically `ORTH` and `LOWER`).
//!
//! A fragment whose `required` list names a value that does not occur
//! anywhere in the document cannot accept, so it is left out of the start
//! set. This is purely an optimization: a fragment with no requirements is
//! always active, and the scan never causes a false negative.

use super::compiled_rules::{CompiledRules, Fragment};
use crate::attrs::{AttrKey, AttrValue, TokenSource};
use crate::strings::StrId;
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Default)]
pub struct TriggerInfo {
    present: FxHashSet<(AttrKey, StrId)>,
}

impl TriggerInfo {
    /// Scan `doc` for the values of every attribute key `compiled` cares about.
    pub fn scan<D: TokenSource + ?Sized>(doc: &D, compiled: &CompiledRules) -> Self {
        let mut keys: Vec<AttrKey> =
            compiled.fragments.iter().flat_map(|f| f.required.iter().map(|&(key, _)| key)).collect();
        keys.sort_unstable();
        keys.dedup();

        let mut present = FxHashSet::default();
        for index in 0..doc.len() {
            for &key in &keys {
                if let AttrValue::Str(id) = doc.attr(index, key) {
                    present.insert((key, id));
                }
            }
        }
        TriggerInfo { present }
    }

    pub(crate) fn admits(&self, fragment: &Fragment) -> bool {
        fragment.required.iter().all(|pair| self.present.contains(pair))
    }
}
