//! String interning.
//!
//! Text-valued token attributes (`ORTH`, `LOWER`, ...) and rule keys are
//! compared by identity, never by content. A [`StrId`] is a deterministic
//! 64-bit hash of the string, so two independent stores (the one owned by a
//! `Matcher` and the one owned by a `Doc`) agree on identities without sharing
//! state. The store itself only exists to map an id back to its text.
//!
//! ```text
//! "Google" ──hash──▶ StrId(0x3f..)  ◀──hash── "Google"
//!    (pattern side)                      (document side)
//! ```

use rustc_hash::{FxHashMap, FxHasher};
use std::hash::Hasher;

/// Stable identity of an interned string. `StrId::EMPTY` is the empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, serde::Serialize)]
pub struct StrId(u64);

impl StrId {
    pub const EMPTY: StrId = StrId(0);

    /// Identity of `text`, without interning it.
    pub fn of(text: &str) -> StrId {
        if text.is_empty() {
            return StrId::EMPTY;
        }
        let mut hasher = FxHasher::default();
        hasher.write(text.as_bytes());
        // Keep 0 reserved for the empty string.
        StrId(hasher.finish().max(1))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Bidirectional map between strings and their [`StrId`]s.
#[derive(Debug, Clone, Default)]
pub struct StringStore {
    texts: FxHashMap<StrId, Box<str>>,
}

impl StringStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text` and return its id.
    pub fn add(&mut self, text: &str) -> StrId {
        let id = StrId::of(text);
        if id != StrId::EMPTY {
            self.texts.entry(id).or_insert_with(|| text.into());
        }
        id
    }

    /// Text for `id`, if it was interned here. The empty id always resolves.
    pub fn get(&self, id: StrId) -> Option<&str> {
        if id == StrId::EMPTY {
            return Some("");
        }
        self.texts.get(&id).map(|s| &**s)
    }

    pub fn contains(&self, text: &str) -> bool {
        let id = StrId::of(text);
        id == StrId::EMPTY || self.texts.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}
