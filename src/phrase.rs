//! Exact phrase matching.
//!
//! Phrases are literal token sequences compared by identity of one text
//! attribute (`ORTH` by default, `LOWER`/`NORM`/... via
//! [`PhraseMatcher::with_attr`]). Every registered phrase becomes a path in a
//! trie keyed by [`StrId`]; nodes where a phrase ends carry the keys of the
//! rules that registered it.
//!
//! ```text
//! "Google Now"  ─┐          root
//! "Google"      ─┼──▶        └─ Google  [COMPANY]
//! "Google Maps" ─┘               ├─ Now   [PRODUCT]
//!                                └─ Maps  [PRODUCT]
//! ```
//!
//! Search walks the trie from every document offset and stops at the first
//! token with no child edge, so phrases sharing a prefix share the comparison
//! work.

use crate::api::{self, Callback, Match};
use crate::attrs::{AttrKey, AttrKind, TokenSource};
use crate::doc::Doc;
use crate::error::{MatcherError, Result};
use crate::strings::{StrId, StringStore};
use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
struct TrieNode {
    children: FxHashMap<StrId, usize>,
    /// Rule keys whose phrase ends here, in registration order.
    terminals: Vec<StrId>,
}

struct PhraseRule {
    phrases: Vec<Vec<StrId>>,
    on_match: Option<Callback>,
}

/// Registry of literal phrases.
pub struct PhraseMatcher {
    attr: AttrKey,
    strings: StringStore,
    nodes: Vec<TrieNode>,
    rules: FxHashMap<StrId, PhraseRule>,
}

impl std::fmt::Debug for PhraseMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhraseMatcher")
            .field("attr", &self.attr)
            .field("rules", &self.rules.len())
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

impl Default for PhraseMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PhraseMatcher {
    /// Phrase matcher comparing exact token text (`ORTH`).
    pub fn new() -> Self {
        PhraseMatcher {
            attr: AttrKey::Orth,
            strings: StringStore::new(),
            nodes: vec![TrieNode::default()],
            rules: FxHashMap::default(),
        }
    }

    /// Phrase matcher comparing another text attribute, e.g. `LOWER`.
    pub fn with_attr(attr: AttrKey) -> Result<Self> {
        if attr.kind() != AttrKind::Text {
            return Err(MatcherError::invalid(format!("phrase matching needs a text attribute, got {attr}")));
        }
        Ok(PhraseMatcher { attr, ..Self::new() })
    }

    pub fn attr(&self) -> AttrKey {
        self.attr
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.rules.contains_key(&StrId::of(key))
    }

    pub fn key_name(&self, id: StrId) -> Option<&str> {
        self.rules.get(&id).and_then(|_| self.strings.get(id))
    }

    /// Register `phrases` under `key`. Re-adding a key appends phrases and
    /// replaces the callback. On error nothing is registered.
    pub fn add<'p, D, I>(&mut self, key: &str, on_match: Option<Callback>, phrases: I) -> Result<()>
    where
        D: TokenSource + ?Sized + 'p,
        I: IntoIterator<Item = &'p D>,
    {
        let sequences = phrases.into_iter().map(|doc| self.sequence(doc)).collect::<Result<Vec<_>>>()?;
        if sequences.is_empty() {
            return Err(MatcherError::invalid(format!("no phrases given for '{key}'")));
        }

        let id = self.strings.add(key);
        for sequence in &sequences {
            self.insert(sequence, id);
        }
        let added = sequences.len();
        let rule = self.rules.entry(id).or_insert_with(|| PhraseRule { phrases: Vec::new(), on_match: None });
        rule.phrases.extend(sequences);
        rule.on_match = on_match;
        tracing::debug!(key, added, attr = %self.attr, "added phrases");
        Ok(())
    }

    /// Remove the phrases registered under `key`.
    pub fn remove(&mut self, key: &str) -> Result<()> {
        let id = StrId::of(key);
        if self.rules.remove(&id).is_none() {
            return Err(MatcherError::NotFound { key: key.to_string() });
        }
        // Edges stay; a path without terminals is never reported.
        for node in &mut self.nodes {
            node.terminals.retain(|&k| k != id);
        }
        tracing::debug!(key, "removed phrases");
        Ok(())
    }

    /// Callback and phrase hash sequences registered under `key`.
    pub fn get(&self, key: &str) -> Result<(Option<&Callback>, &[Vec<StrId>])> {
        let rule =
            self.rules.get(&StrId::of(key)).ok_or_else(|| MatcherError::NotFound { key: key.to_string() })?;
        Ok((rule.on_match.as_ref(), &rule.phrases))
    }

    /// Find every phrase occurrence, ordered by `(start, end)`.
    pub fn find<D: TokenSource + ?Sized>(&self, doc: &D) -> Vec<Match> {
        let n = doc.len();
        let mut matches = Vec::new();
        for start in 0..n {
            let mut node = 0;
            for pos in start..n {
                let Some(id) = doc.attr(pos, self.attr).as_str_id() else {
                    break;
                };
                let Some(&child) = self.nodes[node].children.get(&id) else {
                    break;
                };
                node = child;
                for &key in &self.nodes[node].terminals {
                    matches.push(Match { key, start, end: pos + 1 });
                }
            }
        }
        // Already ordered by start then end; the sort keeps that explicit.
        matches.sort_by_key(|m| (m.start, m.end));
        tracing::debug!(tokens = n, matches = matches.len(), "phrase search finished");
        matches
    }

    /// Find, then fire callbacks in match order.
    pub fn run(&self, doc: &mut Doc) -> Result<Vec<Match>> {
        let matches = self.find(&*doc);
        api::dispatch(doc, &matches, |id| {
            let on_match = self.rules.get(&id)?.on_match.as_ref()?;
            Some((self.strings.get(id).unwrap_or("?"), on_match))
        })?;
        Ok(matches)
    }

    pub fn pipe<'d, I>(&self, docs: I) -> Result<Vec<Vec<Match>>>
    where
        I: IntoIterator<Item = &'d mut Doc>,
    {
        docs.into_iter().map(|doc| self.run(doc)).collect()
    }

    fn sequence<D: TokenSource + ?Sized>(&self, phrase: &D) -> Result<Vec<StrId>> {
        if phrase.is_empty() {
            return Err(MatcherError::invalid("phrase has no tokens"));
        }
        (0..phrase.len())
            .map(|i| {
                phrase
                    .attr(i, self.attr)
                    .as_str_id()
                    .ok_or_else(|| MatcherError::invalid(format!("token {i} has no text value for {}", self.attr)))
            })
            .collect()
    }

    fn insert(&mut self, sequence: &[StrId], key: StrId) {
        let mut node = 0;
        for &id in sequence {
            node = match self.nodes[node].children.get(&id) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    self.nodes[node].children.insert(id, child);
                    child
                }
            };
        }
        let terminals = &mut self.nodes[node].terminals;
        if !terminals.contains(&key) {
            terminals.push(key);
        }
    }
}
