//! Rule registry and matcher facade.
//!
//! A [`Matcher`] owns named rules. Each rule is a key, one or more patterns
//! (alternatives, any of which may match) and an optional `on_match`
//! callback. Every mutation recompiles the shared automaton, so `find`/`run`
//! always see the current rule set.
//!
//! ```text
//! add("GoogleNow", None, [[{"ORTH": "Google"}, {"ORTH": "Now"}]])
//!     │ compile token descriptions (pattern.rs)
//!     │ append patterns to the rule, replace its callback
//!     └ rebuild CompiledRules (engine)
//!
//! run(doc) ── find(doc) ── Parser::run ──▶ sorted matches
//!          └─ on_match(doc, i, matches) for each match whose rule has one
//! ```

use crate::api::{self, Callback, Match, Options};
use crate::attrs::TokenSource;
use crate::doc::Doc;
use crate::engine::{CompiledRules, MatchKey, Parser, RunMetrics, RunResult};
use crate::error::{MatcherError, Result};
use crate::pattern::Pattern;
use crate::strings::{StrId, StringStore};
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::time::Instant;

struct Rule {
    key: StrId,
    patterns: Vec<Pattern>,
    on_match: Option<Callback>,
}

/// Registry of token-pattern rules.
pub struct Matcher {
    options: Options,
    strings: StringStore,
    /// Registration order; `RuleId`s in the compiled automaton index this.
    rules: Vec<Rule>,
    index: FxHashMap<StrId, usize>,
    compiled: CompiledRules,
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<&str> = self.rules.iter().map(|r| self.strings.get(r.key).unwrap_or("?")).collect();
        f.debug_struct("Matcher")
            .field("options", &self.options)
            .field("rules", &keys)
            .field("states", &self.compiled.state_count())
            .finish()
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        Matcher {
            options,
            strings: StringStore::new(),
            rules: Vec::new(),
            index: FxHashMap::default(),
            compiled: CompiledRules::default(),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Number of registered rule keys.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(&StrId::of(key))
    }

    /// Text of a rule key id, as found in [`Match::key`].
    pub fn key_name(&self, id: StrId) -> Option<&str> {
        self.index.get(&id).and_then(|_| self.strings.get(id))
    }

    /// Register `patterns` under `key`.
    ///
    /// Each pattern is a JSON array of token descriptions, e.g. built with
    /// `pattern!`. If `key` already exists its patterns are
    /// extended and its callback replaced by `on_match` (which may be `None`).
    /// On error nothing is registered.
    pub fn add(&mut self, key: &str, on_match: Option<Callback>, patterns: &[Value]) -> Result<()> {
        if patterns.is_empty() {
            return Err(MatcherError::invalid(format!("no patterns given for '{key}'")));
        }
        let compiled = patterns
            .iter()
            .map(|p| Pattern::from_json(p, self.options.unknown_attributes))
            .collect::<Result<Vec<_>>>()?;
        self.add_patterns(key, on_match, compiled)
    }

    /// Register already-compiled patterns under `key`. Same semantics as [`Matcher::add`].
    pub fn add_patterns(&mut self, key: &str, on_match: Option<Callback>, patterns: Vec<Pattern>) -> Result<()> {
        if patterns.is_empty() {
            return Err(MatcherError::invalid(format!("no patterns given for '{key}'")));
        }
        if let Some(empty) = patterns.iter().position(Pattern::is_empty) {
            return Err(MatcherError::invalid(format!("pattern {empty} for '{key}' is empty")));
        }

        let id = self.strings.add(key);
        let added = patterns.len();
        match self.index.get(&id) {
            Some(&slot) => {
                let rule = &mut self.rules[slot];
                rule.patterns.extend(patterns);
                rule.on_match = on_match;
            }
            None => {
                self.index.insert(id, self.rules.len());
                self.rules.push(Rule { key: id, patterns, on_match });
            }
        }
        tracing::debug!(key, added, rules = self.rules.len(), "added patterns");
        self.recompile();
        Ok(())
    }

    /// Remove the rule registered under `key`.
    pub fn remove(&mut self, key: &str) -> Result<()> {
        let id = StrId::of(key);
        let Some(slot) = self.index.remove(&id) else {
            return Err(MatcherError::NotFound { key: key.to_string() });
        };
        self.rules.remove(slot);
        for rule_slot in self.index.values_mut() {
            if *rule_slot > slot {
                *rule_slot -= 1;
            }
        }
        tracing::debug!(key, rules = self.rules.len(), "removed rule");
        self.recompile();
        Ok(())
    }

    /// Callback and patterns registered under `key`.
    pub fn get(&self, key: &str) -> Result<(Option<&Callback>, &[Pattern])> {
        let rule = self
            .index
            .get(&StrId::of(key))
            .map(|&slot| &self.rules[slot])
            .ok_or_else(|| MatcherError::NotFound { key: key.to_string() })?;
        Ok((rule.on_match.as_ref(), &rule.patterns))
    }

    /// Match every rule against `doc` without firing callbacks.
    ///
    /// Pure: safe to call concurrently on independent documents.
    pub fn find<D: TokenSource + ?Sized>(&self, doc: &D) -> Vec<Match> {
        let keys = Parser::new(doc, &self.compiled, &self.options).run();
        self.to_matches(keys)
    }

    /// Match, then fire `on_match` callbacks in match order.
    ///
    /// A callback error stops the remaining callbacks and is returned;
    /// effects of callbacks that already ran are kept.
    pub fn run(&self, doc: &mut Doc) -> Result<Vec<Match>> {
        let matches = self.find(&*doc);
        self.dispatch(doc, &matches)?;
        Ok(matches)
    }

    /// Same as [`Matcher::run`], with timings and simulation counters.
    pub fn run_with_metrics(&self, doc: &mut Doc) -> Result<RunResult> {
        let total_start = Instant::now();
        let (keys, simulation) = Parser::new(&*doc, &self.compiled, &self.options).run_with_metrics();
        let matches = self.to_matches(keys);

        let callbacks_start = Instant::now();
        self.dispatch(doc, &matches)?;
        let callbacks = callbacks_start.elapsed();

        Ok(RunResult { matches, metrics: RunMetrics { total: total_start.elapsed(), simulation, callbacks } })
    }

    /// Run over several documents in order. Stops at the first callback error.
    pub fn pipe<'d, I>(&self, docs: I) -> Result<Vec<Vec<Match>>>
    where
        I: IntoIterator<Item = &'d mut Doc>,
    {
        docs.into_iter().map(|doc| self.run(doc)).collect()
    }

    fn to_matches(&self, keys: Vec<MatchKey>) -> Vec<Match> {
        keys.into_iter()
            .map(|k| Match { key: self.compiled.keys[k.rule], start: k.start, end: k.end })
            .collect()
    }

    fn dispatch(&self, doc: &mut Doc, matches: &[Match]) -> Result<()> {
        api::dispatch(doc, matches, |id| {
            let rule = &self.rules[*self.index.get(&id)?];
            let on_match = rule.on_match.as_ref()?;
            Some((self.strings.get(id).unwrap_or("?"), on_match))
        })
    }

    fn recompile(&mut self) {
        self.compiled = CompiledRules::new(self.rules.iter().map(|r| (r.key, r.patterns.as_slice())));
    }
}
