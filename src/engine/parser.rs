//! NFA simulation.
//!
//! This module is the operational core of the engine: it runs the compiled
//! automaton (`compiled_rules.rs`) over a document and reports every
//! accepting window.
//!
//! ## Simulation
//!
//! For every start offset `s` the active set is re-seeded with the epsilon
//! closure of every admitted fragment entry, then advanced one token at a
//! time:
//!
//! ```text
//! s = 2          tokens:  I  like  Google  Now  best
//!                                  ^
//! offset 2  clist = closure(entries)         accept? no
//! offset 3  clist = step(clist, "Google")    accept? no
//! offset 4  clist = step(clist, "Now")       accept? GoogleNow -> (2, 4)
//! offset 5  clist = step(clist, "best")      empty -> next start
//! ```
//!
//! Every offset at which the active set holds an `Accept` state yields a
//! window, so trailing `+`/`*` produce one match per extra token. Zero-width
//! windows are never reported.
//!
//! ## Deduplication
//!
//! Within one step a state is added at most once (Cox-style `lastlist`
//! stamps, no per-step allocation). Across steps and patterns, windows are
//! collapsed per `(rule, start, end)` by `MatchSet` (`dedup.rs`).

use super::compiled_rules::{CompiledRules, State, StateId};
use super::dedup::{MatchKey, MatchSet};
use super::metrics::SimulationMetrics;
use super::trigger::TriggerInfo;
use crate::api::Options;
use crate::attrs::TokenSource;
use std::time::Instant;

/// Reusable buffers for epsilon closure.
///
/// `lastlist[state] == listid` means `state` is already in the list being
/// built. Bumping `listid` empties that membership test in O(1).
struct Threads {
    lastlist: Vec<u32>,
    listid: u32,
    stack: Vec<StateId>,
}

impl Threads {
    fn new(states: usize) -> Self {
        Threads { lastlist: vec![u32::MAX; states], listid: 0, stack: Vec::new() }
    }

    fn next_list(&mut self) {
        self.listid = self.listid.wrapping_add(1);
        if self.listid == u32::MAX {
            self.lastlist.fill(u32::MAX);
            self.listid = 0;
        }
    }

    /// Add `start` and everything reachable from it through `Split`s to
    /// `list`. Only `Consume` and `Accept` states are stored.
    fn add(&mut self, states: &[State], list: &mut Vec<StateId>, start: StateId) -> usize {
        let mut added = 0;
        self.stack.push(start);
        while let Some(id) = self.stack.pop() {
            if self.lastlist[id] == self.listid {
                continue;
            }
            self.lastlist[id] = self.listid;
            match states[id] {
                State::Split { out, out1 } => {
                    // Pushed in reverse so `out` is explored first.
                    self.stack.push(out1);
                    self.stack.push(out);
                }
                State::Consume { .. } | State::Accept { .. } => {
                    list.push(id);
                    added += 1;
                }
            }
        }
        added
    }
}

/// Runs a `CompiledRules` automaton over one document.
///
/// Usage: create with `Parser::new(doc, &compiled, &options)` then call `run`.
pub struct Parser<'a, D: TokenSource + ?Sized> {
    doc: &'a D,
    compiled: &'a CompiledRules,
    /// Entry states of the fragments admitted by the trigger scan.
    entries: Vec<StateId>,
}

impl<'a, D: TokenSource + ?Sized> Parser<'a, D> {
    pub fn new(doc: &'a D, compiled: &'a CompiledRules, options: &Options) -> Self {
        let entries: Vec<StateId> = if options.trigger_scan {
            let trigger = TriggerInfo::scan(doc, compiled);
            compiled.fragments.iter().filter(|f| trigger.admits(f)).map(|f| f.entry).collect()
        } else {
            compiled.fragments.iter().map(|f| f.entry).collect()
        };

        tracing::trace!(
            active = entries.len(),
            total = compiled.fragments.len(),
            tokens = doc.len(),
            "active fragments"
        );

        Parser { doc, compiled, entries }
    }

    /// Simulate from every start offset and return the deduplicated windows,
    /// ordered by `(start, end)` then registration order.
    pub(crate) fn run_with_metrics(self) -> (Vec<MatchKey>, SimulationMetrics) {
        let started = Instant::now();
        let states = &self.compiled.states;
        let n = self.doc.len();

        let mut metrics = SimulationMetrics {
            active_fragments: self.entries.len(),
            total_fragments: self.compiled.fragments.len(),
            ..SimulationMetrics::default()
        };
        let mut found = MatchSet::default();

        if self.entries.is_empty() || n == 0 {
            metrics.duration = started.elapsed();
            return (Vec::new(), metrics);
        }

        let mut threads = Threads::new(states.len());
        let mut clist: Vec<StateId> = Vec::with_capacity(states.len());
        let mut nlist: Vec<StateId> = Vec::with_capacity(states.len());

        for start in 0..n {
            metrics.starts += 1;
            threads.next_list();
            clist.clear();
            for &entry in &self.entries {
                metrics.states_visited += threads.add(states, &mut clist, entry);
            }

            let mut pos = start;
            loop {
                if pos > start {
                    for &id in &clist {
                        if let State::Accept { rule, .. } = states[id] {
                            metrics.accepts += 1;
                            found.insert(MatchKey { rule, start, end: pos });
                        }
                    }
                }
                if pos == n || clist.is_empty() {
                    break;
                }

                threads.next_list();
                nlist.clear();
                for &id in &clist {
                    if let State::Consume { spec, negated, out } = states[id] {
                        if self.compiled.specs[spec].holds(self.doc, pos) != negated {
                            metrics.states_visited += threads.add(states, &mut nlist, out);
                        }
                    }
                }
                std::mem::swap(&mut clist, &mut nlist);
                metrics.steps += 1;
                pos += 1;
            }
        }

        metrics.duration = started.elapsed();
        tracing::debug!(
            tokens = n,
            matches = found.len(),
            steps = metrics.steps,
            elapsed = ?metrics.duration,
            "simulation finished"
        );
        (found.into_sorted(), metrics)
    }

    pub(crate) fn run(self) -> Vec<MatchKey> {
        self.run_with_metrics().0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::UnknownAttributePolicy;
    use crate::doc::Doc;
    use crate::pattern::Pattern;
    use crate::strings::StrId;
    use serde_json::{Value, json};

    fn windows(patterns: &[Value], text: &str) -> Vec<(usize, usize)> {
        let patterns: Vec<Pattern> =
            patterns.iter().map(|p| Pattern::from_json(p, UnknownAttributePolicy::Error).unwrap()).collect();
        let compiled = CompiledRules::new([(StrId::of("R"), patterns.as_slice())]);
        let doc = Doc::from_text(text);
        Parser::new(&doc, &compiled, &Options::default()).run().into_iter().map(|k| (k.start, k.end)).collect()
    }

    #[test]
    fn fixed_sequence_matches_every_start() {
        let p = json!([{"ORTH": "a"}, {"ORTH": "b"}]);
        assert_eq!(windows(&[p], "a b a b a"), vec![(0, 2), (2, 4)]);
    }

    #[test]
    fn trailing_star_yields_one_window_per_token() {
        let p = json!([{"ORTH": "a"}, {"ORTH": "b", "OP": "*"}]);
        assert_eq!(windows(&[p.clone()], "a b b c"), vec![(0, 1), (0, 2), (0, 3)]);
        assert_eq!(windows(&[p.clone()], "a"), vec![(0, 1)]);
        assert_eq!(windows(&[p], "a c"), vec![(0, 1)]);
    }

    #[test]
    fn leading_plus_reports_each_start() {
        let p = json!([{"ORTH": "a", "OP": "+"}, {"ORTH": "b"}]);
        assert_eq!(windows(&[p], "a a b"), vec![(0, 3), (1, 3)]);
    }

    #[test]
    fn optional_token() {
        let p = json!([{"ORTH": "a"}, {"ORTH": "b", "OP": "?"}, {"ORTH": "c"}]);
        assert_eq!(windows(&[p.clone()], "a c"), vec![(0, 2)]);
        assert_eq!(windows(&[p.clone()], "a b c"), vec![(0, 3)]);
        assert_eq!(windows(&[p], "a b b c"), Vec::<(usize, usize)>::new());
    }

    #[test]
    fn negation_consumes_exactly_one() {
        let p = json!([{"ORTH": "a"}, {"ORTH": "x", "OP": "!"}]);
        assert_eq!(windows(&[p.clone()], "a b"), vec![(0, 2)]);
        assert_eq!(windows(&[p.clone()], "a x"), Vec::<(usize, usize)>::new());
        assert_eq!(windows(&[p], "a"), Vec::<(usize, usize)>::new());
    }

    #[test]
    fn all_optional_pattern_never_reports_empty_windows() {
        let p = json!([{"ORTH": "a", "OP": "*"}]);
        assert_eq!(windows(&[p], "b a a"), vec![(1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn two_patterns_same_window_collapse() {
        let p1 = json!([{"ORTH": "a"}, {"ORTH": "b"}]);
        let p2 = json!([{"LOWER": "a"}, {}]);
        assert_eq!(windows(&[p1, p2], "a b"), vec![(0, 2)]);
    }

    #[test]
    fn overlapping_windows_from_two_patterns_are_kept() {
        let p1 = json!([{"ORTH": "a"}, {"ORTH": "b"}]);
        let p2 = json!([{"ORTH": "b"}, {"ORTH": "c"}]);
        assert_eq!(windows(&[p1, p2], "a b c"), vec![(0, 2), (1, 3)]);
    }

    #[test]
    fn metrics_count_work() {
        let patterns = [Pattern::from_json(&json!([{"ORTH": "a"}]), UnknownAttributePolicy::Error).unwrap()];
        let compiled = CompiledRules::new([(StrId::of("R"), &patterns[..])]);
        let doc = Doc::from_text("a b a");
        let (keys, metrics) = Parser::new(&doc, &compiled, &Options::default()).run_with_metrics();
        assert_eq!(keys.len(), 2);
        assert_eq!(metrics.starts, 3);
        assert_eq!(metrics.active_fragments, 1);
        assert_eq!(metrics.accepts, 2);

        let doc = Doc::from_text("b b");
        let (keys, metrics) = Parser::new(&doc, &compiled, &Options::default()).run_with_metrics();
        assert!(keys.is_empty());
        assert_eq!(metrics.active_fragments, 0);
        assert_eq!(metrics.starts, 0);
    }
}
