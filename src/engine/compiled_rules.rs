//! Pattern automaton builder.
//!
//! This module holds the *static* side of the engine: every registered
//! pattern compiled into one Thompson-style fragment, all fragments sharing a
//! single index-addressed state arena.
//!
//! Each `TokenSpec` becomes a small sub-graph with one entry and one exit.
//! Fragments are built back to front so every spec already knows the state
//! it continues into (`next`):
//!
//! ```text
//! 1 / !     entry = [C] ──────────────▶ next          (C consumes one token)
//!
//! ?         entry = (S) ──▶ [C] ──────▶ next
//!                    └───────────────▶ next
//!
//! +         entry = [C] ──▶ (S) ──────▶ next
//!                    ▲       │
//!                    └───────┘
//!
//! *         entry = (S) ──────────────▶ next
//!                   │  ▲
//!                   ▼  │
//!                   [C]
//! ```
//!
//! `(S)` is a non-consuming split, `[C]` a consuming state guarded by the
//! spec's constraint (inverted for `!`). The last spec continues into an
//! `Accept` state tagged with the owning rule and pattern.
//!
//! ## Invariants
//!
//! - `RuleId` is an index into `CompiledRules::keys`, in registration order.
//! - `StateId`s index `CompiledRules::states`; `SpecId`s index
//!   `CompiledRules::specs`. Nothing points outside the arena.
//! - There is no cycle made only of `Split` states: every loop passes through
//!   a consuming state.

use crate::attrs::{AttrKey, AttrValue};
use crate::pattern::{Constraint, Pattern, Quantifier};
use crate::strings::StrId;

/// Rule identifier (index into `CompiledRules::keys`).
pub(crate) type RuleId = usize;
pub(crate) type StateId = usize;
pub(crate) type SpecId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    /// Consumes one token if `specs[spec]` holds (or does not hold, when `negated`).
    Consume { spec: SpecId, negated: bool, out: StateId },
    /// Non-consuming fork.
    Split { out: StateId, out1: StateId },
    Accept { rule: RuleId, pattern: usize },
}

/// Entry point of one compiled pattern.
#[derive(Debug, Clone)]
pub(crate) struct Fragment {
    pub entry: StateId,
    pub rule: RuleId,
    pub pattern: usize,
    /// Text values that some token of every match must carry. Used by the
    /// trigger scan to skip fragments that cannot match a document.
    pub required: Vec<(AttrKey, StrId)>,
}

/// All registered patterns compiled into one automaton.
#[derive(Debug, Default)]
pub struct CompiledRules {
    pub(crate) states: Vec<State>,
    pub(crate) specs: Vec<Constraint>,
    pub(crate) fragments: Vec<Fragment>,
    pub(crate) keys: Vec<StrId>,
}

impl CompiledRules {
    /// Compile every pattern of every rule, in the given order.
    pub fn new<'a>(rules: impl IntoIterator<Item = (StrId, &'a [Pattern])>) -> Self {
        let mut compiled = CompiledRules::default();
        for (key, patterns) in rules {
            let rule = compiled.keys.len();
            compiled.keys.push(key);
            for (index, pattern) in patterns.iter().enumerate() {
                compiled.compile_pattern(rule, index, pattern);
            }
        }
        tracing::debug!(
            rules = compiled.keys.len(),
            fragments = compiled.fragments.len(),
            states = compiled.states.len(),
            "compiled rules"
        );
        compiled
    }

    pub fn rule_count(&self) -> usize {
        self.keys.len()
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    fn push(&mut self, state: State) -> StateId {
        self.states.push(state);
        self.states.len() - 1
    }

    fn compile_pattern(&mut self, rule: RuleId, index: usize, pattern: &Pattern) {
        let mut next = self.push(State::Accept { rule, pattern: index });
        let mut required = Vec::new();

        for spec in pattern.specs().iter().rev() {
            let id = self.specs.len();
            self.specs.push(spec.constraint.clone());

            if spec.quantifier.requires_match() {
                for &(key, value) in spec.constraint.checks() {
                    if let AttrValue::Str(text) = value {
                        required.push((key, text));
                    }
                }
            }

            next = match spec.quantifier {
                Quantifier::ExactlyOne => self.push(State::Consume { spec: id, negated: false, out: next }),
                Quantifier::NegatedOne => self.push(State::Consume { spec: id, negated: true, out: next }),
                Quantifier::ZeroOrOne => {
                    let consume = self.push(State::Consume { spec: id, negated: false, out: next });
                    self.push(State::Split { out: consume, out1: next })
                }
                Quantifier::OneOrMore => {
                    let consume = self.push(State::Consume { spec: id, negated: false, out: next });
                    let split = self.push(State::Split { out: consume, out1: next });
                    self.states[consume] = State::Consume { spec: id, negated: false, out: split };
                    consume
                }
                Quantifier::ZeroOrMore => {
                    let consume = self.push(State::Consume { spec: id, negated: false, out: next });
                    let split = self.push(State::Split { out: consume, out1: next });
                    self.states[consume] = State::Consume { spec: id, negated: false, out: split };
                    split
                }
            };
        }

        required.sort_unstable();
        required.dedup();
        self.fragments.push(Fragment { entry: next, rule, pattern: index, required });
    }
}
