//! Predicate compiler.
//!
//! Turns a token description such as
//!
//! ```text
//! {"ORTH": "Philippe", "OP": "+"}      {"IS_PUNCT": true, "OP": "!"}      {}
//! ```
//!
//! into a [`TokenSpec`]: a conjunctive [`Constraint`] over token attributes
//! plus a [`Quantifier`]. The `OP` marker is resolved to an enum here, once;
//! nothing downstream dispatches on strings.
//!
//! A [`Pattern`] is an ordered list of specs. Patterns are the unit the
//! automaton builder compiles into one fragment each.

use crate::api::UnknownAttributePolicy;
use crate::attrs::{AttrKey, AttrKind, AttrValue, TokenSource};
use crate::error::{MatcherError, Result};
use crate::strings::StrId;
use serde_json::Value;

/// Reserved key carrying the quantifier marker.
pub const OP_KEY: &str = "OP";

/// Repetition/negation policy of a token spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Quantifier {
    /// `1`: exactly one matching token.
    #[default]
    ExactlyOne,
    /// `?`: zero or one matching token.
    ZeroOrOne,
    /// `+`: one or more matching tokens.
    OneOrMore,
    /// `*`: zero or more matching tokens.
    ZeroOrMore,
    /// `!`: exactly one token for which the constraint does not hold.
    NegatedOne,
}

impl Quantifier {
    pub fn from_marker(marker: &str) -> Option<Quantifier> {
        match marker {
            "1" => Some(Quantifier::ExactlyOne),
            "?" => Some(Quantifier::ZeroOrOne),
            "+" => Some(Quantifier::OneOrMore),
            "*" => Some(Quantifier::ZeroOrMore),
            "!" => Some(Quantifier::NegatedOne),
            _ => None,
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Quantifier::ExactlyOne => "1",
            Quantifier::ZeroOrOne => "?",
            Quantifier::OneOrMore => "+",
            Quantifier::ZeroOrMore => "*",
            Quantifier::NegatedOne => "!",
        }
    }

    /// True when every path through the spec consumes a token that satisfies
    /// the constraint.
    pub fn requires_match(self) -> bool {
        matches!(self, Quantifier::ExactlyOne | Quantifier::OneOrMore)
    }
}

/// Conjunction of attribute checks. Empty = any token.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Constraint {
    checks: Vec<(AttrKey, AttrValue)>,
    /// Set when the description named an ignored unknown attribute.
    unsatisfiable: bool,
}

impl Constraint {
    pub fn new(checks: Vec<(AttrKey, AttrValue)>) -> Self {
        Constraint { checks, unsatisfiable: false }
    }

    pub fn checks(&self) -> &[(AttrKey, AttrValue)] {
        &self.checks
    }

    pub fn is_any(&self) -> bool {
        self.checks.is_empty() && !self.unsatisfiable
    }

    pub fn is_unsatisfiable(&self) -> bool {
        self.unsatisfiable
    }

    #[inline]
    pub fn holds<D: TokenSource + ?Sized>(&self, doc: &D, index: usize) -> bool {
        !self.unsatisfiable && self.checks.iter().all(|&(key, value)| doc.attr(index, key) == value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpec {
    pub constraint: Constraint,
    pub quantifier: Quantifier,
}

impl TokenSpec {
    pub fn new(constraint: Constraint, quantifier: Quantifier) -> Self {
        TokenSpec { constraint, quantifier }
    }

    /// Compile one token description.
    pub fn from_json(value: &Value, policy: UnknownAttributePolicy) -> Result<TokenSpec> {
        let Value::Object(table) = value else {
            return Err(MatcherError::invalid(format!("token description must be an object, got {value}")));
        };

        let mut quantifier = Quantifier::ExactlyOne;
        let mut checks = Vec::with_capacity(table.len());
        let mut unsatisfiable = false;

        for (name, expected) in table {
            if name == OP_KEY {
                quantifier = expected
                    .as_str()
                    .and_then(Quantifier::from_marker)
                    .ok_or_else(|| MatcherError::invalid(format!("unrecognized operator {expected}")))?;
                continue;
            }
            if matches!(expected, Value::Array(_) | Value::Object(_) | Value::Null) {
                return Err(MatcherError::invalid(format!("value for '{name}' must be a scalar, got {expected}")));
            }
            let Some(key) = AttrKey::from_name(name) else {
                match policy {
                    UnknownAttributePolicy::Error => {
                        return Err(MatcherError::UnknownAttribute { name: name.clone() });
                    }
                    UnknownAttributePolicy::Ignore => {
                        tracing::debug!(attribute = %name, "unknown attribute, token description never holds");
                        unsatisfiable = true;
                        continue;
                    }
                }
            };
            checks.push((key, expected_value(key, expected)?));
        }

        // Stable order keeps compiled constraints comparable.
        checks.sort_by_key(|&(key, _)| key);
        Ok(TokenSpec { constraint: Constraint { checks, unsatisfiable }, quantifier })
    }
}

fn expected_value(key: AttrKey, expected: &Value) -> Result<AttrValue> {
    let value = match (key.kind(), expected) {
        (AttrKind::Text, Value::String(s)) => AttrValue::Str(StrId::of(s)),
        (AttrKind::Flag, Value::Bool(b)) => AttrValue::Bool(*b),
        (AttrKind::Int, Value::Number(n)) => match n.as_i64() {
            Some(i) => AttrValue::Int(i),
            None => return Err(MatcherError::invalid(format!("{key} expects an integer, got {n}"))),
        },
        (kind, other) => {
            return Err(MatcherError::invalid(format!("{key} expects a {kind:?} value, got {other}")));
        }
    };
    Ok(value)
}

/// Ordered token specs matched against consecutive tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    specs: Vec<TokenSpec>,
}

impl Pattern {
    pub fn new(specs: Vec<TokenSpec>) -> Result<Pattern> {
        if specs.is_empty() {
            return Err(MatcherError::invalid("pattern has no token descriptions"));
        }
        Ok(Pattern { specs })
    }

    /// Compile a JSON array of token descriptions.
    pub fn from_json(value: &Value, policy: UnknownAttributePolicy) -> Result<Pattern> {
        let Value::Array(tokens) = value else {
            return Err(MatcherError::invalid(format!("pattern must be an array of token descriptions, got {value}")));
        };
        let specs = tokens.iter().map(|t| TokenSpec::from_json(t, policy)).collect::<Result<Vec<_>>>()?;
        Pattern::new(specs)
    }

    pub fn specs(&self) -> &[TokenSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
