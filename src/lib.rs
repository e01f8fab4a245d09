//! Rule-based token pattern matching.
//!
//! Two matchers over an already tokenized document:
//!
//! - [`Matcher`]: rules made of token descriptions (`{"LOWER": "java"}`,
//!   `{"IS_PUNCT": true, "OP": "!"}`, ...) compiled into a Thompson NFA and
//!   simulated from every token offset. Every accepting window is reported,
//!   so trailing `+`/`*` yield one match per extra token.
//! - [`PhraseMatcher`]: literal phrases matched by exact token identity
//!   through a trie.
//!
//! ```
//! use tokmatch::{Doc, Matcher, pattern};
//!
//! let mut matcher = Matcher::new();
//! matcher.add("GoogleNow", None, &[pattern![{"ORTH": "Google"}, {"ORTH": "Now"}]]).unwrap();
//!
//! let mut doc = Doc::from_text("I like Google Now best");
//! let matches = matcher.run(&mut doc).unwrap();
//! assert_eq!((matches[0].start, matches[0].end), (2, 4));
//! ```

#[macro_use]
mod macros;
mod api;
mod attrs;
mod doc;
mod engine;
mod error;
mod matcher;
mod pattern;
mod phrase;
mod strings;

#[cfg(test)]
mod tests;

pub use api::{Callback, Match, Options, UnknownAttributePolicy, callback};
pub use attrs::{AttrKey, AttrKind, AttrValue, LexFlags, TokenSource};
pub use doc::{Doc, TokenData};
pub use engine::{RunMetrics, RunResult, SimulationMetrics};
pub use error::{CallbackError, MatcherError, Result};
pub use matcher::Matcher;
pub use pattern::{Constraint, OP_KEY, Pattern, Quantifier, TokenSpec};
pub use phrase::PhraseMatcher;
pub use strings::{StrId, StringStore};

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
