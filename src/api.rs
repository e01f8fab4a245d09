use crate::doc::Doc;
use crate::error::CallbackError;
use crate::strings::StrId;
use std::sync::Arc;

/// What the predicate compiler does with an attribute name it does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownAttributePolicy {
    /// Reject the pattern with `MatcherError::UnknownAttribute`.
    #[default]
    Error,
    /// Accept the pattern; the token description never holds.
    Ignore,
}

/// Options that affect pattern compilation and matching.
#[derive(Debug, Clone)]
pub struct Options {
    pub unknown_attributes: UnknownAttributePolicy,
    /// Skip patterns whose literal texts do not occur in the document.
    /// Never changes results; only saves simulation work.
    pub trigger_scan: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options { unknown_attributes: UnknownAttributePolicy::Error, trigger_scan: true }
    }
}

/// A match of rule `key` over the half-open token range `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct Match {
    pub key: StrId,
    pub start: usize,
    pub end: usize,
}

impl Match {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Callback fired once per match of its rule after matching completes.
///
/// Receives the document (which it may mutate, e.g. with [`Doc::merge`]),
/// the index of the current match and the full sorted match list. Indices in
/// the list are never adjusted for mutations made by earlier callbacks.
pub type Callback = Arc<dyn Fn(&mut Doc, usize, &[Match]) -> Result<(), CallbackError> + Send + Sync>;

/// Wrap a closure as an `on_match` argument.
pub fn callback<F>(f: F) -> Option<Callback>
where
    F: Fn(&mut Doc, usize, &[Match]) -> Result<(), CallbackError> + Send + Sync + 'static,
{
    Some(Arc::new(f))
}

/// Fire callbacks for `matches` in order. `lookup` maps a match to its rule's
/// key name and callback.
pub(crate) fn dispatch<'a>(
    doc: &mut Doc,
    matches: &[Match],
    mut lookup: impl FnMut(StrId) -> Option<(&'a str, &'a Callback)>,
) -> crate::Result<()> {
    for (index, m) in matches.iter().enumerate() {
        let Some((key, on_match)) = lookup(m.key) else {
            continue;
        };
        tracing::trace!(key, index, start = m.start, end = m.end, "on_match");
        on_match(doc, index, matches).map_err(|source| crate::MatcherError::Callback {
            key: key.to_string(),
            index,
            source,
        })?;
    }
    Ok(())
}
