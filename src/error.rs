//! Error types shared by the rule matcher and the phrase matcher.

/// Error returned by a match callback.
///
/// Callbacks are user code; anything implementing `std::error::Error` can be
/// boxed into this type with `?` or `.into()`.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by registry mutation, lookup and `run`.
#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    /// A token description or pattern list is malformed (bad `OP` marker,
    /// nested values, empty pattern, wrong value type for a key, ...).
    #[error("invalid pattern: {reason}")]
    InvalidPattern { reason: String },

    /// A token description names an attribute the accessor does not know.
    #[error("unknown token attribute '{name}'")]
    UnknownAttribute { name: String },

    /// `remove`/`get` on a key that is not registered.
    #[error("no rule registered under key '{key}'")]
    NotFound { key: String },

    /// A match callback failed. Callbacks after the failing one were not run.
    #[error("callback for '{key}' failed at match {index}")]
    Callback {
        key: String,
        index: usize,
        #[source]
        source: CallbackError,
    },
}

impl MatcherError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        MatcherError::InvalidPattern { reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, MatcherError>;
