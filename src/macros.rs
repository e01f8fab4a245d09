/// Lazily compiled static regex.
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Build a token pattern description from JSON-like token objects.
///
/// ```
/// let quoted = tokmatch::pattern![{"ORTH": "\""}, {"IS_PUNCT": false, "OP": "*"}, {"ORTH": "\""}];
/// assert_eq!(quoted.as_array().map(|a| a.len()), Some(3));
/// ```
#[macro_export]
macro_rules! pattern {
    ($($token:tt)*) => {
        $crate::__private::serde_json::json!([ $($token)* ])
    };
}
