//! Reference document model.
//!
//! A [`Doc`] is an ordered token sequence built from pre-split words. Lexical
//! attributes (case forms, shape, affixes, flags) are computed from the text
//! when a token is created; tagger attributes (lemma, POS, tag, dep, entity
//! type) start empty and are set by whoever tags the document.
//!
//! [`Doc::merge`] is the span-merge mutation match callbacks use to retokenize
//! a matched span into a single token.

use crate::attrs::{AttrKey, AttrValue, LexFlags, TokenSource};
use crate::strings::{StrId, StringStore};
use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

/// Attributes of one token. All text attributes are interned in the owning `Doc`.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenData {
    pub orth: StrId,
    pub lower: StrId,
    pub norm: StrId,
    pub lemma: StrId,
    pub pos: StrId,
    pub tag: StrId,
    pub dep: StrId,
    pub ent_type: StrId,
    pub shape: StrId,
    pub prefix: StrId,
    pub suffix: StrId,
    pub length: usize,
    pub flags: LexFlags,
}

#[derive(Debug, Clone, Default)]
pub struct Doc {
    strings: StringStore,
    tokens: Vec<TokenData>,
}

impl Doc {
    /// Build a document from already-tokenized words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut doc = Doc::default();
        for word in words {
            let token = doc.lex(word.as_ref());
            doc.tokens.push(token);
        }
        doc
    }

    /// Whitespace tokenization; enough for tests and the CLI.
    pub fn from_text(text: &str) -> Self {
        Self::from_words(text.split_whitespace())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn strings(&self) -> &StringStore {
        &self.strings
    }

    pub fn token(&self, index: usize) -> Option<&TokenData> {
        self.tokens.get(index)
    }

    pub fn tokens(&self) -> &[TokenData] {
        &self.tokens
    }

    /// Exact text of the token at `index`.
    pub fn text_at(&self, index: usize) -> &str {
        self.tokens.get(index).and_then(|t| self.strings.get(t.orth)).unwrap_or("")
    }

    /// Text of `start..end`, tokens joined by single spaces.
    pub fn span_text(&self, start: usize, end: usize) -> String {
        let end = end.min(self.tokens.len());
        let start = start.min(end);
        (start..end).map(|i| self.text_at(i)).collect::<Vec<_>>().join(" ")
    }

    pub fn text(&self) -> String {
        self.span_text(0, self.tokens.len())
    }

    /// Resolve an interned id from this document.
    pub fn resolve(&self, id: StrId) -> Option<&str> {
        self.strings.get(id)
    }

    pub fn set_norm(&mut self, index: usize, norm: &str) {
        self.set_text_attr(index, norm, |t, id| t.norm = id);
    }

    pub fn set_lemma(&mut self, index: usize, lemma: &str) {
        self.set_text_attr(index, lemma, |t, id| t.lemma = id);
    }

    pub fn set_pos(&mut self, index: usize, pos: &str) {
        self.set_text_attr(index, pos, |t, id| t.pos = id);
    }

    pub fn set_tag(&mut self, index: usize, tag: &str) {
        self.set_text_attr(index, tag, |t, id| t.tag = id);
    }

    pub fn set_dep(&mut self, index: usize, dep: &str) {
        self.set_text_attr(index, dep, |t, id| t.dep = id);
    }

    pub fn set_ent_type(&mut self, index: usize, ent_type: &str) {
        self.set_text_attr(index, ent_type, |t, id| t.ent_type = id);
    }

    pub fn set_flag(&mut self, index: usize, flag: LexFlags, value: bool) {
        if let Some(token) = self.tokens.get_mut(index) {
            token.flags.set(flag, value);
        }
    }

    /// Merge `start..end` into one token and return its index.
    ///
    /// Lexical attributes are recomputed from the joined text; tagger
    /// attributes are taken from the first token of the span. Indices of
    /// tokens after the span shift left by `end - start - 1`. Returns `None`
    /// for an empty or out-of-range span.
    pub fn merge(&mut self, start: usize, end: usize) -> Option<usize> {
        if start >= end || end > self.tokens.len() {
            return None;
        }
        let text = self.span_text(start, end);
        let first = self.tokens[start].clone();
        let mut merged = self.lex(&text);
        merged.lemma = first.lemma;
        merged.pos = first.pos;
        merged.tag = first.tag;
        merged.dep = first.dep;
        merged.ent_type = first.ent_type;
        self.tokens.splice(start..end, std::iter::once(merged));
        tracing::debug!(start, end, text = %text, "merged span");
        Some(start)
    }

    fn set_text_attr(&mut self, index: usize, value: &str, set: impl FnOnce(&mut TokenData, StrId)) {
        let id = self.strings.add(value);
        if let Some(token) = self.tokens.get_mut(index) {
            set(token, id);
        }
    }

    fn lex(&mut self, word: &str) -> TokenData {
        let lower = word.to_lowercase();
        let prefix: String = word.chars().take(1).collect();
        let suffix: String = {
            let n = word.chars().count();
            word.chars().skip(n.saturating_sub(3)).collect()
        };
        TokenData {
            orth: self.strings.add(word),
            lower: self.strings.add(&lower),
            norm: self.strings.add(&lower),
            lemma: StrId::EMPTY,
            pos: StrId::EMPTY,
            tag: StrId::EMPTY,
            dep: StrId::EMPTY,
            ent_type: StrId::EMPTY,
            shape: self.strings.add(&word_shape(word)),
            prefix: self.strings.add(&prefix),
            suffix: self.strings.add(&suffix),
            length: word.chars().count(),
            flags: lex_flags(word, &lower),
        }
    }
}

impl TokenSource for Doc {
    fn len(&self) -> usize {
        self.tokens.len()
    }

    fn attr(&self, index: usize, key: AttrKey) -> AttrValue {
        let token = &self.tokens[index];
        if let Some(flag) = key.flag() {
            return AttrValue::Bool(token.flags.contains(flag));
        }
        let id = match key {
            AttrKey::Orth => token.orth,
            AttrKey::Lower => token.lower,
            AttrKey::Norm => token.norm,
            AttrKey::Lemma => token.lemma,
            AttrKey::Pos => token.pos,
            AttrKey::Tag => token.tag,
            AttrKey::Dep => token.dep,
            AttrKey::EntType => token.ent_type,
            AttrKey::Shape => token.shape,
            AttrKey::Prefix => token.prefix,
            AttrKey::Suffix => token.suffix,
            AttrKey::Length => return AttrValue::Int(token.length as i64),
            _ => StrId::EMPTY,
        };
        AttrValue::Str(id)
    }
}

// --- Lexical attributes ------------------------------------------------------

static STOP_WORDS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "after", "all", "an", "and", "any", "are", "as", "at", "be", "been", "but", "by", "can", "could",
        "do", "for", "from", "had", "has", "have", "he", "her", "him", "his", "i", "if", "in", "into", "is", "it",
        "its", "me", "my", "no", "not", "of", "on", "or", "our", "she", "so", "some", "than", "that", "the", "their",
        "them", "then", "there", "these", "they", "this", "to", "too", "up", "us", "was", "we", "were", "what", "when",
        "which", "who", "will", "with", "would", "you", "your",
    ]
    .into_iter()
    .collect()
});

const NUMBER_WORDS: &[&str] = &[
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven", "twelve",
    "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen", "nineteen", "twenty", "thirty", "forty",
    "fifty", "sixty", "seventy", "eighty", "ninety", "hundred", "thousand", "million", "billion", "trillion",
];

fn lex_flags(word: &str, lower: &str) -> LexFlags {
    let mut flags = LexFlags::empty();
    if word.is_empty() {
        return flags;
    }

    let has_upper = word.chars().any(char::is_uppercase);
    let has_lower = word.chars().any(char::is_lowercase);

    flags.set(LexFlags::IS_ALPHA, word.chars().all(char::is_alphabetic));
    flags.set(LexFlags::IS_ASCII, word.is_ascii());
    flags.set(LexFlags::IS_DIGIT, word.chars().all(|c| c.is_ascii_digit()));
    flags.set(LexFlags::IS_LOWER, has_lower && !has_upper);
    flags.set(LexFlags::IS_UPPER, has_upper && !has_lower);
    flags.set(LexFlags::IS_TITLE, is_title(word));
    flags.set(LexFlags::IS_PUNCT, regex!(r"^\p{P}+$").is_match(word));
    flags.set(LexFlags::IS_SPACE, word.chars().all(char::is_whitespace));
    flags.set(LexFlags::IS_STOP, STOP_WORDS.contains(lower));
    flags.set(
        LexFlags::LIKE_NUM,
        regex!(r"^[+-]?(\d+([.,]\d+)*|\d+/\d+)$").is_match(word) || NUMBER_WORDS.contains(&lower),
    );
    flags.set(
        LexFlags::LIKE_URL,
        regex!(r"^(?i)((https?|ftp)://\S+|www\.\S+\.\S+|[a-z0-9-]+(\.[a-z0-9-]+)*\.(com|org|net|io|edu|gov)(/\S*)?)$")
            .is_match(word),
    );
    flags.set(LexFlags::LIKE_EMAIL, regex!(r"^[\w.+-]+@[\w-]+(\.[\w-]+)+$").is_match(word));
    flags
}

/// Cased words where every run of letters starts upper and continues lower.
fn is_title(word: &str) -> bool {
    let mut cased = false;
    let mut prev_cased = false;
    for c in word.chars() {
        if c.is_uppercase() {
            if prev_cased {
                return false;
            }
            prev_cased = true;
            cased = true;
        } else if c.is_lowercase() {
            if !prev_cased {
                return false;
            }
            prev_cased = true;
            cased = true;
        } else {
            prev_cased = false;
        }
    }
    cased
}

/// `Apple` -> `Xxxxx`, `1999` -> `dddd`, `C3-PO` -> `Xd-XX`. Runs longer than
/// four of the same class are truncated to four.
fn word_shape(word: &str) -> String {
    let mut shape = String::with_capacity(word.len());
    let mut last = None;
    let mut run = 0;
    for c in word.chars() {
        let class = if c.is_uppercase() {
            'X'
        } else if c.is_lowercase() || c.is_alphabetic() {
            'x'
        } else if c.is_ascii_digit() {
            'd'
        } else {
            c
        };
        if Some(class) == last {
            run += 1;
        } else {
            run = 1;
            last = Some(class);
        }
        if run <= 4 {
            shape.push(class);
        }
    }
    shape
}
