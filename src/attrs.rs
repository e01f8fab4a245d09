//! Token attributes and the accessor seam.
//!
//! The matching engine never looks at tokens directly. It asks a
//! [`TokenSource`] for `attr(index, key)` and compares the returned
//! [`AttrValue`] with the value a pattern expects.
//!
//! Attribute keys fall into three kinds:
//!
//! ```text
//! Text  ORTH LOWER NORM LEMMA POS TAG DEP ENT_TYPE SHAPE PREFIX SUFFIX  -> AttrValue::Str
//! Flag  IS_ALPHA IS_ASCII IS_DIGIT ... LIKE_EMAIL                         -> AttrValue::Bool
//! Int   LENGTH                                                          -> AttrValue::Int
//! ```

use crate::strings::StrId;

/// Named token attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttrKey {
    Orth,
    Lower,
    Norm,
    Lemma,
    Pos,
    Tag,
    Dep,
    EntType,
    Shape,
    Prefix,
    Suffix,
    Length,
    IsAlpha,
    IsAscii,
    IsDigit,
    IsLower,
    IsUpper,
    IsTitle,
    IsPunct,
    IsSpace,
    IsStop,
    LikeNum,
    LikeUrl,
    LikeEmail,
}

/// Value type an attribute produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    Text,
    Flag,
    Int,
}

const ATTR_NAMES: &[(&str, AttrKey)] = &[
    ("ORTH", AttrKey::Orth),
    ("LOWER", AttrKey::Lower),
    ("NORM", AttrKey::Norm),
    ("LEMMA", AttrKey::Lemma),
    ("POS", AttrKey::Pos),
    ("TAG", AttrKey::Tag),
    ("DEP", AttrKey::Dep),
    ("ENT_TYPE", AttrKey::EntType),
    ("SHAPE", AttrKey::Shape),
    ("PREFIX", AttrKey::Prefix),
    ("SUFFIX", AttrKey::Suffix),
    ("LENGTH", AttrKey::Length),
    ("IS_ALPHA", AttrKey::IsAlpha),
    ("IS_ASCII", AttrKey::IsAscii),
    ("IS_DIGIT", AttrKey::IsDigit),
    ("IS_LOWER", AttrKey::IsLower),
    ("IS_UPPER", AttrKey::IsUpper),
    ("IS_TITLE", AttrKey::IsTitle),
    ("IS_PUNCT", AttrKey::IsPunct),
    ("IS_SPACE", AttrKey::IsSpace),
    ("IS_STOP", AttrKey::IsStop),
    ("LIKE_NUM", AttrKey::LikeNum),
    ("LIKE_URL", AttrKey::LikeUrl),
    ("LIKE_EMAIL", AttrKey::LikeEmail),
];

impl AttrKey {
    /// Resolve an attribute name. Case-insensitive: `orth` and `ORTH` are the same key.
    pub fn from_name(name: &str) -> Option<AttrKey> {
        ATTR_NAMES.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)).map(|&(_, key)| key)
    }

    pub fn name(self) -> &'static str {
        ATTR_NAMES.iter().find(|&&(_, key)| key == self).map(|&(n, _)| n).unwrap_or("?")
    }

    pub fn kind(self) -> AttrKind {
        match self {
            AttrKey::Length => AttrKind::Int,
            key if key.flag().is_some() => AttrKind::Flag,
            _ => AttrKind::Text,
        }
    }

    /// Lexical flag backing a boolean attribute.
    pub fn flag(self) -> Option<LexFlags> {
        let flag = match self {
            AttrKey::IsAlpha => LexFlags::IS_ALPHA,
            AttrKey::IsAscii => LexFlags::IS_ASCII,
            AttrKey::IsDigit => LexFlags::IS_DIGIT,
            AttrKey::IsLower => LexFlags::IS_LOWER,
            AttrKey::IsUpper => LexFlags::IS_UPPER,
            AttrKey::IsTitle => LexFlags::IS_TITLE,
            AttrKey::IsPunct => LexFlags::IS_PUNCT,
            AttrKey::IsSpace => LexFlags::IS_SPACE,
            AttrKey::IsStop => LexFlags::IS_STOP,
            AttrKey::LikeNum => LexFlags::LIKE_NUM,
            AttrKey::LikeUrl => LexFlags::LIKE_URL,
            AttrKey::LikeEmail => LexFlags::LIKE_EMAIL,
            _ => return None,
        };
        Some(flag)
    }
}

impl std::fmt::Display for AttrKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Value of one attribute of one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrValue {
    Str(StrId),
    Bool(bool),
    Int(i64),
}

impl AttrValue {
    pub fn as_str_id(self) -> Option<StrId> {
        match self {
            AttrValue::Str(id) => Some(id),
            _ => None,
        }
    }
}

bitflags::bitflags! {
    /// Boolean lexical attributes of a token, computed once per token.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LexFlags: u16 {
        const IS_ALPHA   = 1 << 0;
        const IS_ASCII   = 1 << 1;
        const IS_DIGIT   = 1 << 2;
        const IS_LOWER   = 1 << 3;
        const IS_UPPER   = 1 << 4;
        const IS_TITLE   = 1 << 5;
        const IS_PUNCT   = 1 << 6;
        const IS_SPACE   = 1 << 7;
        const IS_STOP    = 1 << 8;
        const LIKE_NUM   = 1 << 9;
        const LIKE_URL   = 1 << 10;
        const LIKE_EMAIL = 1 << 11;
    }
}

/// Index-addressable token sequence exposing per-token attributes.
///
/// This is the only view of a document the engine and the phrase matcher
/// need. `attr` is called with `index < len()`.
pub trait TokenSource {
    fn len(&self) -> usize;

    fn attr(&self, index: usize, key: AttrKey) -> AttrValue;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: TokenSource + ?Sized> TokenSource for &T {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn attr(&self, index: usize, key: AttrKey) -> AttrValue {
        (**self).attr(index, key)
    }
}
