//! Transition labels and the token classes wildcard symbols admit.

use std::fmt::Display;

/// The serialized form of an epsilon transition.
pub const EPSILON_MARKER: &str = ":e:";
/// Matches any token that is neither numeric nor punctuation.
pub const WORD_WILDCARD_MARKER: &str = "$";
/// Matches any numeric-looking token.
pub const NUMERIC_WILDCARD_MARKER: &str = "%";
/// Matches any punctuation token.
pub const PUNCTUATION_WILDCARD_MARKER: &str = "&";

/// Tokens treated as punctuation by the `&` wildcard.
pub const PUNCTUATION: [&str; 18] = [
    ",", "，", ":", "：", "!", "！", "《", "》", "。", "；", ".", "(", ")", "（", "）", "|", "?", "\"",
];

/// A transition label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    /// Matches a token by exact equality.
    Literal(String),
    /// Consumes no input.
    Epsilon,
    /// Matches any non-empty token that is neither numeric nor punctuation.
    Word,
    /// Matches any numeric-looking token, i.e. `12` or `3.5`.
    Numeric,
    /// Matches any token from [PUNCTUATION].
    Punctuation,
}

impl Symbol {
    /// Instantiates a literal symbol.
    pub fn literal<S: Into<String>>(token: S) -> Self {
        Self::Literal(token.into())
    }

    pub fn is_epsilon(&self) -> bool {
        matches!(self, Self::Epsilon)
    }

    /// Returns `true` for the three open token classes.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Word | Self::Numeric | Self::Punctuation)
    }

    /// Classifies how, if at all, this symbol admits `token`.
    pub fn admits(&self, token: &str) -> Option<MatchKind> {
        match self {
            Self::Literal(literal) if literal == token => Some(MatchKind::Exact),
            Self::Numeric if is_numeric(token) => Some(MatchKind::Numeric),
            Self::Punctuation if is_punctuation(token) => Some(MatchKind::Punctuation),
            Self::Word if is_word(token) => Some(MatchKind::Word),
            _ => None,
        }
    }
}

impl From<&str> for Symbol {
    fn from(token: &str) -> Self {
        match token {
            EPSILON_MARKER => Self::Epsilon,
            WORD_WILDCARD_MARKER => Self::Word,
            NUMERIC_WILDCARD_MARKER => Self::Numeric,
            PUNCTUATION_WILDCARD_MARKER => Self::Punctuation,
            literal => Self::Literal(literal.to_string()),
        }
    }
}

impl From<String> for Symbol {
    fn from(token: String) -> Self {
        Self::from(token.as_str())
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(literal) => write!(f, "{}", literal),
            Self::Epsilon => write!(f, "{}", EPSILON_MARKER),
            Self::Word => write!(f, "{}", WORD_WILDCARD_MARKER),
            Self::Numeric => write!(f, "{}", NUMERIC_WILDCARD_MARKER),
            Self::Punctuation => write!(f, "{}", PUNCTUATION_WILDCARD_MARKER),
        }
    }
}

/// The way a token satisfied a transition symbol, ordered by the priority the
/// wildcard executor assigns to each kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchKind {
    Exact,
    Numeric,
    Punctuation,
    Word,
}

/// Returns `true` if the token is a run of digits with at most one decimal
/// point.
pub fn is_numeric(token: &str) -> bool {
    let without_point = token.replacen('.', "", 1);

    !without_point.is_empty() && without_point.chars().all(char::is_numeric)
}

pub fn is_punctuation(token: &str) -> bool {
    PUNCTUATION.contains(&token)
}

/// The catch-all class of the `$` wildcard.
pub fn is_word(token: &str) -> bool {
    !token.is_empty() && !is_numeric(token) && !is_punctuation(token)
}
