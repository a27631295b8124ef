//! Splits a compact rule string into the flat token stream consumed by the
//! rule compiler, so that `what is{2,4}` and `what is { 2 , 4 }` produce the
//! same tokens.

use parcel::prelude::v1::*;

/// Characters that always form a token on their own.
const RESERVED: [char; 15] = [
    '(', ')', '|', '*', '+', '?', '{', '}', '<', '>', ',', '.', '$', '%', '&',
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("unexpected character {character:?} at position {position}")]
    UnexpectedCharacter { position: usize, character: char },

    #[error("unspecified lex error occured: {0}")]
    Undefined(String),
}

/// Tokenizes a compact rule string.
///
/// # Examples
///
/// ```
/// use rule_compiler::lex;
///
/// assert_eq!(
///     vec!["what", "is", "{", "2", ",", "4", "}"],
///     lex("what is{2,4}").unwrap()
/// );
/// ```
pub fn lex(rule: &str) -> Result<Vec<String>, LexError> {
    let input: Vec<(usize, char)> = rule.chars().enumerate().collect();

    let remainder_or = |remainder: &[(usize, char)], tokens: Vec<String>| match remainder.first() {
        None => Ok(tokens),
        Some(&(position, character)) => Err(LexError::UnexpectedCharacter {
            position,
            character,
        }),
    };

    match tokens().parse(input.as_slice()) {
        Ok(MatchStatus::Match {
            remainder, inner, ..
        }) => remainder_or(remainder, inner),
        Ok(MatchStatus::NoMatch(remainder)) => remainder_or(remainder, vec![]),
        Err(err) => Err(LexError::Undefined(err)),
    }
}

fn tokens<'a>() -> impl Parser<'a, &'a [(usize, char)], Vec<String>> {
    parcel::left(parcel::join(
        parcel::zero_or_more(parcel::right(parcel::join(
            parcel::zero_or_more(whitespace()),
            token(),
        ))),
        parcel::zero_or_more(whitespace()),
    ))
}

fn token<'a>() -> impl Parser<'a, &'a [(usize, char)], String> {
    parcel::or(reserved().map(|c| c.to_string()), || word())
}

fn word<'a>() -> impl Parser<'a, &'a [(usize, char)], String> {
    parcel::one_or_more(
        character().predicate(|c| !c.is_whitespace() && !c.is_control() && !RESERVED.contains(c)),
    )
    .map(|chars| chars.into_iter().collect::<String>())
}

fn reserved<'a>() -> impl Parser<'a, &'a [(usize, char)], char> {
    character().predicate(|c| RESERVED.contains(c))
}

fn whitespace<'a>() -> impl Parser<'a, &'a [(usize, char)], char> {
    character().predicate(|c| c.is_whitespace())
}

fn character<'a>() -> impl Parser<'a, &'a [(usize, char)], char> {
    move |input: &'a [(usize, char)]| match input.first() {
        Some(&(pos, next)) => Ok(MatchStatus::Match {
            span: pos..pos + 1,
            remainder: &input[1..],
            inner: next,
        }),
        None => Ok(MatchStatus::NoMatch(input)),
    }
}
