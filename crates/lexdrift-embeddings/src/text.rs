//! Text preprocessing.
//!
//! Turns raw index text into the token sequences the corpus store holds:
//! lowercase, whitespace split, surrounding punctuation stripped, and very
//! short tokens dropped.

/// Punctuation stripped from token boundaries.
const STRIP_CHARS: &[char] = &[
    '.', ',', '!', '?', ';', ':', '(', ')', '[', ']', '{', '}', '"', '\'', '-',
];

/// Tokenize one index's raw text.
///
/// Tokens of one or two characters are dropped, as are tokens that are
/// nothing but punctuation.
#[must_use]
pub fn preprocess(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|token| token.chars().count() > 2)
        .map(|token| token.trim_matches(STRIP_CHARS).to_owned())
        .filter(|token| !token.is_empty())
        .collect()
}
