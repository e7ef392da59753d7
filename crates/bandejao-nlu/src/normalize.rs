//! Text normalization shared by utterances, keywords and regex sources.
//!
//! Matching is case- and accent-insensitive: "Onde fica?", "onde fica?" and
//! "onde ficá?" all normalize to the same string.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lower-case `text` and strip diacritics (NFD, combining marks removed).
pub fn normalize(text: &str) -> String {
    strip_diacritics(&text.to_lowercase())
}

/// Strip diacritics without changing case.
///
/// Used on regex sources, where lower-casing would corrupt escapes like `\S`.
pub fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Split normalized text into words longer than two characters.
pub fn tokenize(normalized: &str) -> Vec<&str> {
    normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() > 2)
        .collect()
}
