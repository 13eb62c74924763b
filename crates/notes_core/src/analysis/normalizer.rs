//! Text normalization for word counting.
//!
//! # Invariants
//! - Only ASCII letters and digits survive as word characters.
//! - Produced words are lowercase and never empty.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALPHANUMERIC_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]+").expect("valid separator regex"));

/// Replaces each maximal run of non ASCII-alphanumeric characters with a
/// single space.
///
/// Empty input yields an empty string.
pub fn strip_non_alphanumeric(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    NON_ALPHANUMERIC_RUN_RE.replace_all(text, " ").into_owned()
}

/// Splits raw text into lowercase words in input order.
pub fn tokenize(text: &str) -> Vec<String> {
    strip_non_alphanumeric(text)
        .split(' ')
        .filter(|fragment| !fragment.trim().is_empty())
        .map(str::to_lowercase)
        .collect()
}
