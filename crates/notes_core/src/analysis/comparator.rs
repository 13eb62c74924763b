//! Ordering policy for frequency table keys.
//!
//! Words are ordered descending and case-insensitively: `"world"` comes
//! before `"Hello"`, and `"NOTE"` compares equal to `"note"`.

use std::cmp::Ordering;

/// Compares two words in descending, case-insensitive lexicographic order.
///
/// Returns `Ordering::Equal` for words that differ only by case.
pub fn compare_words_descending(left: &str, right: &str) -> Ordering {
    let left_folded = left.chars().flat_map(char::to_lowercase);
    let right_folded = right.chars().flat_map(char::to_lowercase);
    right_folded.cmp(left_folded)
}

/// Map key carrying the descending case-insensitive order.
///
/// Equality follows the ordering, so two keys differing only by case land
/// in the same map slot and the first inserted spelling is kept.
#[derive(Debug, Clone)]
pub(crate) struct WordKey(pub(crate) String);

impl PartialEq for WordKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for WordKey {}

impl PartialOrd for WordKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WordKey {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_words_descending(&self.0, &other.0)
    }
}
