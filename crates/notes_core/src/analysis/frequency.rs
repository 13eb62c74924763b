//! Word-frequency analysis for note text.
//!
//! # Responsibility
//! - Count case-insensitive word occurrences in raw text.
//! - Keep results in descending case-insensitive word order.
//!
//! # Invariants
//! - Counts are always >= 1 for present words.
//! - Iteration and serialization follow table order, not insertion order.

use crate::analysis::comparator::WordKey;
use crate::analysis::normalizer::tokenize;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// Ordered word -> occurrence count mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: BTreeMap<WordKey, u32>,
}

impl FrequencyTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one occurrence of `word`.
    pub fn record(&mut self, word: impl Into<String>) {
        *self.entries.entry(WordKey(word.into())).or_insert(0) += 1;
    }

    /// Returns the count for `word`, matching case-insensitively.
    pub fn get(&self, word: &str) -> Option<u32> {
        self.entries.get(&WordKey(word.to_string())).copied()
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total_words(&self) -> u64 {
        self.entries.values().map(|count| u64::from(*count)).sum()
    }

    /// Iterates `(word, count)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.entries
            .iter()
            .map(|(key, count)| (key.0.as_str(), *count))
    }

    /// Words in table order.
    pub fn words(&self) -> Vec<&str> {
        self.iter().map(|(word, _)| word).collect()
    }

    /// Consumes the table into ordered `(word, count)` pairs.
    pub fn into_vec(self) -> Vec<(String, u32)> {
        self.entries
            .into_iter()
            .map(|(key, count)| (key.0, count))
            .collect()
    }
}

impl Serialize for FrequencyTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (word, count) in self.iter() {
            map.serialize_entry(word, &count)?;
        }
        map.end()
    }
}

/// Builds a frequency table from raw text.
///
/// Rules:
/// - Absent or zero-length input yields an empty table.
/// - Runs of non ASCII-alphanumeric characters act as one separator.
/// - Words are lowercased before counting.
pub fn analyze_text(text: Option<&str>) -> FrequencyTable {
    let mut table = FrequencyTable::new();
    let Some(text) = text.filter(|value| !value.is_empty()) else {
        return table;
    };

    for word in tokenize(text) {
        table.record(word);
    }
    table
}
