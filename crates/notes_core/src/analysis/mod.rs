//! Text analytics over note bodies.
//!
//! # Responsibility
//! - Tokenize raw note text into lowercase words.
//! - Count word occurrences into a deterministically ordered table.
//!
//! # Invariants
//! - Everything in this module is pure; no storage or logging side effects.
//! - Frequency tables are ordered by [`comparator::compare_words_descending`]
//!   at insertion time, never by insertion order.

pub mod comparator;
pub mod frequency;
pub mod normalizer;

pub use comparator::compare_words_descending;
pub use frequency::{analyze_text, FrequencyTable};
pub use normalizer::{strip_non_alphanumeric, tokenize};
