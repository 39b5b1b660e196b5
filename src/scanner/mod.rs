//! Streaming, case-insensitive, whole-word scanning
//!
//! The lowest layer of the pipeline: bounded-memory scans over byte
//! readers, with cross-chunk overlap so matches never fall through the
//! gap between reads. Higher-level predicates (prefilters, discovery)
//! are built on these primitives.

mod stream;
pub mod word_match;

pub use stream::{scan_for_terms, scan_for_word, PrefilterOutcome, TermScan};
pub use word_match::contains_whole_word;
