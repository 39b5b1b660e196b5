//! Whole-word term matching and the proximity predicate
//!
//! A file matches when every query term occurs in its cleaned text and the
//! span between the earliest and latest matched positions fits in the
//! distance window. Matching is whole-word, case-insensitive, and
//! tolerates a trailing `s` or `es` — nothing more; no stemming.

mod term_set;

pub use term_set::TermSet;

use regex::Regex;
use std::collections::HashMap;

/// A single term occurrence in cleaned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPosition {
    /// Byte offset into the cleaned text.
    pub pos: usize,
    /// Index of the matched term in the query (0..N).
    pub term: usize,
}

/// Collect every whole-word occurrence of every term, unsorted.
#[must_use]
pub fn collect_matches(text: &str, terms: &TermSet) -> Vec<MatchPosition> {
    let mut matches = Vec::new();
    for (term, pattern) in terms.text_patterns().iter().enumerate() {
        for m in pattern.find_iter(text) {
            matches.push(MatchPosition {
                pos: m.start(),
                term,
            });
        }
    }
    matches
}

/// Proximity predicate: do all terms occur within `distance` characters?
///
/// Deterministic for a given text and term set. With one term this reduces
/// to presence; with several, a sliding window runs over the
/// position-sorted matches, maintaining a per-term counter map and a
/// covered count, and succeeds on the first window that spans all terms
/// within the distance.
#[must_use]
pub fn within_distance(text: &str, terms: &TermSet, distance: usize) -> bool {
    match terms.len() {
        0 => return true,
        1 => return terms.text_patterns()[0].is_match(text),
        _ => {}
    }

    let mut matches = collect_matches(text, terms);
    if matches.is_empty() {
        return false;
    }

    // Every term must occur at least once before the window is worth running.
    let mut seen = vec![false; terms.len()];
    for m in &matches {
        seen[m.term] = true;
    }
    if seen.iter().any(|s| !s) {
        return false;
    }

    matches.sort_unstable_by_key(|m| m.pos);

    let required = terms.len();
    let mut counts: HashMap<usize, usize> = HashMap::with_capacity(required);
    let mut covered = 0usize;
    let mut left = 0usize;

    for right in 0..matches.len() {
        let rw = matches[right].term;
        let entry = counts.entry(rw).or_insert(0);
        if *entry == 0 {
            covered += 1;
        }
        *entry += 1;

        while covered == required && left <= right {
            if matches[right].pos - matches[left].pos <= distance {
                return true;
            }
            let lw = matches[left].term;
            if let Some(count) = counts.get_mut(&lw) {
                *count -= 1;
                if *count == 0 {
                    covered -= 1;
                }
            }
            left += 1;
        }
    }

    false
}

/// Whether `text` contains any of `words` as a whole word,
/// case-insensitively. Used for exclusion checks; exclusion words get no
/// plural tolerance.
#[must_use]
pub fn contains_any_word(text: &str, words: &[String]) -> bool {
    words.iter().any(|word| {
        let trimmed = word.trim();
        if trimmed.is_empty() {
            return false;
        }
        match Regex::new(&format!(r"(?i)\b{}\b", regex::escape(trimmed))) {
            Ok(re) => re.is_match(text),
            Err(_) => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(words: &[&str]) -> TermSet {
        TermSet::compile(&words.iter().map(|w| (*w).to_string()).collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn single_term_is_presence() {
        let t = terms(&["cat"]);
        assert!(within_distance("a CAT sat", &t, 0));
        assert!(!within_distance("concatenate", &t, 0));
    }

    #[test]
    fn all_terms_within_window() {
        let t = terms(&["contract", "payment", "agreement"]);
        let text = "the payment schedule in this contract requires full agreement";
        assert!(within_distance(text, &t, 5000));
    }

    #[test]
    fn span_exceeding_window_fails() {
        let t = terms(&["contract", "payment"]);
        let filler = "x ".repeat(3000);
        let text = format!("contract {filler} payment");
        assert!(!within_distance(&text, &t, 5000));
        assert!(within_distance(&text, &t, 10000));
    }

    #[test]
    fn missing_term_fails_fast() {
        let t = terms(&["contract", "payment", "agreement"]);
        assert!(!within_distance("payment terms follow", &t, 5000));
    }

    #[test]
    fn plural_tolerance_is_asymmetric() {
        assert!(within_distance("CATS are here", &terms(&["cat"]), 0));
        assert!(!within_distance("CAT is here", &terms(&["cats"]), 0));
    }

    #[test]
    fn interleaved_occurrences_find_tight_window() {
        // Far-apart first occurrences, close later ones.
        let filler = "word ".repeat(2000);
        let text = format!("alpha {filler} alpha beta");
        let t = terms(&["alpha", "beta"]);
        assert!(within_distance(&text, &t, 50));
    }

    #[test]
    fn exclusion_matches_whole_words_only() {
        let words = vec!["test".to_string()];
        assert!(contains_any_word("approved but test file", &words));
        assert!(!contains_any_word("approved testing file", &words));
    }
}
