//! Compiled query terms
//!
//! Each term compiles once into two forms of the same plural-aware
//! whole-word pattern: a `str` regex for cleaned text and a byte regex for
//! raw streams. Hot paths never compile patterns.

use regex::bytes::Regex as BytesRegex;
use regex::Regex;

use crate::error::{Result, SearchError};

/// The plural-aware whole-word pattern for a term:
/// `(?i)\b(?:term(?:es|s)?)\b`.
fn term_pattern(term: &str) -> String {
    format!(r"(?i)\b(?:{}(?:es|s)?)\b", regex::escape(term))
}

/// An ordered set of query terms with their compiled match patterns.
#[derive(Debug, Clone)]
pub struct TermSet {
    terms: Vec<String>,
    text_patterns: Vec<Regex>,
    byte_patterns: Vec<BytesRegex>,
}

impl TermSet {
    /// Compile a term list. Terms are trimmed; an empty list or an empty
    /// term is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidQuery`] for empty input and
    /// [`SearchError::Pattern`] if a pattern fails to compile.
    pub fn compile(terms: &[String]) -> Result<Self> {
        if terms.is_empty() {
            return Err(SearchError::InvalidQuery("no search terms given".into()));
        }

        let mut cleaned = Vec::with_capacity(terms.len());
        for term in terms {
            let trimmed = term.trim();
            if trimmed.is_empty() {
                return Err(SearchError::InvalidQuery("empty search term".into()));
            }
            cleaned.push(trimmed.to_lowercase());
        }

        let mut text_patterns = Vec::with_capacity(cleaned.len());
        let mut byte_patterns = Vec::with_capacity(cleaned.len());
        for term in &cleaned {
            let pattern = term_pattern(term);
            text_patterns.push(Regex::new(&pattern)?);
            byte_patterns.push(BytesRegex::new(&pattern)?);
        }

        Ok(Self {
            terms: cleaned,
            text_patterns,
            byte_patterns,
        })
    }

    /// Number of terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the set is empty. Never true for a compiled set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Lowercased terms, in query order.
    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Per-term patterns over `str` text.
    #[must_use]
    pub fn text_patterns(&self) -> &[Regex] {
        &self.text_patterns
    }

    /// Per-term patterns over raw bytes.
    #[must_use]
    pub fn byte_patterns(&self) -> &[BytesRegex] {
        &self.byte_patterns
    }

    /// The subset prefilters scan for: with three or more terms, only the
    /// two longest (length as a rarity proxy) to accelerate rejection.
    /// Pattern clones are cheap (`Regex` is reference-counted).
    #[must_use]
    pub fn prefilter_subset(&self) -> TermSet {
        if self.terms.len() < 3 {
            return self.clone();
        }

        let mut order: Vec<usize> = (0..self.terms.len()).collect();
        order.sort_by(|&a, &b| self.terms[b].len().cmp(&self.terms[a].len()));
        order.truncate(2);

        Self {
            terms: order.iter().map(|&i| self.terms[i].clone()).collect(),
            text_patterns: order.iter().map(|&i| self.text_patterns[i].clone()).collect(),
            byte_patterns: order.iter().map(|&i| self.byte_patterns[i].clone()).collect(),
        }
    }

    /// Whether a positive outcome from the prefilter subset covers every
    /// query term. With the rarity proxy active it does not, and a
    /// prefilter hit must not be treated as a conclusive positive.
    #[must_use]
    pub fn prefilter_covers_all(&self) -> bool {
        self.terms.len() < 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_rejects_empty_input() {
        assert!(TermSet::compile(&[]).is_err());
        assert!(TermSet::compile(&["  ".to_string()]).is_err());
    }

    #[test]
    fn terms_are_lowercased() {
        let set = TermSet::compile(&["Contract".to_string()]).unwrap();
        assert_eq!(set.terms(), ["contract"]);
    }

    #[test]
    fn prefilter_subset_picks_two_longest() {
        let set = TermSet::compile(&[
            "a".to_string(),
            "medium".to_string(),
            "lengthiest".to_string(),
        ])
        .unwrap();
        let subset = set.prefilter_subset();
        assert_eq!(subset.len(), 2);
        assert!(subset.terms().contains(&"lengthiest".to_string()));
        assert!(subset.terms().contains(&"medium".to_string()));
        assert!(!set.prefilter_covers_all());
    }

    #[test]
    fn small_sets_cover_all_terms() {
        let set = TermSet::compile(&["one".to_string(), "two".to_string()]).unwrap();
        assert_eq!(set.prefilter_subset().len(), 2);
        assert!(set.prefilter_covers_all());
    }

    #[test]
    fn regex_metacharacters_are_escaped() {
        // Punctuation in a term must not reach the regex engine raw.
        assert!(TermSet::compile(&["3.14".to_string()]).is_ok());
        let set = TermSet::compile(&["3.14".to_string()]).unwrap();
        assert!(set.text_patterns()[0].is_match("value 3.14 here"));
        assert!(!set.text_patterns()[0].is_match("value 3014 here"));
    }
}
