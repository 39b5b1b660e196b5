//! Excerpt construction: minimal all-terms window plus per-term context
//!
//! The first excerpt is the smallest window of cleaned text covering every
//! query term, expanded outward to sentence boundaries within a byte
//! budget. Further excerpts show individual term occurrences in their
//! sentences. Matched spans are wrapped in `«»` markers so a UI can style
//! them; the markers are part of the returned strings.

mod sentence;

pub use sentence::split_sentences;

use crate::cleaner::{collapse_whitespace, is_email_header_line};
use crate::matcher::TermSet;

/// Opening highlight marker around a matched span.
pub const HIGHLIGHT_OPEN: &str = "«";
/// Closing highlight marker around a matched span.
pub const HIGHLIGHT_CLOSE: &str = "»";

/// Context budget on each side of a window, derived from the query's
/// proximity distance.
#[must_use]
pub fn context_budget(distance: usize) -> usize {
    (2 * distance).clamp(200, 4000)
}

#[derive(Debug, Clone, Copy)]
struct TermSpan {
    start: usize,
    end: usize,
    term: usize,
}

fn collect_spans(text: &str, terms: &TermSet) -> Vec<TermSpan> {
    let mut spans = Vec::new();
    for (term, pattern) in terms.text_patterns().iter().enumerate() {
        for m in pattern.find_iter(text) {
            spans.push(TermSpan {
                start: m.start(),
                end: m.end(),
                term,
            });
        }
    }
    spans.sort_unstable_by_key(|s| s.start);
    spans
}

/// Build up to `max_excerpts` highlighted excerpts from cleaned text.
///
/// The primary excerpt (smallest window covering all terms, expanded to
/// sentence boundaries) is always first when the terms can all be located
/// and the query has two or more terms. Remaining slots are filled with
/// per-term occurrence excerpts, deduplicated by exact text.
#[must_use]
pub fn build_excerpts(
    clean: &str,
    terms: &TermSet,
    distance: usize,
    max_excerpts: usize,
) -> Vec<String> {
    let spans = collect_spans(clean, terms);
    if spans.is_empty() {
        return Vec::new();
    }

    let budget = context_budget(distance);
    let mut excerpts: Vec<String> = Vec::new();
    let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();

    if terms.len() >= 2 {
        if let Some((win_start, win_end)) = minimal_covering_window(&spans, terms.len()) {
            let (start, end) = expand_window(clean, win_start, win_end, budget);
            let window = &clean[start..end];
            let text = primary_from_window(window, terms);
            if !text.is_empty() && seen.insert(text.clone()) {
                excerpts.push(text);
            }
        }
    }

    // Per-term excerpts: up to three occurrences each.
    'outer: for term in 0..terms.len() {
        let mut taken = 0usize;
        for span in spans.iter().filter(|s| s.term == term) {
            if excerpts.len() >= max_excerpts {
                break 'outer;
            }
            if taken >= 3 {
                break;
            }
            taken += 1;

            let (start, end) = expand_window(clean, span.start, span.end, budget);
            let window = &clean[start..end];
            let text = sentence_around(window, span.start - start);
            let text = collapse_whitespace(&text);
            if !text.is_empty() && seen.insert(text.clone()) {
                excerpts.push(text);
            }
        }
    }

    excerpts.truncate(max_excerpts);
    excerpts
        .into_iter()
        .map(|e| highlight_terms(&e, terms))
        .collect()
}

/// Smallest-span window over the sorted spans that covers every term.
/// Ties resolve to the earliest such window.
fn minimal_covering_window(spans: &[TermSpan], required: usize) -> Option<(usize, usize)> {
    let mut seen = vec![false; required];
    for span in spans {
        seen[span.term] = true;
    }
    if seen.iter().any(|s| !s) {
        return None;
    }

    let mut counts = vec![0usize; required];
    let mut covered = 0usize;
    let mut left = 0usize;
    let mut best: Option<(usize, usize)> = None;
    let mut best_width = usize::MAX;

    for right in 0..spans.len() {
        let rw = spans[right].term;
        if counts[rw] == 0 {
            covered += 1;
        }
        counts[rw] += 1;

        while covered == required {
            let width = spans[right].start - spans[left].start;
            if width < best_width {
                best_width = width;
                best = Some((spans[left].start, spans[right].end));
            }
            let lw = spans[left].term;
            counts[lw] -= 1;
            if counts[lw] == 0 {
                covered -= 1;
            }
            left += 1;
        }
    }

    best
}

/// Expand a window outward to sentence / paragraph / header boundaries
/// within `budget` bytes on each side.
fn expand_window(text: &str, start: usize, end: usize, budget: usize) -> (usize, usize) {
    (
        expand_left(text, start, budget),
        expand_right(text, end, budget),
    )
}

fn floor_boundary(text: &str, mut i: usize) -> usize {
    while i > 0 && !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_boundary(text: &str, mut i: usize) -> usize {
    while i < text.len() && !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Walk left from `from`, stopping just after the first sentence
/// terminator, or just after a newline that ends an email-header line.
/// Falls back to the outermost blank line, then newline, then the budget
/// edge.
fn expand_left(text: &str, from: usize, budget: usize) -> usize {
    let floor = floor_boundary(text, from.saturating_sub(budget));
    let region = &text[floor..from];

    let mut chars: Vec<(usize, char)> = region.char_indices().collect();
    chars.reverse();

    let mut fallback_blank: Option<usize> = None;
    let mut fallback_newline: Option<usize> = None;

    for &(rel, c) in &chars {
        let abs = floor + rel;
        match c {
            '.' | '!' | '?' => {
                if sentence::is_boundary(text, abs, c) {
                    return skip_whitespace_forward(text, abs + c.len_utf8());
                }
            }
            '\n' => {
                // The line we are about to include ends at this newline;
                // stop before pulling an email header into the excerpt.
                let line_start = text[..abs].rfind('\n').map_or(0, |p| p + 1);
                if is_email_header_line(&text[line_start..abs]) {
                    return skip_whitespace_forward(text, abs + 1);
                }
                if abs > 0 && text.as_bytes()[abs - 1] == b'\n' {
                    fallback_blank = Some(abs + 1);
                } else {
                    fallback_newline = Some(abs + 1);
                }
            }
            _ => {}
        }
    }

    fallback_blank.or(fallback_newline).unwrap_or(floor)
}

/// Walk right from `from`, stopping just after the first sentence
/// terminator, or just before a newline whose following line is an email
/// header. Falls back to the outermost blank line, then newline, then the
/// budget edge.
fn expand_right(text: &str, from: usize, budget: usize) -> usize {
    let ceil = ceil_boundary(text, (from + budget).min(text.len()));
    let region = &text[from..ceil];

    let mut fallback_blank: Option<usize> = None;
    let mut fallback_newline: Option<usize> = None;

    for (rel, c) in region.char_indices() {
        let abs = from + rel;
        match c {
            '.' | '!' | '?' => {
                if sentence::is_boundary(text, abs, c) {
                    return abs + c.len_utf8();
                }
            }
            '\n' => {
                let next_line_start = abs + 1;
                let next_line_end = text[next_line_start..]
                    .find('\n')
                    .map_or(text.len(), |p| next_line_start + p);
                if next_line_start < text.len()
                    && is_email_header_line(&text[next_line_start..next_line_end])
                {
                    return abs;
                }
                if next_line_start < text.len() && text.as_bytes()[next_line_start] == b'\n' {
                    fallback_blank = Some(abs);
                } else {
                    fallback_newline = Some(abs);
                }
            }
            _ => {}
        }
    }

    fallback_blank.or(fallback_newline).unwrap_or(ceil)
}

fn skip_whitespace_forward(text: &str, mut i: usize) -> usize {
    i = ceil_boundary(text, i);
    while let Some(c) = text[i..].chars().next() {
        if c.is_whitespace() {
            i += c.len_utf8();
        } else {
            break;
        }
    }
    i
}

/// Primary excerpt from an expanded window: keep only the sentences that
/// contain a query term, joined with ` … `. When no sentence qualifies the
/// raw window is kept.
fn primary_from_window(window: &str, terms: &TermSet) -> String {
    let sentences = split_sentences(window);
    let matching: Vec<&str> = sentences
        .iter()
        .map(|&(s, e)| &window[s..e])
        .filter(|sentence| {
            terms
                .text_patterns()
                .iter()
                .any(|p| p.is_match(sentence))
        })
        .collect();

    if matching.is_empty() {
        collapse_whitespace(window)
    } else {
        collapse_whitespace(
            &matching
                .iter()
                .map(|s| s.trim())
                .collect::<Vec<_>>()
                .join(" … "),
        )
    }
}

/// The sentence of `window` containing the byte offset `pos`.
fn sentence_around(window: &str, pos: usize) -> String {
    for (s, e) in split_sentences(window) {
        if pos >= s && pos < e {
            return window[s..e].trim().to_string();
        }
    }
    window.trim().to_string()
}

/// Wrap every term occurrence in highlight markers.
#[must_use]
pub fn highlight_terms(text: &str, terms: &TermSet) -> String {
    let mut result = text.to_string();
    for pattern in terms.text_patterns() {
        result = pattern
            .replace_all(&result, format!("{HIGHLIGHT_OPEN}${{0}}{HIGHLIGHT_CLOSE}"))
            .into_owned();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(words: &[&str]) -> TermSet {
        TermSet::compile(&words.iter().map(|w| (*w).to_string()).collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn primary_excerpt_covers_all_terms() {
        let clean = "Unrelated intro sentence. The payment schedule in this contract requires \
                     full agreement. Trailing sentence here.";
        let t = terms(&["contract", "payment", "agreement"]);
        let excerpts = build_excerpts(clean, &t, 5000, 3);
        assert!(!excerpts.is_empty());
        let primary = &excerpts[0];
        assert!(primary.contains("«payment»"));
        assert!(primary.contains("«contract»"));
        assert!(primary.contains("«agreement»"));
        assert!(!primary.contains("Unrelated intro"));
    }

    #[test]
    fn no_matches_no_excerpts() {
        let t = terms(&["absent"]);
        assert!(build_excerpts("nothing relevant here", &t, 5000, 3).is_empty());
    }

    #[test]
    fn single_term_gets_occurrence_excerpts() {
        let clean = "First mention of approval here. Second sentence without it.";
        let t = terms(&["approval"]);
        let excerpts = build_excerpts(clean, &t, 5000, 3);
        assert_eq!(excerpts.len(), 1);
        assert!(excerpts[0].contains("«approval»"));
    }

    #[test]
    fn duplicate_excerpts_are_removed() {
        let clean = "approval mentioned once only.";
        let t = terms(&["approval", "mentioned"]);
        let excerpts = build_excerpts(clean, &t, 5000, 5);
        let unique: std::collections::HashSet<_> = excerpts.iter().collect();
        assert_eq!(unique.len(), excerpts.len());
    }

    #[test]
    fn expansion_stops_at_header_lines() {
        let clean = "Subject: quarterly update\nplease sign the agreement today";
        let t = terms(&["sign", "agreement"]);
        let excerpts = build_excerpts(clean, &t, 5000, 3);
        assert!(!excerpts.is_empty());
        assert!(
            !excerpts[0].contains("quarterly"),
            "header line leaked into excerpt: {}",
            excerpts[0]
        );
    }

    #[test]
    fn respects_max_excerpts() {
        let clean = "alpha one. alpha two. alpha three. alpha four. alpha five.";
        let t = terms(&["alpha"]);
        let excerpts = build_excerpts(clean, &t, 5000, 2);
        assert!(excerpts.len() <= 2);
    }
}
