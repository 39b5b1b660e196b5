//! PDF text access, build-gated behind the `pdf` feature
//!
//! PDF decoding is the classic source of panics, hangs, and unbounded
//! memory. Every page read is individually panic-guarded, page text is
//! capped, page counts are capped, and scans carry a wall-clock deadline.
//! Hitting any bound yields *undecided*, never *absent*. Without the
//! feature the functions are stubs and PDFs never enter discovery.

use crate::error::Result;
use crate::matcher::TermSet;
use crate::scanner::PrefilterOutcome;

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Pages whose text was truncated to the per-page cap, process-wide.
static PAGES_TRUNCATED: AtomicU64 = AtomicU64::new(0);

/// Total truncated pages so far, reported in the end-of-run metrics.
#[must_use]
pub fn pages_truncated_total() -> u64 {
    PAGES_TRUNCATED.load(Ordering::Relaxed)
}

#[cfg(feature = "pdf")]
mod imp {
    use super::*;
    use crate::config::extensions::{PDF_PAGE_CAP, PDF_PAGE_TEXT_CAP};
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::time::Instant;

    /// Map non-printable and non-ASCII characters to spaces, collapse runs.
    fn ascii_normalize(text: &str) -> String {
        let mapped: String = text
            .chars()
            .map(|c| {
                if c.is_ascii() && (c.is_ascii_graphic() || c == ' ' || c == '\n') {
                    c
                } else {
                    ' '
                }
            })
            .collect();
        mapped.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Read one page's text defensively: panics become empty text, and
    /// oversized pages are truncated with the counter bumped.
    fn page_text(doc: &lopdf::Document, page: u32) -> String {
        let extracted = catch_unwind(AssertUnwindSafe(|| doc.extract_text(&[page])))
            .ok()
            .and_then(std::result::Result::ok)
            .unwrap_or_default();
        if extracted.len() > PDF_PAGE_TEXT_CAP {
            PAGES_TRUNCATED.fetch_add(1, Ordering::Relaxed);
            let mut cut = PDF_PAGE_TEXT_CAP;
            while cut > 0 && !extracted.is_char_boundary(cut) {
                cut -= 1;
            }
            extracted[..cut].to_string()
        } else {
            extracted
        }
    }

    fn load_document(path: &Path) -> Option<lopdf::Document> {
        catch_unwind(AssertUnwindSafe(|| lopdf::Document::load(path)))
            .ok()
            .and_then(std::result::Result::ok)
    }

    /// Bounded presence-only scan: do all terms appear anywhere?
    pub fn presence_scan(
        path: &Path,
        terms: &TermSet,
        max_pages: usize,
        wall: Duration,
    ) -> PrefilterOutcome {
        if terms.is_empty() {
            return PrefilterOutcome::found();
        }
        let Some(doc) = load_document(path) else {
            // Malformed reader construction: undecided, not absent.
            return PrefilterOutcome::undecided();
        };

        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        if pages.is_empty() {
            return PrefilterOutcome::undecided();
        }

        let cap = if max_pages == 0 {
            PDF_PAGE_CAP
        } else {
            max_pages
        };
        let start = Instant::now();
        let truncated_before = PAGES_TRUNCATED.load(Ordering::Relaxed);

        let mut found = vec![false; terms.len()];
        let mut remaining = terms.len();

        for (scanned, &page) in pages.iter().enumerate() {
            if scanned >= cap || start.elapsed() > wall {
                return PrefilterOutcome::undecided();
            }
            let text = page_text(&doc, page);
            if text.is_empty() {
                continue;
            }
            for (i, pattern) in terms.text_patterns().iter().enumerate() {
                if !found[i] && pattern.is_match(&text) {
                    found[i] = true;
                    remaining -= 1;
                    if remaining == 0 {
                        return PrefilterOutcome::found();
                    }
                }
            }
        }

        // Only a complete, untruncated scan of every page is a decisive no.
        let truncated = PAGES_TRUNCATED.load(Ordering::Relaxed) != truncated_before;
        if pages.len() <= cap && start.elapsed() <= wall && !truncated {
            PrefilterOutcome::absent()
        } else {
            PrefilterOutcome::undecided()
        }
    }

    /// Bounded proximity check across pages without full extraction.
    ///
    /// Returns `Some(matched)` when the scan ran to a decision within its
    /// bounds, `None` when a bound was hit first.
    pub fn verify_scan(
        path: &Path,
        terms: &TermSet,
        distance: usize,
        max_pages: usize,
        wall: Duration,
    ) -> Option<bool> {
        if terms.is_empty() {
            return Some(true);
        }
        if terms.len() == 1 {
            return match presence_scan(path, terms, max_pages, wall) {
                o if o.found => Some(true),
                o if o.is_conclusive_miss() => Some(false),
                _ => None,
            };
        }

        let doc = load_document(path)?;
        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        if pages.is_empty() {
            return None;
        }

        let cap = if max_pages == 0 {
            PDF_PAGE_CAP
        } else {
            max_pages
        };
        let start = Instant::now();

        // Sliding window across page boundaries with a global text offset.
        let required = terms.len();
        let mut counts = vec![0usize; required];
        let mut covered = 0usize;
        let mut window: std::collections::VecDeque<(usize, usize)> =
            std::collections::VecDeque::new();
        let mut offset = 0usize;
        let mut complete = true;

        for (scanned, &page) in pages.iter().enumerate() {
            if scanned >= cap || start.elapsed() > wall {
                complete = false;
                break;
            }
            let text = page_text(&doc, page);
            if text.is_empty() {
                offset += 1;
                continue;
            }

            let mut page_matches: Vec<(usize, usize)> = Vec::new();
            for (term, pattern) in terms.text_patterns().iter().enumerate() {
                for m in pattern.find_iter(&text) {
                    page_matches.push((offset + m.start(), term));
                }
            }
            page_matches.sort_unstable_by_key(|&(pos, _)| pos);

            for &(pos, term) in &page_matches {
                window.push_back((pos, term));
                if counts[term] == 0 {
                    covered += 1;
                }
                counts[term] += 1;

                while let (Some(&(back, _)), Some(&(front, front_term))) =
                    (window.back(), window.front())
                {
                    if back - front <= distance {
                        break;
                    }
                    counts[front_term] -= 1;
                    if counts[front_term] == 0 {
                        covered -= 1;
                    }
                    window.pop_front();
                }

                if covered == required {
                    return Some(true);
                }
            }

            offset += text.len() + 1;
        }

        if complete {
            Some(false)
        } else {
            None
        }
    }

    /// Full extraction for the result stage: page-by-page with caps,
    /// pages joined by newline, normalised to printable ASCII. Reader
    /// construction failure falls back to the raw bytes.
    pub fn extract(data: &[u8]) -> Result<String> {
        let doc = match catch_unwind(AssertUnwindSafe(|| lopdf::Document::load_mem(data))) {
            Ok(Ok(doc)) => doc,
            _ => return Ok(String::from_utf8_lossy(data).into_owned()),
        };

        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        if pages.is_empty() {
            return Ok(String::from_utf8_lossy(data).into_owned());
        }

        let mut out = String::new();
        for &page in pages.iter().take(PDF_PAGE_CAP) {
            let text = page_text(&doc, page);
            if text.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&text);
        }

        let normalized = ascii_normalize(&out);
        if normalized.is_empty() {
            return Ok(String::from_utf8_lossy(data).into_owned());
        }
        Ok(normalized)
    }
}

#[cfg(feature = "pdf")]
pub use imp::{extract, presence_scan, verify_scan};

#[cfg(not(feature = "pdf"))]
mod stub {
    use super::*;
    use crate::error::SearchError;

    /// PDF support is compiled out; extraction is unavailable.
    pub fn extract(_data: &[u8]) -> Result<String> {
        Err(SearchError::Disabled("PDF"))
    }

    /// Without the feature a PDF can never be conclusively rejected.
    pub fn presence_scan(
        _path: &Path,
        _terms: &TermSet,
        _max_pages: usize,
        _wall: Duration,
    ) -> PrefilterOutcome {
        PrefilterOutcome::undecided()
    }

    /// Without the feature no decision is ever reached.
    pub fn verify_scan(
        _path: &Path,
        _terms: &TermSet,
        _distance: usize,
        _max_pages: usize,
        _wall: Duration,
    ) -> Option<bool> {
        None
    }
}

#[cfg(not(feature = "pdf"))]
pub use stub::{extract, presence_scan, verify_scan};
