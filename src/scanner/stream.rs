//! Streaming scans over arbitrary byte readers
//!
//! Every scan holds one 64 KiB chunk plus a small overlap window so a match
//! straddling a chunk boundary is still caught; memory never grows with
//! file size. Scans return on the first hit.

use regex::bytes::Regex as BytesRegex;
use std::io::{ErrorKind, Read};

use crate::config::extensions::{MIN_SCAN_OVERLAP, PREFILTER_OVERLAP, SCAN_CHUNK_SIZE};

/// Three-valued prefilter outcome.
///
/// `decided` is true only when the scan saw the end of the input (or a
/// format-specific equivalent); exhausting a byte budget leaves the
/// question open and must never be read as absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefilterOutcome {
    pub found: bool,
    pub decided: bool,
}

impl PrefilterOutcome {
    /// All terms were seen.
    #[must_use]
    pub fn found() -> Self {
        Self {
            found: true,
            decided: true,
        }
    }

    /// The input was read to its end without seeing all terms.
    #[must_use]
    pub fn absent() -> Self {
        Self {
            found: false,
            decided: true,
        }
    }

    /// The budget ran out first; the file cannot be rejected.
    #[must_use]
    pub fn undecided() -> Self {
        Self {
            found: false,
            decided: false,
        }
    }

    /// Conclusive absence: the only outcome that justifies skipping a file.
    #[must_use]
    pub fn is_conclusive_miss(&self) -> bool {
        self.decided && !self.found
    }
}

/// Outcome of a single-term discovery scan.
#[derive(Debug, Clone, Copy)]
pub struct TermScan {
    /// The term was seen as a whole word.
    pub found: bool,
    /// The byte budget was exhausted before end of input; absence is not
    /// conclusive and the file stays a candidate.
    pub budget_hit: bool,
}

/// Stream `reader` looking for a single whole-word term.
///
/// Reads at most `max_bytes`. On read error the scan reports not-found;
/// discovery treats unreadable files as uninteresting rather than fatal.
pub fn scan_for_word<R: Read>(mut reader: R, word: &str, max_bytes: u64) -> TermScan {
    let word_lower = word.to_ascii_lowercase().into_bytes();
    if word_lower.is_empty() {
        return TermScan {
            found: false,
            budget_hit: false,
        };
    }
    let overlap = (word_lower.len() + 1).max(MIN_SCAN_OVERLAP);

    let mut prev: Vec<u8> = Vec::with_capacity(overlap);
    let mut buf = vec![0u8; SCAN_CHUNK_SIZE];
    let mut combined: Vec<u8> = Vec::with_capacity(SCAN_CHUNK_SIZE + overlap);
    let mut total: u64 = 0;

    loop {
        if total >= max_bytes {
            // A budget equal to the file size ends exactly at EOF; probe so
            // that case reads as a conclusive end rather than a budget hit.
            return TermScan {
                found: false,
                budget_hit: !at_eof(&mut reader),
            };
        }
        let to_read = SCAN_CHUNK_SIZE.min((max_bytes - total) as usize);
        let n = match reader.read(&mut buf[..to_read]) {
            Ok(0) => {
                return TermScan {
                    found: false,
                    budget_hit: false,
                }
            }
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(_) => {
                return TermScan {
                    found: false,
                    budget_hit: false,
                }
            }
        };

        combined.clear();
        combined.extend_from_slice(&prev);
        combined.extend_from_slice(&buf[..n]);

        if super::word_match::contains_whole_word(&combined, &word_lower) {
            return TermScan {
                found: true,
                budget_hit: false,
            };
        }

        keep_overlap(&mut prev, &combined, &buf[..n], overlap);
        total += n as u64;
    }
}

/// Stream `reader` looking for all of `patterns` (one plural-aware
/// whole-word regex per term), up to `max_bytes`.
///
/// Returns as soon as every pattern has matched. End of input without all
/// matches is conclusive absence; budget exhaustion is undecided. A read
/// error is treated as a decided miss — the file gets skipped, matching
/// the I/O error policy everywhere else in the pipeline.
pub fn scan_for_terms<R: Read>(
    mut reader: R,
    patterns: &[BytesRegex],
    max_bytes: u64,
) -> PrefilterOutcome {
    if patterns.is_empty() {
        return PrefilterOutcome::found();
    }

    let mut found = vec![false; patterns.len()];
    let mut remaining = patterns.len();

    let mut prev: Vec<u8> = Vec::with_capacity(PREFILTER_OVERLAP);
    let mut buf = vec![0u8; SCAN_CHUNK_SIZE];
    let mut combined: Vec<u8> = Vec::with_capacity(SCAN_CHUNK_SIZE + PREFILTER_OVERLAP);
    let mut total: u64 = 0;

    loop {
        if total >= max_bytes {
            if at_eof(&mut reader) {
                return PrefilterOutcome::absent();
            }
            return PrefilterOutcome::undecided();
        }
        let to_read = SCAN_CHUNK_SIZE.min((max_bytes - total) as usize);
        let n = match reader.read(&mut buf[..to_read]) {
            Ok(0) => return PrefilterOutcome::absent(),
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(_) => return PrefilterOutcome::absent(),
        };

        combined.clear();
        combined.extend_from_slice(&prev);
        combined.extend_from_slice(&buf[..n]);

        for (i, pattern) in patterns.iter().enumerate() {
            if !found[i] && pattern.is_match(&combined) {
                found[i] = true;
                remaining -= 1;
                if remaining == 0 {
                    return PrefilterOutcome::found();
                }
            }
        }

        keep_overlap(&mut prev, &combined, &buf[..n], PREFILTER_OVERLAP);
        total += n as u64;
    }
}

/// Whether the reader is exactly at end of input. Consumes at most one
/// byte past the budget; that byte is discarded and only affects whether
/// the outcome counts as decided.
fn at_eof<R: Read>(reader: &mut R) -> bool {
    let mut probe = [0u8; 1];
    loop {
        return match reader.read(&mut probe) {
            Ok(0) => true,
            Ok(_) => false,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(_) => true,
        };
    }
}

/// Carry the trailing `overlap` bytes into the next iteration.
fn keep_overlap(prev: &mut Vec<u8>, combined: &[u8], chunk: &[u8], overlap: usize) {
    prev.clear();
    if chunk.len() >= overlap {
        prev.extend_from_slice(&chunk[chunk.len() - overlap..]);
    } else if combined.len() >= overlap {
        prev.extend_from_slice(&combined[combined.len() - overlap..]);
    } else {
        prev.extend_from_slice(combined);
    }
}
