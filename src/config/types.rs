//! Core configuration types for search operations

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// A search request: the terms to find and the knobs that shape matching.
///
/// Terms are matched whole-word, case-insensitively, with a trailing `s` or
/// `es` tolerated. All terms must occur within `distance` characters of each
/// other in the cleaned text for a file to match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Ordered, non-empty list of query terms.
    pub search_words: Vec<String>,
    /// Exclusions: tokens starting with `.` exclude extensions, everything
    /// else excludes files containing the word.
    pub exclude_words: Vec<String>,
    /// Proximity window in characters between the earliest and latest match.
    pub distance: usize,
    /// Extend the extension allow-list with code file types.
    pub include_code: bool,
}

impl SearchQuery {
    /// Create a query with default options for the given terms.
    #[must_use]
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            search_words: terms.into_iter().map(Into::into).collect(),
            exclude_words: Vec::new(),
            distance: super::DEFAULT_DISTANCE,
            include_code: false,
        }
    }

    /// Exclusion tokens that name extensions (leading dot), lowercased.
    #[must_use]
    pub fn extension_excludes(&self) -> Vec<String> {
        self.exclude_words
            .iter()
            .filter(|w| w.starts_with('.'))
            .map(|w| w.to_lowercase())
            .collect()
    }

    /// Exclusion tokens that are content words.
    #[must_use]
    pub fn word_excludes(&self) -> Vec<String> {
        self.exclude_words
            .iter()
            .filter(|w| !w.starts_with('.'))
            .cloned()
            .collect()
    }
}

/// Engine configuration: concurrency, timeouts, and PDF policy.
///
/// Built through [`SearchConfigBuilder`](super::SearchConfigBuilder); the
/// getters apply defaults so `None` fields never leak into the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Directory the search walks. Defaults to the current directory.
    pub(crate) root: PathBuf,

    /// Slots on the heavy-extraction semaphore.
    pub(crate) heavy_concurrency: Option<usize>,

    /// Fixed size of the stage-2 filter worker pool.
    pub(crate) filter_workers: Option<usize>,

    /// Per-file deadline for binary extraction.
    pub(crate) file_timeout_binary_ms: Option<u64>,

    /// Maximum excerpts attached to each result.
    pub(crate) max_excerpts: Option<usize>,

    /// Minimum interval between PDF scans (pacing). Zero disables pacing.
    pub(crate) pdf_min_interval_ms: Option<u64>,

    /// Per-run PDF budget; PDFs beyond it are skipped and counted.
    /// `None` means unlimited.
    pub(crate) pdf_budget: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            heavy_concurrency: Some(super::DEFAULT_HEAVY_CONCURRENCY),
            filter_workers: Some(super::DEFAULT_FILTER_WORKERS),
            file_timeout_binary_ms: Some(super::DEFAULT_FILE_TIMEOUT_BINARY_MS),
            max_excerpts: Some(super::DEFAULT_MAX_EXCERPTS),
            pdf_min_interval_ms: Some(super::DEFAULT_PDF_MIN_INTERVAL_MS),
            pdf_budget: None,
        }
    }
}

impl SearchConfig {
    /// Working directory the search walks.
    #[must_use]
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Heavy-extraction semaphore slots.
    #[must_use]
    pub fn heavy_concurrency(&self) -> usize {
        self.heavy_concurrency
            .unwrap_or(super::DEFAULT_HEAVY_CONCURRENCY)
            .max(1)
    }

    /// Stage-2 filter pool size.
    #[must_use]
    pub fn filter_workers(&self) -> usize {
        self.filter_workers
            .unwrap_or(super::DEFAULT_FILTER_WORKERS)
            .max(1)
    }

    /// Per-file extraction deadline.
    #[must_use]
    pub fn file_timeout_binary(&self) -> Duration {
        Duration::from_millis(
            self.file_timeout_binary_ms
                .unwrap_or(super::DEFAULT_FILE_TIMEOUT_BINARY_MS),
        )
    }

    /// Maximum excerpts per result.
    #[must_use]
    pub fn max_excerpts(&self) -> usize {
        self.max_excerpts
            .unwrap_or(super::DEFAULT_MAX_EXCERPTS)
            .max(1)
    }

    /// Pacing interval between PDF scans; zero disables pacing.
    #[must_use]
    pub fn pdf_min_interval(&self) -> Duration {
        Duration::from_millis(
            self.pdf_min_interval_ms
                .unwrap_or(super::DEFAULT_PDF_MIN_INTERVAL_MS),
        )
    }

    /// Per-run PDF budget, `None` for unlimited.
    #[must_use]
    pub fn pdf_budget(&self) -> Option<u64> {
        self.pdf_budget
    }
}
