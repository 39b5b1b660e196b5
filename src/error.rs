//! Error types for search operations
//!
//! Nothing in the pipeline is fatal except a root directory that cannot be
//! entered: per-file failures are handled at the call site and at most
//! logged. These types exist so call sites can distinguish the handful of
//! outcomes that matter (timeout vs. decode failure vs. cancellation).

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for search operations
pub type Result<T, E = SearchError> = std::result::Result<T, E>;

/// Error types for search operations
#[derive(Debug, Error)]
pub enum SearchError {
    /// File open, read, or stat failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The query is structurally invalid (empty term list, empty term, ...)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A term could not be compiled into a match pattern
    #[error("Failed to compile term pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A container format rejected the outermost envelope (MIME, ZIP, OLE)
    #[error("Failed to parse {format} container: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    /// An extractor ran but could not produce text
    #[error("Failed to decode {format} content: {message}")]
    Decode {
        format: &'static str,
        message: String,
    },

    /// An extractor call exceeded its deadline.
    ///
    /// A timeout drops the file from the *current* decision only; it is
    /// never interpreted as "file does not match".
    #[error("{operation} timed out after {deadline:?}")]
    Timeout {
        operation: &'static str,
        deadline: Duration,
    },

    /// An extractor panicked inside a third-party decoder; caught at the
    /// call boundary and equivalent to a decode error.
    #[error("{operation} panicked inside the extractor")]
    ExtractorPanic { operation: &'static str },

    /// Operation requires a feature this build does not carry
    #[error("{0} support is disabled in this build")]
    Disabled(&'static str),

    /// The search was cancelled by the caller
    #[error("Search cancelled")]
    Cancelled,

    /// The working directory itself could not be walked
    #[error("Failed to walk {root}: {message}")]
    Walk { root: PathBuf, message: String },
}

impl SearchError {
    /// Whether this error leaves the file's match status undetermined.
    ///
    /// Timeouts and extractor panics bound an operation without telling us
    /// anything about the content; they must never flip a positive
    /// classification to a negative one.
    #[must_use]
    pub fn is_indeterminate(&self) -> bool {
        matches!(
            self,
            SearchError::Timeout { .. } | SearchError::ExtractorPanic { .. }
        )
    }
}
