//! Progress reporting abstraction
//!
//! A borrowed callback the orchestrator invokes from worker tasks; callers
//! aggregate however they like. Counts per stage only ever grow; no other
//! ordering is guaranteed across workers.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pipeline stage a progress event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchStage {
    /// Walking the working directory and scanning for the first term.
    Discovery,
    /// Stage-2 filtering of candidate files.
    Processing,
}

impl SearchStage {
    /// Wire label for the stage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Processing => "processing",
        }
    }
}

/// Trait for receiving progress from any worker thread.
///
/// Implementations must tolerate concurrent invocation; `total` is 0 when
/// unknown.
pub trait ProgressReporter: Send + Sync {
    /// Report that `processed` files of `total` have been handled in
    /// `stage`, with `path` being the most recent file.
    fn report_progress(&self, stage: SearchStage, processed: usize, total: usize, path: &Path);
}

/// Progress reporter that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    #[inline(always)]
    fn report_progress(&self, _stage: SearchStage, _processed: usize, _total: usize, _path: &Path) {
    }
}
