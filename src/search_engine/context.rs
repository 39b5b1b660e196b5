//! Shared state threaded through the pipeline stages

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::extensions::read_budget;
use crate::config::{SearchConfig, SearchQuery};
use crate::matcher::TermSet;

use super::events::{SearchEvent, SearchEventBus};
use super::governor::PdfGovernor;
use super::metrics::SearchMetrics;
use super::progress::{ProgressReporter, SearchStage};
use super::scheduler::HeavyGate;

/// Everything a worker needs, shared behind one `Arc`.
pub(crate) struct SearchContext {
    pub query: SearchQuery,
    pub config: SearchConfig,
    /// All query terms, compiled.
    pub terms: TermSet,
    /// The rarity subset prefilters scan for (two longest terms when
    /// N >= 3, otherwise all).
    pub prefilter_terms: TermSet,
    /// Whether a prefilter positive covers every query term.
    pub prefilter_covers_all: bool,
    /// Effective extension allow-list.
    pub allow: HashSet<String>,
    /// Lowercased `.ext` exclusion tokens.
    pub ext_excludes: Vec<String>,
    /// Content-word exclusion tokens.
    pub word_excludes: Vec<String>,
    pub metrics: Arc<SearchMetrics>,
    pub governor: PdfGovernor,
    pub heavy: HeavyGate,
    pub progress: Arc<dyn ProgressReporter>,
    pub bus: Option<Arc<SearchEventBus>>,
    pub cancel: CancellationToken,
}

impl SearchContext {
    /// Deliver progress to the reporter and, when attached, the event bus.
    pub fn emit_progress(&self, stage: SearchStage, processed: usize, total: usize, path: &Path) {
        self.progress.report_progress(stage, processed, total, path);
        if let Some(bus) = &self.bus {
            let _ = bus.publish(SearchEvent::progress(
                stage,
                processed,
                total,
                path.to_path_buf(),
            ));
        }
    }

    /// Read a file under the size-tiered budget.
    ///
    /// Returns the (possibly truncated) bytes and the file's full size.
    pub fn read_raw_capped(&self, path: &Path) -> std::io::Result<(Vec<u8>, u64)> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        let budget = read_budget(size);

        let mut data = Vec::with_capacity(budget.min(1024 * 1024) as usize);
        file.take(budget).read_to_end(&mut data)?;
        Ok((data, size))
    }

    /// Whether this path's extension is excluded by the query.
    pub fn extension_excluded(&self, path: &Path) -> bool {
        if self.ext_excludes.is_empty() {
            return false;
        }
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        self.ext_excludes.contains(&ext)
    }
}

/// Extension of a path, lowercased, without the dot.
pub(crate) fn extension_of(path: &PathBuf) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
