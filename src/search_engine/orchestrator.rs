//! Search orchestration: discover, filter, extract-and-build
//!
//! The engine owns the query, the metrics, and the governors, and drives
//! the three stages in order, announcing each through progress events.
//! Cancellation is observed at stage boundaries and loop heads; whatever
//! was collected before a cancel is still returned.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};
use tokio_util::sync::CancellationToken;

use crate::config::{allowed_extensions, SearchConfig, SearchQuery};
use crate::error::{Result, SearchError};
use crate::matcher::TermSet;

use super::context::SearchContext;
use super::events::{SearchEvent, SearchEventBus};
use super::governor::PdfGovernor;
use super::metrics::{MetricsSnapshot, SearchMetrics};
use super::progress::{NoOpProgress, ProgressReporter, SearchStage};
use super::results::SearchResult;
use super::scheduler::HeavyGate;
use super::{filter, results, walker};

/// The multi-term proximity search engine.
pub struct SearchEngine {
    query: SearchQuery,
    config: SearchConfig,
    terms: TermSet,
    metrics: Arc<SearchMetrics>,
    progress: Arc<dyn ProgressReporter>,
    bus: Option<Arc<SearchEventBus>>,
    cancel: CancellationToken,
}

impl SearchEngine {
    /// Create an engine for a query.
    ///
    /// # Errors
    ///
    /// Rejects queries without terms or with empty terms.
    pub fn new(query: SearchQuery, config: SearchConfig) -> Result<Self> {
        let terms = TermSet::compile(&query.search_words)?;
        Ok(Self {
            query,
            config,
            terms,
            metrics: Arc::new(SearchMetrics::new()),
            progress: Arc::new(NoOpProgress),
            bus: None,
            cancel: CancellationToken::new(),
        })
    }

    /// Attach an event bus for streaming results and progress.
    #[must_use]
    pub fn with_event_bus(mut self, bus: Arc<SearchEventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Attach a progress reporter callback.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Token callers can use to cancel the run cooperatively.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// This run's metrics counters.
    #[must_use]
    pub fn metrics(&self) -> Arc<SearchMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Execute the full search.
    ///
    /// # Errors
    ///
    /// Only a working directory that cannot be entered is fatal; per-file
    /// trouble is handled inside the stages.
    pub async fn execute(&self) -> Result<Vec<SearchResult>> {
        let started = Instant::now();
        let root = self.config.root().clone();

        let root_meta = std::fs::metadata(&root).map_err(|err| SearchError::Walk {
            root: root.clone(),
            message: err.to_string(),
        })?;
        if !root_meta.is_dir() {
            return Err(SearchError::Walk {
                root,
                message: "not a directory".into(),
            });
        }

        let prefilter_terms = self.terms.prefilter_subset();
        let ctx = Arc::new(SearchContext {
            query: self.query.clone(),
            config: self.config.clone(),
            terms: self.terms.clone(),
            prefilter_covers_all: self.terms.prefilter_covers_all(),
            prefilter_terms,
            allow: allowed_extensions(self.query.include_code),
            ext_excludes: self.query.extension_excludes(),
            word_excludes: self.query.word_excludes(),
            metrics: Arc::clone(&self.metrics),
            governor: PdfGovernor::new(
                self.config.pdf_min_interval(),
                self.config.pdf_budget(),
                Arc::clone(&self.metrics),
            ),
            heavy: HeavyGate::new(self.config.heavy_concurrency()),
            progress: Arc::clone(&self.progress),
            bus: self.bus.clone(),
            cancel: self.cancel.clone(),
        });

        if let Some(bus) = &ctx.bus {
            let _ = bus.publish(SearchEvent::started(
                self.query.search_words.clone(),
                root.clone(),
            ));
        }

        // Stage 0: estimate the searchable file count for progress totals.
        let estimate = walker::count_allowed_files(&ctx).await;
        ctx.emit_progress(SearchStage::Discovery, 0, estimate, Path::new(""));
        info!("searching {estimate} files under {}", root.display());

        // Stage 1: discovery.
        let candidates = walker::discover_candidates(Arc::clone(&ctx)).await?;
        if candidates.is_empty() {
            info!("no files contain '{}'", self.query.search_words[0]);
            self.finish(&ctx, 0, started);
            return Ok(Vec::new());
        }
        info!(
            "{} candidate files contain '{}'",
            candidates.len(),
            self.query.search_words[0]
        );

        let total = if candidates.len() < estimate || estimate == 0 {
            candidates.len()
        } else {
            estimate
        };

        // Stage 2: filtering.
        let matching = filter::filter_candidates(Arc::clone(&ctx), candidates, total).await;
        if matching.is_empty() {
            info!("no files contain all search terms");
            self.finish(&ctx, 0, started);
            return Ok(Vec::new());
        }
        info!("{} files contain all terms, extracting content", matching.len());

        // Stage 3: extraction and excerpt building.
        let found = results::build_results(Arc::clone(&ctx), matching).await;

        self.finish(&ctx, found.len(), started);
        Ok(found)
    }

    fn finish(&self, ctx: &Arc<SearchContext>, total_results: usize, started: Instant) {
        let elapsed = started.elapsed();
        if let Some(bus) = &ctx.bus {
            let _ = bus.publish(SearchEvent::completed(total_results, elapsed));
        }
        log_metrics(&self.metrics.snapshot());
        info!(
            "search completed in {:.1}s with {total_results} results",
            elapsed.as_secs_f64()
        );
    }
}

fn log_metrics(snapshot: &MetricsSnapshot) {
    for format in snapshot.active_formats() {
        debug!(
            "{}: prefilter {} × {:.1}ms, extract {} × {:.1}ms",
            format.format,
            format.prefilter_count,
            format.prefilter_avg_ms(),
            format.extract_count,
            format.extract_avg_ms(),
        );
    }
    if snapshot.extract_timeouts > 0 {
        info!("{} extractions timed out", snapshot.extract_timeouts);
    }
    if snapshot.pdf_processed > 0 || snapshot.pdf_skipped_budget > 0 {
        info!(
            "pdf scanned: {}, skipped (budget): {}, pages truncated: {}",
            snapshot.pdf_processed, snapshot.pdf_skipped_budget, snapshot.pdf_pages_truncated
        );
    }
}
