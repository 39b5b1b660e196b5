//! Fluent builder for [`SearchConfig`] with upfront validation
//!
//! Values are validated at `build()` time so the pipeline never has to
//! re-check them in hot paths.

use anyhow::{anyhow, Result};
use std::path::PathBuf;

use super::types::SearchConfig;

/// Builder for [`SearchConfig`].
#[derive(Debug, Default)]
pub struct SearchConfigBuilder {
    root: Option<PathBuf>,
    heavy_concurrency: Option<usize>,
    filter_workers: Option<usize>,
    file_timeout_binary_ms: Option<u64>,
    max_excerpts: Option<usize>,
    pdf_min_interval_ms: Option<u64>,
    pdf_budget: Option<u64>,
}

impl SearchConfigBuilder {
    /// Set the working directory to walk.
    #[must_use]
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Set the number of heavy-extraction semaphore slots.
    #[must_use]
    pub fn heavy_concurrency(mut self, slots: usize) -> Self {
        self.heavy_concurrency = Some(slots);
        self
    }

    /// Set the filter worker pool size explicitly.
    #[must_use]
    pub fn filter_workers(mut self, workers: usize) -> Self {
        self.filter_workers = Some(workers);
        self
    }

    /// Derive the filter worker count from the machine instead of the
    /// fixed default: `min(available cores, 8)`.
    #[must_use]
    pub fn auto_filter_workers(mut self) -> Self {
        let cores = std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(super::DEFAULT_FILTER_WORKERS);
        self.filter_workers = Some(cores.min(8));
        self
    }

    /// Set the per-file binary extraction deadline in milliseconds.
    #[must_use]
    pub fn file_timeout_binary_ms(mut self, ms: u64) -> Self {
        self.file_timeout_binary_ms = Some(ms);
        self
    }

    /// Set the maximum number of excerpts per result.
    #[must_use]
    pub fn max_excerpts(mut self, max: usize) -> Self {
        self.max_excerpts = Some(max);
        self
    }

    /// Set the pacing interval between PDF scans; 0 disables pacing.
    #[must_use]
    pub fn pdf_min_interval_ms(mut self, ms: u64) -> Self {
        self.pdf_min_interval_ms = Some(ms);
        self
    }

    /// Cap the number of PDFs examined in this run.
    #[must_use]
    pub fn pdf_budget(mut self, budget: u64) -> Self {
        self.pdf_budget = Some(budget);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when a zero worker/slot count or a zero timeout is
    /// requested.
    pub fn build(self) -> Result<SearchConfig> {
        if self.heavy_concurrency == Some(0) {
            return Err(anyhow!("heavy_concurrency must be at least 1"));
        }
        if self.filter_workers == Some(0) {
            return Err(anyhow!("filter_workers must be at least 1"));
        }
        if self.file_timeout_binary_ms == Some(0) {
            return Err(anyhow!("file_timeout_binary_ms must be positive"));
        }
        if self.max_excerpts == Some(0) {
            return Err(anyhow!("max_excerpts must be at least 1"));
        }

        let defaults = SearchConfig::default();
        Ok(SearchConfig {
            root: self.root.unwrap_or_else(|| PathBuf::from(".")),
            heavy_concurrency: self.heavy_concurrency.or(defaults.heavy_concurrency),
            filter_workers: self.filter_workers.or(defaults.filter_workers),
            file_timeout_binary_ms: self
                .file_timeout_binary_ms
                .or(defaults.file_timeout_binary_ms),
            max_excerpts: self.max_excerpts.or(defaults.max_excerpts),
            pdf_min_interval_ms: self.pdf_min_interval_ms.or(defaults.pdf_min_interval_ms),
            pdf_budget: self.pdf_budget,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_defaults() {
        let config = SearchConfigBuilder::default().build().unwrap();
        assert_eq!(config.heavy_concurrency(), 2);
        assert_eq!(config.filter_workers(), 2);
        assert_eq!(config.file_timeout_binary().as_millis(), 1000);
    }

    #[test]
    fn builder_rejects_zero_workers() {
        assert!(SearchConfigBuilder::default()
            .filter_workers(0)
            .build()
            .is_err());
    }

    #[test]
    fn auto_filter_workers_is_bounded() {
        let config = SearchConfigBuilder::default()
            .auto_filter_workers()
            .build()
            .unwrap();
        assert!(config.filter_workers() >= 1);
        assert!(config.filter_workers() <= 8);
    }
}
