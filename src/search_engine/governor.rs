//! PDF governor: pacing, budget, and dedicated concurrency for PDF scans
//!
//! PDFs get their own gate, separate from the heavy semaphore: global
//! concurrency of two, an optional minimum interval between scans, and an
//! optional per-run budget. The token acquire carries a short deadline so
//! a wedged scan can never stall the whole filter pool behind it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

use super::metrics::SearchMetrics;

/// Fixed number of concurrent PDF scans.
const PDF_CONCURRENCY: usize = 2;

/// How long a worker waits for a PDF token before giving up (undecided).
const TOKEN_WAIT: Duration = Duration::from_millis(50);

/// Holds a PDF slot for the duration of one scan.
pub struct PdfPermit {
    _permit: OwnedSemaphorePermit,
}

/// Pacing and budget controller for PDF processing.
#[derive(Debug)]
pub struct PdfGovernor {
    semaphore: Arc<Semaphore>,
    min_interval: Duration,
    budget: Option<u64>,
    admitted: AtomicU64,
    last_scan: Mutex<Option<Instant>>,
    metrics: Arc<SearchMetrics>,
}

impl PdfGovernor {
    #[must_use]
    pub fn new(min_interval: Duration, budget: Option<u64>, metrics: Arc<SearchMetrics>) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(PDF_CONCURRENCY)),
            min_interval,
            budget,
            admitted: AtomicU64::new(0),
            last_scan: Mutex::new(None),
            metrics,
        }
    }

    /// Ask to scan one PDF.
    ///
    /// `None` means the scan must not run now: the budget is spent (counted
    /// as skipped) or the concurrency token could not be had quickly. The
    /// caller treats that as undecided, never as a negative classification.
    pub async fn admit(&self) -> Option<PdfPermit> {
        if let Some(budget) = self.budget {
            if self.admitted.load(Ordering::Relaxed) >= budget {
                self.metrics.record_pdf_skipped_budget();
                return None;
            }
        }

        // Pacing: space scans at least min_interval apart.
        if !self.min_interval.is_zero() {
            let mut last = self.last_scan.lock().await;
            if let Some(at) = *last {
                let elapsed = at.elapsed();
                if elapsed < self.min_interval {
                    tokio::time::sleep(self.min_interval - elapsed).await;
                }
            }
            *last = Some(Instant::now());
        }

        self.admitted.fetch_add(1, Ordering::Relaxed);
        self.metrics.record_pdf_processed();

        match tokio::time::timeout(TOKEN_WAIT, Arc::clone(&self.semaphore).acquire_owned()).await {
            Ok(Ok(permit)) => Some(PdfPermit { _permit: permit }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn budget_exhaustion_skips_and_counts() {
        let metrics = Arc::new(SearchMetrics::new());
        let governor = PdfGovernor::new(Duration::ZERO, Some(1), Arc::clone(&metrics));

        assert!(governor.admit().await.is_some());
        assert!(governor.admit().await.is_none());

        let snap = metrics.snapshot();
        assert_eq!(snap.pdf_processed, 1);
        assert_eq!(snap.pdf_skipped_budget, 1);
    }

    #[tokio::test]
    async fn unlimited_budget_admits() {
        let metrics = Arc::new(SearchMetrics::new());
        let governor = PdfGovernor::new(Duration::ZERO, None, metrics);
        assert!(governor.admit().await.is_some());
        assert!(governor.admit().await.is_some());
    }
}
