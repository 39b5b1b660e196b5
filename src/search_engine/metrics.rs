//! Process-wide search metrics using lock-free atomic counters
//!
//! Counters are recorded from any worker and read once at the end of a
//! run through [`SearchMetrics::snapshot`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::extractors::{pdf, FileFormat};

const FORMAT_COUNT: usize = 11;

fn format_index(format: FileFormat) -> usize {
    match format {
        FileFormat::Text => 0,
        FileFormat::Html => 1,
        FileFormat::Xml => 2,
        FileFormat::Eml => 3,
        FileFormat::Mbox => 4,
        FileFormat::Msg => 5,
        FileFormat::Doc => 6,
        FileFormat::Docx => 7,
        FileFormat::Odt => 8,
        FileFormat::Rtf => 9,
        FileFormat::Pdf => 10,
    }
}

const FORMAT_LABELS: [&str; FORMAT_COUNT] = [
    "text", "html", "xml", "eml", "mbox", "msg", "doc", "docx", "odt", "rtf", "pdf",
];

#[derive(Debug, Default)]
struct FormatCounters {
    prefilter_count: AtomicU64,
    prefilter_nanos: AtomicU64,
    extract_count: AtomicU64,
    extract_nanos: AtomicU64,
}

/// Atomic counters for one search run.
#[derive(Debug)]
pub struct SearchMetrics {
    per_format: [FormatCounters; FORMAT_COUNT],
    extract_timeouts: AtomicU64,
    pdf_processed: AtomicU64,
    pdf_skipped_budget: AtomicU64,
}

impl Default for SearchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            per_format: std::array::from_fn(|_| FormatCounters::default()),
            extract_timeouts: AtomicU64::new(0),
            pdf_processed: AtomicU64::new(0),
            pdf_skipped_budget: AtomicU64::new(0),
        }
    }

    /// Record one prefilter invocation for a format.
    pub fn record_prefilter(&self, format: FileFormat, duration: Duration) {
        let counters = &self.per_format[format_index(format)];
        counters.prefilter_count.fetch_add(1, Ordering::Relaxed);
        counters
            .prefilter_nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Record one extraction for a format.
    pub fn record_extraction(&self, format: FileFormat, duration: Duration) {
        let counters = &self.per_format[format_index(format)];
        counters.extract_count.fetch_add(1, Ordering::Relaxed);
        counters
            .extract_nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Record an extraction that hit its deadline.
    pub fn record_extract_timeout(&self) {
        self.extract_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a PDF admitted by the governor.
    pub fn record_pdf_processed(&self) {
        self.pdf_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a PDF skipped because the per-run budget was spent.
    pub fn record_pdf_skipped_budget(&self) {
        self.pdf_skipped_budget.fetch_add(1, Ordering::Relaxed);
    }

    /// Coherent view of all counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let per_format = (0..FORMAT_COUNT)
            .map(|i| {
                let c = &self.per_format[i];
                FormatSnapshot {
                    format: FORMAT_LABELS[i],
                    prefilter_count: c.prefilter_count.load(Ordering::Relaxed),
                    prefilter_nanos: c.prefilter_nanos.load(Ordering::Relaxed),
                    extract_count: c.extract_count.load(Ordering::Relaxed),
                    extract_nanos: c.extract_nanos.load(Ordering::Relaxed),
                }
            })
            .collect();

        MetricsSnapshot {
            per_format,
            extract_timeouts: self.extract_timeouts.load(Ordering::Relaxed),
            pdf_processed: self.pdf_processed.load(Ordering::Relaxed),
            pdf_skipped_budget: self.pdf_skipped_budget.load(Ordering::Relaxed),
            pdf_pages_truncated: pdf::pages_truncated_total(),
        }
    }
}

/// Per-format counter snapshot with derived averages.
#[derive(Debug, Clone, Copy)]
pub struct FormatSnapshot {
    pub format: &'static str,
    pub prefilter_count: u64,
    pub prefilter_nanos: u64,
    pub extract_count: u64,
    pub extract_nanos: u64,
}

impl FormatSnapshot {
    /// Average prefilter latency in milliseconds.
    #[must_use]
    pub fn prefilter_avg_ms(&self) -> f64 {
        if self.prefilter_count == 0 {
            0.0
        } else {
            self.prefilter_nanos as f64 / 1e6 / self.prefilter_count as f64
        }
    }

    /// Average extraction latency in milliseconds.
    #[must_use]
    pub fn extract_avg_ms(&self) -> f64 {
        if self.extract_count == 0 {
            0.0
        } else {
            self.extract_nanos as f64 / 1e6 / self.extract_count as f64
        }
    }
}

/// End-of-run metrics view.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub per_format: Vec<FormatSnapshot>,
    pub extract_timeouts: u64,
    pub pdf_processed: u64,
    pub pdf_skipped_budget: u64,
    pub pdf_pages_truncated: u64,
}

impl MetricsSnapshot {
    /// Formats that saw any prefilter or extraction work.
    #[must_use]
    pub fn active_formats(&self) -> Vec<&FormatSnapshot> {
        self.per_format
            .iter()
            .filter(|f| f.prefilter_count > 0 || f.extract_count > 0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_recorded_counts() {
        let metrics = SearchMetrics::new();
        metrics.record_prefilter(FileFormat::Eml, Duration::from_millis(2));
        metrics.record_prefilter(FileFormat::Eml, Duration::from_millis(4));
        metrics.record_extraction(FileFormat::Msg, Duration::from_millis(10));
        metrics.record_extract_timeout();

        let snap = metrics.snapshot();
        let eml = snap.per_format.iter().find(|f| f.format == "eml").unwrap();
        assert_eq!(eml.prefilter_count, 2);
        assert!((eml.prefilter_avg_ms() - 3.0).abs() < 0.5);
        assert_eq!(snap.extract_timeouts, 1);
        assert_eq!(snap.active_formats().len(), 2);
    }
}
