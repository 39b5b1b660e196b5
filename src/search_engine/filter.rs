//! Stage-2 filtering: classify each candidate against the full query
//!
//! A fixed pool of workers consumes candidates from a bounded channel.
//! Per file: extension excludes, a format-dispatched prefilter, the
//! proximity predicate (through a gated, deadline-bounded extractor for
//! binary formats), and finally the word-exclude check over cleaned text.
//!
//! Classification rule for indeterminate extraction outcomes (timeout,
//! panic, decode failure): when the prefilter conclusively found every
//! query term, the file stays classified as matching and the result stage
//! retries extraction; otherwise the file is dropped from this decision.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dashmap::DashSet;
use log::{debug, warn};

use crate::cleaner::clean_content;
use crate::config::extensions::PDF_PAGE_CAP;
use crate::error::SearchError;
use crate::extractors::{extract_text, pdf, FileFormat};
use crate::matcher;

use super::context::SearchContext;
use super::prefilter::prefilter_file;
use super::progress::SearchStage;
use super::scheduler::run_extraction;

/// Wall-clock cap for a presence-only PDF scan.
const PDF_PRESENCE_WALL: Duration = Duration::from_millis(800);

/// Wall-clock cap for a PDF proximity-verify scan.
const PDF_VERIFY_WALL: Duration = Duration::from_millis(250);

/// Outcome of classifying one file.
enum Verdict {
    /// The file matches; cleaned text is attached when extraction
    /// produced any (used for the word-exclude check).
    Match(Option<String>),
    NoMatch,
}

/// Run the filter pool over the candidates, returning matching paths in
/// completion order.
pub(crate) async fn filter_candidates(
    ctx: Arc<SearchContext>,
    candidates: Vec<PathBuf>,
    total: usize,
) -> Vec<PathBuf> {
    let workers = ctx.config.filter_workers();
    let (job_tx, job_rx) = tokio::sync::mpsc::channel::<PathBuf>(workers * 4);
    let job_rx = Arc::new(tokio::sync::Mutex::new(job_rx));

    let matched: Arc<Mutex<Vec<PathBuf>>> = Arc::new(Mutex::new(Vec::new()));
    let seen: Arc<DashSet<PathBuf>> = Arc::new(DashSet::new());
    // Incrementing and emitting under one lock keeps per-stage progress
    // counts non-decreasing across workers.
    let processed: Arc<Mutex<usize>> = Arc::new(Mutex::new(0));

    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let ctx = Arc::clone(&ctx);
        let job_rx = Arc::clone(&job_rx);
        let matched = Arc::clone(&matched);
        let seen = Arc::clone(&seen);
        let processed = Arc::clone(&processed);

        handles.push(tokio::spawn(async move {
            loop {
                if ctx.cancel.is_cancelled() {
                    break;
                }
                let next = { job_rx.lock().await.recv().await };
                let Some(path) = next else { break };

                if process_one(&ctx, &path).await && seen.insert(path.clone()) {
                    if let Ok(mut list) = matched.lock() {
                        list.push(path.clone());
                    }
                }

                if let Ok(mut count) = processed.lock() {
                    *count += 1;
                    ctx.emit_progress(SearchStage::Processing, *count, total, &path);
                }
            }
        }));
    }

    for path in candidates {
        if ctx.cancel.is_cancelled() {
            break;
        }
        if job_tx.send(path).await.is_err() {
            break;
        }
    }
    drop(job_tx);

    futures::future::join_all(handles).await;

    Arc::try_unwrap(matched)
        .map(|m| m.into_inner().unwrap_or_default())
        .unwrap_or_default()
}

/// Full per-file classification.
async fn process_one(ctx: &Arc<SearchContext>, path: &Path) -> bool {
    if ctx.extension_excluded(path) {
        return false;
    }

    let format = FileFormat::from_path(path);
    let verdict = if format.is_binary() {
        classify_binary(ctx, path, format).await
    } else {
        classify_text(ctx, path).await
    };

    let Verdict::Match(cleaned) = verdict else {
        return false;
    };

    if !ctx.word_excludes.is_empty() {
        match &cleaned {
            Some(text) => {
                if matcher::contains_any_word(text, &ctx.word_excludes) {
                    return false;
                }
            }
            None => {
                // No text to test against: exclusion is unprovable, and an
                // unprovable exclusion must not drop a classified match.
                debug!(
                    "{}: no extracted text for exclusion check, keeping",
                    path.display()
                );
            }
        }
    }

    true
}

/// Text-family files: consolidated streaming prefilter, then the full
/// proximity predicate over cleaned content.
async fn classify_text(ctx: &Arc<SearchContext>, path: &Path) -> Verdict {
    let ctx2 = Arc::clone(ctx);
    let path2 = path.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let format = FileFormat::from_path(&path2);
        let outcome = prefilter_file(&path2, format, &ctx2.prefilter_terms, None);
        if outcome.is_conclusive_miss() {
            return Verdict::NoMatch;
        }

        let (raw, _size) = match ctx2.read_raw_capped(&path2) {
            Ok(read) => read,
            Err(err) => {
                debug!("{}: read failed: {err}", path2.display());
                return Verdict::NoMatch;
            }
        };
        let cleaned = clean_content(&String::from_utf8_lossy(&raw));
        if matcher::within_distance(&cleaned, &ctx2.terms, ctx2.query.distance) {
            Verdict::Match(Some(cleaned))
        } else {
            Verdict::NoMatch
        }
    })
    .await
    .unwrap_or(Verdict::NoMatch)
}

/// Binary formats: bounded prefilter, then extraction under the heavy
/// gate and the per-file deadline, then the proximity predicate.
async fn classify_binary(ctx: &Arc<SearchContext>, path: &Path, format: FileFormat) -> Verdict {
    if format == FileFormat::Pdf {
        return classify_pdf(ctx, path).await;
    }

    let prefilter_ctx = Arc::clone(ctx);
    let prefilter_path = path.to_path_buf();
    let started = Instant::now();
    let outcome = tokio::task::spawn_blocking(move || {
        prefilter_file(
            &prefilter_path,
            format,
            &prefilter_ctx.prefilter_terms,
            None,
        )
    })
    .await
    .unwrap_or_else(|_| crate::scanner::PrefilterOutcome::undecided());
    ctx.metrics.record_prefilter(format, started.elapsed());

    if outcome.is_conclusive_miss() {
        return Verdict::NoMatch;
    }
    let conclusive_positive = outcome.found && ctx.prefilter_covers_all;

    let (raw, _size) = match ctx.read_raw_capped(path) {
        Ok(read) => read,
        Err(err) => {
            debug!("{}: read failed: {err}", path.display());
            return Verdict::NoMatch;
        }
    };

    let permit = match ctx.heavy.acquire().await {
        Ok(permit) => permit,
        Err(_) => return Verdict::NoMatch,
    };
    let started = Instant::now();
    let extraction = run_extraction(
        move || extract_text(format, &raw),
        ctx.config.file_timeout_binary(),
        format.label(),
    )
    .await;
    drop(permit);
    ctx.metrics.record_extraction(format, started.elapsed());

    match extraction {
        Ok(text) => {
            let cleaned = clean_content(&text);
            if matcher::within_distance(&cleaned, &ctx.terms, ctx.query.distance) {
                Verdict::Match(Some(cleaned))
            } else {
                Verdict::NoMatch
            }
        }
        Err(err @ SearchError::Timeout { .. }) => {
            ctx.metrics.record_extract_timeout();
            warn!("{}: {err}", path.display());
            indeterminate_verdict(conclusive_positive)
        }
        Err(err) if err.is_indeterminate() => {
            debug!("{}: {err}", path.display());
            indeterminate_verdict(conclusive_positive)
        }
        Err(err) => {
            debug!("{}: extraction failed: {err}", path.display());
            indeterminate_verdict(conclusive_positive)
        }
    }
}

/// An indeterminate extraction keeps a conclusive prefilter positive
/// alive; anything weaker is dropped from the current decision.
fn indeterminate_verdict(conclusive_positive: bool) -> Verdict {
    if conclusive_positive {
        Verdict::Match(None)
    } else {
        Verdict::NoMatch
    }
}

/// PDFs: presence-only scanning under the governor; extraction never runs
/// during filtering.
async fn classify_pdf(ctx: &Arc<SearchContext>, path: &Path) -> Verdict {
    let Some(_permit) = ctx.governor.admit().await else {
        return Verdict::NoMatch;
    };

    let terms = ctx.terms.clone();
    let scan_path = path.to_path_buf();
    let distance = ctx.query.distance;

    if terms.len() == 1 {
        let outcome = tokio::task::spawn_blocking(move || {
            pdf::presence_scan(&scan_path, &terms, PDF_PAGE_CAP, PDF_PRESENCE_WALL)
        })
        .await
        .unwrap_or_else(|_| crate::scanner::PrefilterOutcome::undecided());

        if outcome.found {
            Verdict::Match(None)
        } else {
            Verdict::NoMatch
        }
    } else {
        let verdict = tokio::task::spawn_blocking(move || {
            pdf::verify_scan(&scan_path, &terms, distance, PDF_PAGE_CAP, PDF_VERIFY_WALL)
        })
        .await
        .unwrap_or(None);

        match verdict {
            Some(true) => Verdict::Match(None),
            _ => Verdict::NoMatch,
        }
    }
}
