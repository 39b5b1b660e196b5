//! Discovery: walk the working directory and collect candidate files
//!
//! Traversal is single-threaded; first-term content scans fan out to a
//! small worker pool over a bounded channel. Heavy formats skip the
//! content scan: non-PDF heavy files get a conservative capped prefilter
//! and are dropped only on conclusive absence, PDFs are always candidates
//! (their reads are owned by the governor later).

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ignore::WalkBuilder;
use log::{debug, warn};

use crate::config::extensions::{DISCOVERY_HEAVY_CAP, EMAIL_PREFILTER_CAP};
use crate::config::should_skip_directory;
use crate::error::Result;
use crate::extractors::FileFormat;
use crate::scanner::{scan_for_word, TermScan};

use super::context::{extension_of, SearchContext};
use super::prefilter::prefilter_file;
use super::progress::SearchStage;

/// Workers scanning text files for the first term.
const SCAN_WORKERS: usize = 4;

/// Bounded queue between the walker and the scan workers.
const SCAN_QUEUE: usize = 1024;

/// Count files that pass the allow-list; the total estimate for progress.
pub(crate) async fn count_allowed_files(ctx: &Arc<SearchContext>) -> usize {
    let root = ctx.config.root().clone();
    let allow = ctx.allow.clone();

    tokio::task::spawn_blocking(move || {
        let mut count = 0usize;
        let walker = WalkBuilder::new(&root)
            .standard_filters(false)
            .follow_links(false)
            .filter_entry(|entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir && should_skip_directory(&entry.file_name().to_string_lossy()))
            })
            .build();

        for entry in walker {
            let Ok(entry) = entry else { continue };
            if entry.file_type().is_some_and(|t| t.is_dir()) {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if name.starts_with('.') {
                continue;
            }
            if allow.contains(&extension_of(&entry.path().to_path_buf())) {
                count += 1;
            }
        }
        count
    })
    .await
    .unwrap_or(0)
}

/// Scan one text file for the first query term under its budget tier.
fn scan_file(path: &PathBuf, word: &str) -> TermScan {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(_) => {
            return TermScan {
                found: false,
                budget_hit: false,
            }
        }
    };
    let budget = file
        .metadata()
        .map(|m| crate::config::read_budget(m.len()))
        .unwrap_or(10 * 1024 * 1024);
    scan_for_word(file, word, budget.max(1))
}

/// Walk the directory and emit the candidate list.
pub(crate) async fn discover_candidates(ctx: Arc<SearchContext>) -> Result<Vec<PathBuf>> {
    let first_term = ctx.query.search_words[0].clone();
    let candidates: Arc<Mutex<Vec<PathBuf>>> = Arc::new(Mutex::new(Vec::new()));
    let processed = Arc::new(AtomicUsize::new(0));

    let (scan_tx, scan_rx) = tokio::sync::mpsc::channel::<PathBuf>(SCAN_QUEUE);
    let scan_rx = Arc::new(tokio::sync::Mutex::new(scan_rx));

    let mut workers = Vec::with_capacity(SCAN_WORKERS);
    for _ in 0..SCAN_WORKERS {
        let scan_rx = Arc::clone(&scan_rx);
        let candidates = Arc::clone(&candidates);
        let cancel = ctx.cancel.clone();
        let word = first_term.clone();

        workers.push(tokio::spawn(async move {
            loop {
                if cancel.is_cancelled() {
                    break;
                }
                let next = { scan_rx.lock().await.recv().await };
                let Some(path) = next else { break };

                let scan_path = path.clone();
                let scan_word = word.clone();
                let scan = tokio::task::spawn_blocking(move || scan_file(&scan_path, &scan_word))
                    .await
                    .unwrap_or(TermScan {
                        found: false,
                        budget_hit: false,
                    });

                // A budget-capped miss is not conclusive; keep the file.
                if scan.found || scan.budget_hit {
                    if let Ok(mut list) = candidates.lock() {
                        list.push(path);
                    }
                }
            }
        }));
    }

    let walk_ctx = Arc::clone(&ctx);
    let walk_candidates = Arc::clone(&candidates);
    let walk_processed = Arc::clone(&processed);

    let producer = tokio::task::spawn_blocking(move || {
        let walker = WalkBuilder::new(walk_ctx.config.root())
            .standard_filters(false)
            .follow_links(false)
            .filter_entry(|entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir && should_skip_directory(&entry.file_name().to_string_lossy()))
            })
            .build();

        for entry in walker {
            if walk_ctx.cancel.is_cancelled() {
                break;
            }
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!("discovery: skipping unreadable entry: {err}");
                    continue;
                }
            };
            if entry.file_type().is_some_and(|t| t.is_dir()) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }

            let path = entry.path().to_path_buf();
            if !walk_ctx.allow.contains(&extension_of(&path)) {
                continue;
            }

            let current = walk_processed.fetch_add(1, Ordering::Relaxed) + 1;
            walk_ctx.emit_progress(SearchStage::Discovery, current, 0, &path);

            let format = FileFormat::from_path(&path);
            if format.is_heavy() {
                if format == FileFormat::Pdf {
                    // Never content-scanned here; the governor owns PDF reads.
                    if let Ok(mut list) = walk_candidates.lock() {
                        list.push(path);
                    }
                    continue;
                }

                let cap = match format {
                    FileFormat::Eml | FileFormat::Msg | FileFormat::Mbox => EMAIL_PREFILTER_CAP,
                    _ => DISCOVERY_HEAVY_CAP,
                };
                let outcome =
                    prefilter_file(&path, format, &walk_ctx.prefilter_terms, Some(cap));
                if outcome.is_conclusive_miss() {
                    continue;
                }
                if let Ok(mut list) = walk_candidates.lock() {
                    list.push(path);
                }
                continue;
            }

            if scan_tx.blocking_send(path).is_err() {
                warn!("discovery: scan workers gone, stopping walk");
                break;
            }
        }
        // Dropping scan_tx closes the queue and drains the workers.
    });

    if let Err(err) = producer.await {
        warn!("discovery walk task failed: {err}");
    }
    futures::future::join_all(workers).await;

    let found = Arc::try_unwrap(candidates)
        .map(|m| m.into_inner().unwrap_or_default())
        .unwrap_or_default();

    debug!("discovery: {} candidates", found.len());
    Ok(found)
}
