//! Result construction: re-extract matching files and build excerpts

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use log::debug;

use crate::cleaner::clean_content;
use crate::error::SearchError;
use crate::excerpt::build_excerpts;
use crate::extractors::{extract_text, FileFormat};

use super::context::SearchContext;
use super::events::SearchEvent;
use super::scheduler::run_extraction;

static DATE_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^date:[ \t]*(.+)$").expect("static pattern"));
static SUBJECT_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^subject:[ \t]*(.+)$").expect("static pattern"));

/// A file satisfying the whole query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Absolute path to the matching file.
    pub path: PathBuf,
    /// File size in bytes (the real size, not the capped read).
    pub file_size: u64,
    /// Highlighted excerpts; the first covers all terms when they could
    /// be located in the cleaned text.
    pub excerpts: Vec<String>,
    /// `Date:` header for email formats, verbatim.
    pub email_date: Option<String>,
    /// `Subject:` header for email formats, verbatim.
    pub email_subject: Option<String>,
}

/// Human-readable file size, `1.5 MB` style.
#[must_use]
pub fn format_file_size(size: u64) -> String {
    const UNIT: u64 = 1024;
    if size < UNIT {
        return format!("{size} B");
    }
    let mut div = UNIT;
    let mut exp = 0usize;
    let mut n = size / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    format!("{:.1} {}B", size as f64 / div as f64, &"KMGTPE"[exp..=exp])
}

/// First capture of a header pattern in raw email bytes.
fn raw_header(raw: &[u8], pattern: &Regex) -> Option<String> {
    let text = String::from_utf8_lossy(raw);
    pattern
        .captures(&text)
        .map(|caps| caps[1].trim().to_string())
}

/// Build results for every matching path, emitting each over the bus as
/// it is produced. Files whose re-extraction yields no text at all are
/// silently dropped; that is the only way a classified match disappears
/// here.
pub(crate) async fn build_results(
    ctx: Arc<SearchContext>,
    matching: Vec<PathBuf>,
) -> Vec<SearchResult> {
    let mut results = Vec::with_capacity(matching.len());

    for path in matching {
        if ctx.cancel.is_cancelled() {
            break;
        }
        let Some(result) = build_one(&ctx, &path).await else {
            continue;
        };
        if let Some(bus) = &ctx.bus {
            let _ = bus.publish(SearchEvent::result_found(result.clone()));
        }
        results.push(result);
    }

    results
}

async fn build_one(ctx: &Arc<SearchContext>, path: &Path) -> Option<SearchResult> {
    let format = FileFormat::from_path(path);

    let read_ctx = Arc::clone(ctx);
    let read_path = path.to_path_buf();
    let (raw, file_size) = tokio::task::spawn_blocking(move || {
        read_ctx.read_raw_capped(&read_path)
    })
    .await
    .ok()?
    .ok()?;

    let (email_date, email_subject) = if matches!(format, FileFormat::Eml | FileFormat::Msg) {
        (
            raw_header(&raw, &DATE_HEADER),
            raw_header(&raw, &SUBJECT_HEADER),
        )
    } else {
        (None, None)
    };

    let text = if format.is_binary() {
        let permit = ctx.heavy.acquire().await.ok()?;
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
            Ok(text) => text,
            Err(err @ SearchError::Timeout { .. }) => {
                ctx.metrics.record_extract_timeout();
                debug!("{}: result-stage extraction: {err}", path.display());
                return None;
            }
            Err(err) => {
                debug!("{}: result-stage extraction: {err}", path.display());
                return None;
            }
        }
    } else {
        String::from_utf8_lossy(&raw).into_owned()
    };

    if text.trim().is_empty() {
        debug!("{}: no extractable text, dropping", path.display());
        return None;
    }

    let cleaned = clean_content(&text);
    if cleaned.is_empty() {
        return None;
    }

    let excerpts = build_excerpts(
        &cleaned,
        &ctx.terms,
        ctx.query.distance,
        ctx.config.max_excerpts(),
    );

    Some(SearchResult {
        path: std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
        file_size,
        excerpts,
        email_date,
        email_subject,
    })
}
