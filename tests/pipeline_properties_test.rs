//! Property-level checks over the public pipeline pieces

use docscout::search_engine::prefilter_file;
use docscout::{FileFormat, SearchConfig, SearchEngine, SearchQuery, TermSet};
use std::path::Path;
use tempfile::TempDir;

fn terms(words: &[&str]) -> TermSet {
    TermSet::compile(&words.iter().map(|w| (*w).to_string()).collect::<Vec<_>>()).unwrap()
}

/// Raising the cap can flip `decided` from false to true, never the other
/// direction, and never flips `found`.
#[test]
fn prefilter_cap_is_monotonic() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.eml");
    let mut content = vec![b'x'; 8 * 1024];
    content.extend_from_slice(b"\npayment appears late in the file\n");
    std::fs::write(&path, &content).unwrap();

    let t = terms(&["payment"]);

    let small = prefilter_file(&path, FileFormat::Eml, &t, Some(1024));
    let large = prefilter_file(&path, FileFormat::Eml, &t, Some(1024 * 1024));

    assert!(!small.decided, "small cap cannot decide");
    assert!(large.decided && large.found, "large cap reads to the match");
}

/// A conclusive miss requires reading the whole stream.
#[test]
fn conclusive_absence_only_at_eof() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.txt");
    std::fs::write(&path, "nothing interesting in here").unwrap();

    let outcome = prefilter_file(&path, FileFormat::Text, &terms(&["payment"]), None);
    assert!(outcome.is_conclusive_miss());

    let big = dir.path().join("big.rtf");
    let mut content = vec![b'y'; 64 * 1024];
    content.extend_from_slice(b" tail");
    std::fs::write(&big, &content).unwrap();
    let capped = prefilter_file(&big, FileFormat::Rtf, &terms(&["payment"]), Some(4096));
    assert!(!capped.decided, "cap exhaustion must stay undecided");
}

/// Discovery completeness: every allow-listed file outside skipped
/// directories reaches the filter unless stage 1 proves term absence.
#[tokio::test]
async fn discovery_reaches_every_eligible_file() {
    let dir = TempDir::new().unwrap();
    for i in 0..20 {
        std::fs::write(
            dir.path().join(format!("f{i}.txt")),
            format!("document number {i} mentions approval"),
        )
        .unwrap();
    }
    std::fs::write(dir.path().join("decoy.txt"), "no relevant words").unwrap();

    let query = SearchQuery::new(["approval"]);
    let config = SearchConfig::builder().root(dir.path()).build().unwrap();
    let engine = SearchEngine::new(query, config).unwrap();
    let results = engine.execute().await.unwrap();
    assert_eq!(results.len(), 20);
}

/// Result paths are absolute and unique.
#[tokio::test]
async fn results_are_unique_absolute_paths() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), "approval granted. approval again.").unwrap();

    let query = SearchQuery::new(["approval"]);
    let config = SearchConfig::builder().root(dir.path()).build().unwrap();
    let engine = SearchEngine::new(query, config).unwrap();
    let results = engine.execute().await.unwrap();

    assert_eq!(results.len(), 1);
    assert!(Path::new(&results[0].path).is_absolute());
}

/// The primary excerpt covers every term of a multi-term query.
#[tokio::test]
async fn primary_excerpt_covers_terms() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("a.txt"),
        "Intro text sits here. The contract describes the payment in detail. More text follows.",
    )
    .unwrap();

    let query = SearchQuery::new(["contract", "payment"]);
    let config = SearchConfig::builder().root(dir.path()).build().unwrap();
    let engine = SearchEngine::new(query, config).unwrap();
    let results = engine.execute().await.unwrap();

    let primary = &results[0].excerpts[0];
    assert!(primary.contains("«contract»"));
    assert!(primary.contains("«payment»"));
}

/// Excerpt budget scales with distance but stays clamped.
#[test]
fn excerpt_context_budget_clamps() {
    assert_eq!(docscout::excerpt::context_budget(10), 200);
    assert_eq!(docscout::excerpt::context_budget(5000), 4000);
    assert_eq!(docscout::excerpt::context_budget(1000), 2000);
}
