//! End-to-end search scenarios over real temporary directories

use docscout::{SearchConfig, SearchEngine, SearchQuery, SearchResult};
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

async fn search(dir: &TempDir, terms: &[&str]) -> Vec<SearchResult> {
    search_with(dir, terms, &[], 5000, false).await
}

async fn search_with(
    dir: &TempDir,
    terms: &[&str],
    excludes: &[&str],
    distance: usize,
    include_code: bool,
) -> Vec<SearchResult> {
    let mut query = SearchQuery::new(terms.iter().copied());
    query.exclude_words = excludes.iter().map(|s| (*s).to_string()).collect();
    query.distance = distance;
    query.include_code = include_code;

    let config = SearchConfig::builder().root(dir.path()).build().unwrap();
    let engine = SearchEngine::new(query, config).unwrap();
    engine.execute().await.unwrap()
}

fn result_names(results: &[SearchResult]) -> Vec<String> {
    let mut names: Vec<String> = results
        .iter()
        .map(|r| {
            Path::new(&r.path)
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn all_terms_in_one_sentence_match() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "a.txt",
        "the payment schedule in this contract requires full agreement",
    );

    let results = search(&dir, &["contract", "payment", "agreement"]).await;
    assert_eq!(result_names(&results), ["a.txt"]);

    let primary = &results[0].excerpts[0];
    assert!(primary.contains("«payment»"), "got: {primary}");
    assert!(primary.contains("«contract»"));
    assert!(primary.contains("«agreement»"));
}

#[tokio::test]
async fn files_missing_terms_are_excluded() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "a.txt",
        "the payment schedule in this contract requires full agreement",
    );
    write(&dir, "b.txt", "payment terms follow");

    let results = search(&dir, &["contract", "payment", "agreement"]).await;
    assert_eq!(result_names(&results), ["a.txt"]);
}

#[tokio::test]
async fn distance_window_bounds_matches() {
    let dir = TempDir::new().unwrap();
    let filler = "filler ".repeat(1000); // ~7000 chars
    write(&dir, "a.txt", &format!("contract {filler} payment"));

    let far = search_with(&dir, &["contract", "payment"], &[], 5000, false).await;
    assert!(far.is_empty(), "span exceeds the window");

    let near = search_with(&dir, &["contract", "payment"], &[], 10000, false).await;
    assert_eq!(result_names(&near), ["a.txt"]);
}

#[tokio::test]
async fn plural_matching_is_asymmetric() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.txt", "CATS are here");
    let results = search(&dir, &["cat"]).await;
    assert_eq!(result_names(&results), ["a.txt"], "cats matches query cat");

    let dir2 = TempDir::new().unwrap();
    write(&dir2, "a.txt", "CAT is here");
    let results = search(&dir2, &["cats"]).await;
    assert!(results.is_empty(), "query cats must not match bare cat");
}

#[tokio::test]
async fn embedded_words_do_not_match() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.txt", "concatenate");
    let results = search(&dir, &["cat"]).await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn eml_bodies_match_without_headers() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "a.eml",
        "From: alice@example.com\r\nTo: bob@example.com\r\nSubject: contract\r\nDate: Mon, 1 Jan 2024 10:00:00 +0000\r\nContent-Type: text/plain\r\n\r\nplease sign the agreement\r\n",
    );
    write(
        &dir,
        "b.eml",
        "From: carol@example.com\r\nSubject: reminder\r\nMIME-Version: 1.0\r\nContent-Type: text/html\r\n\r\n<p>please sign the <b>agreement</b></p>\r\n",
    );

    let results = search(&dir, &["sign", "agreement"]).await;
    assert_eq!(result_names(&results), ["a.eml", "b.eml"]);

    for result in &results {
        for excerpt in &result.excerpts {
            assert!(
                !excerpt.contains("Content-Type"),
                "headers leaked into excerpt: {excerpt}"
            );
        }
        assert!(result.email_date.is_some() || result.email_subject.is_some());
    }
}

#[tokio::test]
async fn word_excludes_drop_files() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.txt", "approved");
    write(&dir, "b.txt", "approved but test file");

    let results = search_with(&dir, &["approved"], &["test"], 5000, false).await;
    assert_eq!(result_names(&results), ["a.txt"]);
}

#[tokio::test]
async fn extension_excludes_skip_without_reading() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.txt", "approved");
    write(&dir, "a.pdf", "approved raw bytes pretending to be a pdf");

    let results = search_with(&dir, &["approved"], &[".pdf"], 5000, false).await;
    assert_eq!(result_names(&results), ["a.txt"]);
}

#[tokio::test]
async fn skip_list_directories_are_not_searched() {
    let dir = TempDir::new().unwrap();
    write(&dir, "keep.txt", "approved content");
    write(&dir, "node_modules/dep.txt", "approved content");
    write(&dir, ".git/config.txt", "approved content");
    write(&dir, "nested/ok.txt", "approved content");

    let results = search(&dir, &["approved"]).await;
    assert_eq!(result_names(&results), ["keep.txt", "ok.txt"]);
}

#[tokio::test]
async fn code_files_require_opt_in() {
    let dir = TempDir::new().unwrap();
    write(&dir, "main.rs", "fn main() { let approved = true; }");

    let without = search(&dir, &["approved"]).await;
    assert!(without.is_empty());

    let with = search_with(&dir, &["approved"], &[], 5000, true).await;
    assert_eq!(result_names(&with), ["main.rs"]);
}

#[tokio::test]
async fn docx_contents_are_searched() {
    use std::io::Write as _;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.docx");
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    writer
        .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer
        .write_all(b"<w:document><w:p><w:t>the contract covers payment</w:t></w:p></w:document>")
        .unwrap();
    writer.finish().unwrap();

    let results = search(&dir, &["contract", "payment"]).await;
    assert_eq!(result_names(&results), ["report.docx"]);
    assert!(!results[0].excerpts.is_empty());
}

#[tokio::test]
async fn mbox_messages_are_searched() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "archive.mbox",
        "From alice@example.com Mon Jan  1 10:00:00 2024\n\
         From: alice@example.com\n\
         Subject: one\n\
         \n\
         the contract needs payment first\n",
    );

    let results = search(&dir, &["contract", "payment"]).await;
    assert_eq!(result_names(&results), ["archive.mbox"]);
}

#[tokio::test]
async fn results_carry_real_file_size() {
    let dir = TempDir::new().unwrap();
    let content = "approved ".repeat(100);
    write(&dir, "a.txt", &content);

    let results = search(&dir, &["approved"]).await;
    assert_eq!(results[0].file_size, content.len() as u64);
}

#[tokio::test]
async fn cancelled_search_returns_partial_results() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.txt", "approved");

    let query = SearchQuery::new(["approved"]);
    let config = SearchConfig::builder().root(dir.path()).build().unwrap();
    let engine = SearchEngine::new(query, config).unwrap();
    engine.cancel_token().cancel();

    let results = engine.execute().await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn missing_root_is_the_only_fatal_error() {
    let query = SearchQuery::new(["anything"]);
    let config = SearchConfig::builder()
        .root("/definitely/not/a/real/directory")
        .build()
        .unwrap();
    let engine = SearchEngine::new(query, config).unwrap();
    assert!(engine.execute().await.is_err());
}

#[tokio::test]
async fn empty_query_is_rejected() {
    let config = SearchConfig::default();
    assert!(SearchEngine::new(SearchQuery::new(Vec::<String>::new()), config).is_err());
}
