//! Extension allow-lists, directory skip-list, and per-format byte caps
//!
//! All sets are read-only after construction; the hot path does O(1)
//! lookups against them.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// File extensions treated as documents (searched by default), without dots.
pub const DOCUMENT_EXTENSIONS: &[&str] = &[
    "txt", "md", "html", "htm", "xhtml", "shtml", "xml", "csv", "yaml", "yml", "cfg", "conf",
    "ini", "log", "rtf", "eml", "mbox", "msg", "pdf", "doc", "docx", "odt", "sh", "bat", "cmd",
    "tex", "rst", "asciidoc",
];

/// File extensions treated as code (searched only with `include_code`).
pub const CODE_EXTENSIONS: &[&str] = &[
    "js", "ts", "sql", "py", "php", "java", "cpp", "c", "json", "go", "rs", "rb", "cs", "swift",
    "kt", "scala", "h", "hpp", "cc",
];

/// Directory names that are never descended into.
pub const SKIP_DIRECTORIES: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    "node_modules",
    ".vscode",
    ".idea",
    "__pycache__",
    ".pytest_cache",
    "vendor",
    "target",
    "build",
    "dist",
    ".next",
    ".nuxt",
    "coverage",
    "tmp",
    "temp",
    ".DS_Store",
];

static SKIP_DIRECTORY_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| SKIP_DIRECTORIES.iter().copied().collect());

/// Whether a directory entry name should be pruned from traversal.
///
/// Any name beginning with `.` is skipped in addition to the fixed list.
#[must_use]
pub fn should_skip_directory(name: &str) -> bool {
    SKIP_DIRECTORY_SET.contains(name) || name.starts_with('.')
}

/// Build the effective extension allow-list for a search.
#[must_use]
pub fn allowed_extensions(include_code: bool) -> HashSet<String> {
    let mut set: HashSet<String> = DOCUMENT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect();
    if include_code {
        set.extend(CODE_EXTENSIONS.iter().map(|e| (*e).to_string()));
    }
    #[cfg(not(feature = "pdf"))]
    set.remove("pdf");
    set
}

/// Chunk size for all streaming scans.
pub const SCAN_CHUNK_SIZE: usize = 64 * 1024;

/// Overlap carried between chunks for multi-term prefilter scans.
pub const PREFILTER_OVERLAP: usize = 128;

/// Minimum overlap for single-term scans (grown to the term length).
pub const MIN_SCAN_OVERLAP: usize = 32;

/// Prefilter byte cap for EML, MSG, and MBOX files.
pub const EMAIL_PREFILTER_CAP: u64 = 256 * 1024;

/// Prefilter byte cap for RTF files.
pub const RTF_PREFILTER_CAP: u64 = 1024 * 1024;

/// Prefilter byte cap for the DOCX/ODT document XML entry.
pub const OFFICE_XML_PREFILTER_CAP: u64 = 5 * 1024 * 1024;

/// Total prefilter byte cap across legacy `.doc` OLE streams.
pub const DOC_OLE_PREFILTER_CAP: u64 = 2 * 1024 * 1024;

/// Discovery-stage prefilter cap for non-email heavy formats.
pub const DISCOVERY_HEAVY_CAP: u64 = 2 * 1024 * 1024;

/// Maximum bytes of text considered per PDF page.
pub const PDF_PAGE_TEXT_CAP: usize = 128 * 1024;

/// Maximum PDF pages examined per scan.
pub const PDF_PAGE_CAP: usize = 200;

/// Derive the streaming read budget from a file's size.
///
/// Small files are read entirely; larger files are capped so no scan ever
/// holds more than a chunk in memory or reads unbounded bytes.
#[must_use]
pub fn read_budget(file_size: u64) -> u64 {
    const MIB: u64 = 1024 * 1024;
    if file_size > 50 * MIB {
        10 * MIB
    } else if file_size > 10 * MIB {
        5 * MIB
    } else {
        file_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_list_covers_dot_prefixed_names() {
        assert!(should_skip_directory(".git"));
        assert!(should_skip_directory(".cache"));
        assert!(should_skip_directory("node_modules"));
        assert!(!should_skip_directory("src"));
    }

    #[test]
    fn code_extensions_require_opt_in() {
        let docs = allowed_extensions(false);
        assert!(docs.contains("txt"));
        assert!(!docs.contains("rs"));
        let with_code = allowed_extensions(true);
        assert!(with_code.contains("rs"));
    }

    #[test]
    fn read_budget_tiers() {
        const MIB: u64 = 1024 * 1024;
        assert_eq!(read_budget(1000), 1000);
        assert_eq!(read_budget(20 * MIB), 5 * MIB);
        assert_eq!(read_budget(60 * MIB), 10 * MIB);
    }
}
