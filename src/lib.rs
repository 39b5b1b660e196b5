//! docscout — local document search with a proximity window
//!
//! Given an ordered list of query terms and an optional exclusion list,
//! docscout walks a working directory and finds the files in which *all*
//! terms occur within a bounded character window, extracting highlighted
//! excerpts for each match. Plain text, source code, structured text
//! (HTML/XML/CSV/YAML), email containers (EML, MBOX, MSG), and office
//! containers (DOCX, ODT, RTF, and optionally PDF behind the `pdf`
//! feature) are supported.
//!
//! Every search is a fresh filesystem walk: no index, no persistent
//! state, no ranking — results are all files satisfying the predicate.
//!
//! ```no_run
//! use docscout::{SearchConfig, SearchEngine, SearchQuery};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let query = SearchQuery::new(["contract", "payment", "agreement"]);
//! let config = SearchConfig::builder().root("./documents").build()?;
//! let engine = SearchEngine::new(query, config)?;
//! for result in engine.execute().await? {
//!     println!("{} ({} excerpts)", result.path.display(), result.excerpts.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod excerpt;
pub mod extractors;
pub mod matcher;
pub mod scanner;
pub mod search_engine;

pub use config::{SearchConfig, SearchConfigBuilder, SearchQuery};
pub use error::{Result, SearchError};
pub use search_engine::{
    format_file_size, MetricsSnapshot, NoOpProgress, ProgressReporter, SearchEngine, SearchEvent,
    SearchEventBus, SearchEventError, SearchMetrics, SearchResult, SearchStage,
};

pub use excerpt::{HIGHLIGHT_CLOSE, HIGHLIGHT_OPEN};
pub use extractors::FileFormat;
pub use matcher::TermSet;
pub use scanner::PrefilterOutcome;
