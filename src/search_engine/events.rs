//! Typed search events over a broadcast bus
//!
//! Subscribers receive results and progress as they are produced, without
//! waiting for the run to finish. Delivery is best-effort: a bus with no
//! subscribers reports the condition and the engine carries on.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::broadcast;

use super::progress::SearchStage;
use super::results::SearchResult;

/// Error types for event bus operations
#[derive(Debug, thiserror::Error)]
pub enum SearchEventError {
    /// No active subscribers when publishing
    #[error("No active subscribers")]
    NoSubscribers,
}

/// Events emitted during a search run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SearchEvent {
    /// Emitted once when a search starts
    SearchStarted {
        terms: Vec<String>,
        root: PathBuf,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// Per-file progress; `total` is 0 when unknown
    Progress {
        stage: SearchStage,
        processed: usize,
        total: usize,
        path: PathBuf,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// A matching file with its excerpts
    ResultFound {
        result: SearchResult,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// Emitted once when the run completes
    SearchCompleted {
        total_results: usize,
        duration: Duration,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl SearchEvent {
    /// Create a `SearchStarted` event
    #[must_use]
    pub fn started(terms: Vec<String>, root: PathBuf) -> Self {
        Self::SearchStarted {
            terms,
            root,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create a `Progress` event
    #[must_use]
    pub fn progress(stage: SearchStage, processed: usize, total: usize, path: PathBuf) -> Self {
        Self::Progress {
            stage,
            processed,
            total,
            path,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create a `ResultFound` event
    #[must_use]
    pub fn result_found(result: SearchResult) -> Self {
        Self::ResultFound {
            result,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create a `SearchCompleted` event
    #[must_use]
    pub fn completed(total_results: usize, duration: Duration) -> Self {
        Self::SearchCompleted {
            total_results,
            duration,
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Broadcast bus for [`SearchEvent`]s with delivery counters.
#[derive(Debug)]
pub struct SearchEventBus {
    sender: broadcast::Sender<SearchEvent>,
    published: AtomicU64,
    dropped: AtomicU64,
}

impl SearchEventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            published: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Subscribe to all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SearchEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Whether anyone is listening.
    #[must_use]
    pub fn has_subscribers(&self) -> bool {
        self.subscriber_count() > 0
    }

    /// Publish an event to all subscribers, returning how many received it.
    ///
    /// # Errors
    ///
    /// Returns [`SearchEventError::NoSubscribers`] when nobody is listening;
    /// the event is counted as dropped.
    pub fn publish(&self, event: SearchEvent) -> Result<usize, SearchEventError> {
        match self.sender.send(event) {
            Ok(receivers) => {
                self.published.fetch_add(1, Ordering::Relaxed);
                Ok(receivers)
            }
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                Err(SearchEventError::NoSubscribers)
            }
        }
    }

    /// Events successfully published so far.
    #[must_use]
    pub fn published_count(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Events dropped for lack of subscribers.
    #[must_use]
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
