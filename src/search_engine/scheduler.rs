//! Timeout and panic isolation around extractor calls
//!
//! Extractors run on the blocking pool under a deadline. A deadline hit
//! cancels the caller's wait — not the classification: callers must treat
//! [`SearchError::Timeout`] and [`SearchError::ExtractorPanic`] as
//! indeterminate, never as "file does not match". The spawned call itself
//! is not interrupted; the deadline is what bounds the caller.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::{Result, SearchError};

/// Semaphore gating every extractor call that reads beyond prefilter caps.
#[derive(Debug, Clone)]
pub struct HeavyGate {
    semaphore: Arc<Semaphore>,
}

impl HeavyGate {
    #[must_use]
    pub fn new(slots: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(slots.max(1))),
        }
    }

    /// Wait for a heavy-extraction slot.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit> {
        Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| SearchError::Cancelled)
    }
}

/// Run a synchronous extraction on the blocking pool with a deadline and a
/// panic boundary.
///
/// # Errors
///
/// [`SearchError::Timeout`] when `deadline` elapses first and
/// [`SearchError::ExtractorPanic`] when the call panicked inside a
/// decoder; both are indeterminate outcomes.
pub async fn run_extraction<T, F>(work: F, deadline: Duration, operation: &'static str) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::task::spawn_blocking(work);

    match tokio::time::timeout(deadline, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) if join_error.is_panic() => {
            log::debug!("{operation}: extractor panicked, treating as empty text");
            Err(SearchError::ExtractorPanic { operation })
        }
        Ok(Err(_)) => Err(SearchError::Cancelled),
        Err(_) => Err(SearchError::Timeout {
            operation,
            deadline,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_within_deadline() {
        let result =
            run_extraction(|| Ok::<_, SearchError>(42), Duration::from_secs(5), "test").await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn deadline_produces_timeout() {
        let result = run_extraction(
            || {
                std::thread::sleep(Duration::from_millis(200));
                Ok::<_, SearchError>(())
            },
            Duration::from_millis(20),
            "slow",
        )
        .await;
        assert!(matches!(result, Err(SearchError::Timeout { .. })));
        assert!(result.unwrap_err().is_indeterminate());
    }

    #[tokio::test]
    async fn panic_is_contained() {
        let result = run_extraction::<(), _>(
            || panic!("decoder exploded"),
            Duration::from_secs(5),
            "fragile",
        )
        .await;
        assert!(matches!(result, Err(SearchError::ExtractorPanic { .. })));
    }

    #[tokio::test]
    async fn gate_bounds_concurrency() {
        let gate = HeavyGate::new(1);
        let first = gate.acquire().await.unwrap();
        let gate2 = gate.clone();
        let waiter = tokio::spawn(async move { gate2.acquire().await.map(|_| ()) });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());
        drop(first);
        waiter.await.unwrap().unwrap();
    }
}
