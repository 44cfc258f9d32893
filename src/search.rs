//! Debounced client-side search.
//!
//! The dashboard search boxes would otherwise re-query the backend on every
//! keystroke. The debouncer collapses a burst of keystrokes so only the
//! latest value within the window fires a fetch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Generation-counter debouncer. Each keystroke bumps the sequence; after
/// the delay, only the holder of the latest sequence number proceeds.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    seq: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Default window used by the dashboard search boxes.
    pub fn for_search() -> Self {
        Self::new(Duration::from_millis(300))
    }

    /// Wait out the debounce window. Returns `true` when no newer call
    /// arrived in the meantime, i.e. this keystroke is the one that should
    /// trigger the fetch.
    pub async fn settle(&self) -> bool {
        let mine = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        self.seq.load(Ordering::SeqCst) == mine
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn a_lone_keystroke_settles() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        assert!(debouncer.settle().await);
    }

    #[tokio::test(start_paused = true)]
    async fn only_the_latest_keystroke_settles() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let first = debouncer.settle();
        let second = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            debouncer.settle().await
        };
        let (first_won, second_won) = tokio::join!(first, second);
        assert!(!first_won);
        assert!(second_won);
    }

    #[tokio::test(start_paused = true)]
    async fn a_burst_settles_exactly_once() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let mut settled = 0;
        for _ in 0..5 {
            // Sequential calls: each later call invalidates the earlier one
            // only if it arrives inside the window, which these do not.
            if debouncer.settle().await {
                settled += 1;
            }
        }
        assert_eq!(settled, 5);

        let burst = tokio::join!(
            debouncer.settle(),
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                debouncer.settle().await
            },
            async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                debouncer.settle().await
            }
        );
        assert_eq!(
            [burst.0, burst.1, burst.2]
                .iter()
                .filter(|won| **won)
                .count(),
            1
        );
    }
}
