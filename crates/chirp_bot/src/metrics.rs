//! Counters for agent activity.

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Shared activity counters.
///
/// Cheap to clone; all clones observe the same counts.
#[derive(Debug, Clone, Default)]
pub struct AgentMetrics {
    inner: Arc<AgentMetricsInner>,
}

#[derive(Debug, Default)]
struct AgentMetricsInner {
    posts_published: AtomicU64,
    replies_published: AtomicU64,
    mentions_heard: AtomicU64,
    cycles_skipped: AtomicU64,
    publish_failures: AtomicU64,
    last_publish: parking_lot::Mutex<Option<Instant>>,
}

/// Point-in-time copy of [`AgentMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Proactive posts published.
    pub posts_published: u64,
    /// Replies published.
    pub replies_published: u64,
    /// Mentions that passed the filter.
    pub mentions_heard: u64,
    /// Cycles skipped because nothing could be selected.
    pub cycles_skipped: u64,
    /// Publish chains abandoned on error.
    pub publish_failures: u64,
    /// Seconds since the last successful publish.
    pub seconds_since_last_publish: Option<u64>,
}

impl AgentMetrics {
    /// Creates a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a published post.
    pub fn record_post(&self) {
        self.inner.posts_published.fetch_add(1, Ordering::Relaxed);
        *self.inner.last_publish.lock() = Some(Instant::now());
    }

    /// Records a published reply.
    pub fn record_reply(&self) {
        self.inner.replies_published.fetch_add(1, Ordering::Relaxed);
        *self.inner.last_publish.lock() = Some(Instant::now());
    }

    /// Records a mention that will be answered.
    pub fn record_mention(&self) {
        self.inner.mentions_heard.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a skipped cycle.
    pub fn record_skip(&self) {
        self.inner.cycles_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an abandoned publish chain.
    pub fn record_failure(&self) {
        self.inner.publish_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Proactive posts published so far.
    pub fn posts_published(&self) -> u64 {
        self.inner.posts_published.load(Ordering::Relaxed)
    }

    /// Replies published so far.
    pub fn replies_published(&self) -> u64 {
        self.inner.replies_published.load(Ordering::Relaxed)
    }

    /// Copy every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            posts_published: self.posts_published(),
            replies_published: self.replies_published(),
            mentions_heard: self.inner.mentions_heard.load(Ordering::Relaxed),
            cycles_skipped: self.inner.cycles_skipped.load(Ordering::Relaxed),
            publish_failures: self.inner.publish_failures.load(Ordering::Relaxed),
            seconds_since_last_publish: self
                .inner
                .last_publish
                .lock()
                .map(|t| t.elapsed().as_secs()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_counts() {
        let metrics = AgentMetrics::new();
        let clone = metrics.clone();
        clone.record_post();
        clone.record_skip();
        metrics.record_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.posts_published, 1);
        assert_eq!(snapshot.cycles_skipped, 1);
        assert_eq!(snapshot.publish_failures, 1);
        assert!(snapshot.seconds_since_last_publish.is_some());
    }
}
