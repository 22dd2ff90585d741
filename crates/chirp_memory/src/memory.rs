//! Anti-repeat memory.

use crate::MemoryStore;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Default number of recent selections to remember.
pub const DEFAULT_MEMORY_DURATION: usize = 1;

/// Store and key a memory mirrors itself to.
#[derive(Clone)]
struct RemoteSync {
    store: Arc<dyn MemoryStore>,
    key: String,
}

impl fmt::Debug for RemoteSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSync")
            .field("backend", &self.store.backend_name())
            .field("key", &self.key)
            .finish()
    }
}

/// Bounded FIFO window of recently used content indices.
///
/// Length never exceeds `capacity`; the oldest entry is evicted first.
/// One instance exists per content sequence.
#[derive(Debug, Clone)]
pub struct AntiRepeatMemory {
    entries: VecDeque<usize>,
    capacity: usize,
    sync: Option<RemoteSync>,
}

impl AntiRepeatMemory {
    /// Create an empty, local-only memory.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.saturating_add(1)),
            capacity,
            sync: None,
        }
    }

    /// Create an empty memory mirrored to `store` under `key`.
    pub fn with_store(capacity: usize, store: Arc<dyn MemoryStore>, key: impl Into<String>) -> Self {
        let mut memory = Self::new(capacity);
        memory.sync = Some(RemoteSync {
            store,
            key: key.into(),
        });
        memory
    }

    /// Maximum number of remembered indices.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of remembered indices.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether this memory mirrors itself to a store.
    pub fn is_synced(&self) -> bool {
        self.sync.is_some()
    }

    /// Remote key, if mirrored.
    pub fn remote_key(&self) -> Option<&str> {
        self.sync.as_ref().map(|s| s.key.as_str())
    }

    /// Whether `index` was used recently.
    pub fn contains(&self, index: usize) -> bool {
        self.entries.contains(&index)
    }

    /// Current contents, oldest first.
    pub fn snapshot(&self) -> Vec<usize> {
        self.entries.iter().copied().collect()
    }

    /// Record `index` as just used, evicting the oldest entries past capacity.
    ///
    /// When mirrored, the full snapshot is written to the store in a detached
    /// task. The write is never awaited or retried; failures are only logged.
    pub fn remember(&mut self, index: usize) {
        self.entries.push_back(index);
        self.evict();
        debug!(index, memory = ?self.entries, "Remembering");
        self.sync_remote();
    }

    /// Replace the contents wholesale, keeping at most the newest `capacity`.
    pub fn replace(&mut self, entries: impl IntoIterator<Item = usize>) {
        self.entries = entries.into_iter().collect();
        self.evict();
    }

    fn evict(&mut self) {
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    fn sync_remote(&self) {
        let Some(sync) = self.sync.clone() else {
            return;
        };
        let snapshot = self.snapshot();

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(key = %sync.key, "No async runtime available, skipping remote memory write");
            return;
        };

        handle.spawn(async move {
            match sync.store.put_memory(&sync.key, &snapshot).await {
                Ok(()) => debug!(key = %sync.key, memory = ?snapshot, "Remote memory updated"),
                Err(e) => warn!(key = %sync.key, error = %e, "There was a problem remembering remotely"),
            }
        });
    }

    /// Reload contents from the store, if mirrored.
    ///
    /// Any failure leaves the memory untouched and is only logged; the agent
    /// stays operational with an empty window.
    #[instrument(skip(self), fields(key = self.remote_key()))]
    pub async fn restore(&mut self) {
        let Some(sync) = self.sync.clone() else {
            debug!("No remote store configured, nothing to restore");
            return;
        };

        info!("Attempting to restore memory");
        match sync.store.get_memory(&sync.key).await {
            Ok(Some(entries)) => {
                self.replace(entries);
                info!(memory = ?self.entries, "Successfully restored memory");
            }
            Ok(None) => info!("No stored memory found"),
            Err(e) => warn!(error = %e, "There was a problem restoring memory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_exceeds_capacity() {
        let mut memory = AntiRepeatMemory::new(3);
        for i in 0..10 {
            memory.remember(i);
            assert!(memory.len() <= 3);
        }
        assert_eq!(memory.snapshot(), vec![7, 8, 9]);
    }

    #[test]
    fn test_zero_capacity_remembers_nothing() {
        let mut memory = AntiRepeatMemory::new(0);
        memory.remember(1);
        assert!(memory.is_empty());
        assert!(!memory.contains(1));
    }

    #[test]
    fn test_duplicates_occupy_separate_slots() {
        let mut memory = AntiRepeatMemory::new(2);
        memory.remember(5);
        memory.remember(5);
        memory.remember(6);
        assert_eq!(memory.snapshot(), vec![5, 6]);
    }

    #[test]
    fn test_replace_keeps_newest() {
        let mut memory = AntiRepeatMemory::new(2);
        memory.replace(vec![1, 2, 3, 4]);
        assert_eq!(memory.snapshot(), vec![3, 4]);
    }

    #[test]
    fn test_remember_without_runtime_is_local_only() {
        let store = Arc::new(crate::InMemoryStore::new());
        let mut memory = AntiRepeatMemory::with_store(1, store.clone(), "posts");
        memory.remember(2);
        assert_eq!(memory.snapshot(), vec![2]);
        assert!(store.is_empty());
    }
}
