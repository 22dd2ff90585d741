//! Tests for memory mirroring and restore.

use async_trait::async_trait;
use chirp_error::{PersistenceError, PersistenceErrorKind};
use chirp_memory::{AntiRepeatMemory, InMemoryStore, MemoryStore, StoreResult};
use std::sync::Arc;

/// Store that fails every call.
struct BrokenStore;

#[async_trait]
impl MemoryStore for BrokenStore {
    async fn get_memory(&self, _key: &str) -> StoreResult<Option<Vec<usize>>> {
        Err(PersistenceError::new(PersistenceErrorKind::Status(503)))
    }

    async fn put_memory(&self, _key: &str, _entries: &[usize]) -> StoreResult<()> {
        Err(PersistenceError::new(PersistenceErrorKind::Request(
            "connection refused".to_string(),
        )))
    }

    fn backend_name(&self) -> &str {
        "broken"
    }
}

/// Store that answers reads with a fixed payload.
struct FixedStore(Vec<usize>);

#[async_trait]
impl MemoryStore for FixedStore {
    async fn get_memory(&self, _key: &str) -> StoreResult<Option<Vec<usize>>> {
        Ok(Some(self.0.clone()))
    }

    async fn put_memory(&self, _key: &str, _entries: &[usize]) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "fixed"
    }
}

async fn wait_for(store: &InMemoryStore, key: &str, expected: &[usize]) -> bool {
    for _ in 0..100 {
        if store.get_memory(key).await.unwrap().as_deref() == Some(expected) {
            return true;
        }
        tokio::task::yield_now().await;
    }
    false
}

#[tokio::test]
async fn test_remember_mirrors_full_snapshot() {
    let store = Arc::new(InMemoryStore::new());
    let mut memory = AntiRepeatMemory::with_store(2, store.clone(), "posts");

    memory.remember(3);
    assert!(wait_for(&store, "posts", &[3]).await);

    memory.remember(8);
    memory.remember(1);
    assert!(wait_for(&store, "posts", &[8, 1]).await);
}

#[tokio::test]
async fn test_write_failure_is_not_propagated() {
    let mut memory = AntiRepeatMemory::with_store(1, Arc::new(BrokenStore), "posts");
    memory.remember(4);
    tokio::task::yield_now().await;
    assert_eq!(memory.snapshot(), vec![4]);
}

#[tokio::test]
async fn test_restore_replaces_contents() {
    let store = Arc::new(InMemoryStore::new());
    store.put_memory("replies", &[2, 5]).await.unwrap();

    let mut memory = AntiRepeatMemory::with_store(3, store, "replies");
    memory.restore().await;
    assert_eq!(memory.snapshot(), vec![2, 5]);
    assert!(memory.contains(5));
}

#[tokio::test]
async fn test_restore_truncates_to_capacity() {
    let mut memory = AntiRepeatMemory::with_store(2, Arc::new(FixedStore(vec![1, 2, 3])), "k");
    memory.restore().await;
    assert_eq!(memory.snapshot(), vec![2, 3]);
}

#[tokio::test]
async fn test_restore_failure_leaves_memory_empty() {
    let mut memory = AntiRepeatMemory::with_store(2, Arc::new(BrokenStore), "posts");
    memory.restore().await;
    assert!(memory.is_empty());
}

#[tokio::test]
async fn test_restore_missing_key_leaves_memory_empty() {
    let mut memory = AntiRepeatMemory::with_store(2, Arc::new(InMemoryStore::new()), "nothing");
    memory.restore().await;
    assert!(memory.is_empty());
}

#[tokio::test]
async fn test_restore_without_store_is_noop() {
    let mut memory = AntiRepeatMemory::new(2);
    memory.remember(1);
    memory.restore().await;
    assert_eq!(memory.snapshot(), vec![1]);
}
