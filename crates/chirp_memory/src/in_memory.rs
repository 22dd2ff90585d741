//! Process-local memory store.

use crate::{MemoryStore, StoreResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Memory store backed by a map in process memory.
///
/// Survives nothing. Dry runs mirror into it so real stores stay untouched.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, Vec<usize>>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether no key has been stored.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn get_memory(&self, key: &str) -> StoreResult<Option<Vec<usize>>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn put_memory(&self, key: &str, entries: &[usize]) -> StoreResult<()> {
        self.entries.lock().insert(key.to_string(), entries.to_vec());
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "in_memory"
    }
}
