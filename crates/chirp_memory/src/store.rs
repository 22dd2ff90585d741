//! Memory store capability.

use async_trait::async_trait;
use chirp_error::PersistenceError;

/// Result type for memory store operations.
pub type StoreResult<T> = Result<T, PersistenceError>;

/// Key-value storage for ordered lists of content indices.
///
/// Implementations must preserve order: a `put_memory` followed by a
/// `get_memory` with no intervening writes returns the exact sequence.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Fetch the sequence stored under `key`.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet.
    async fn get_memory(&self, key: &str) -> StoreResult<Option<Vec<usize>>>;

    /// Replace the sequence stored under `key`.
    async fn put_memory(&self, key: &str, entries: &[usize]) -> StoreResult<()>;

    /// Backend name for logging.
    fn backend_name(&self) -> &str;
}
