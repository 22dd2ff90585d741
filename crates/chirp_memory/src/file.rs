//! JSON file memory store.

use crate::{MemoryStore, StoreResult};
use async_trait::async_trait;
use chirp_error::{PersistenceError, PersistenceErrorKind};
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Memory store keeping one JSON file per key in a directory.
///
/// Gives restart survival on a single host without a remote service.
#[derive(Debug, Clone)]
pub struct JsonFileMemoryStore {
    dir: PathBuf,
}

impl JsonFileMemoryStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        if key.is_empty() || key.contains(|c: char| c == '/' || c == '\\') || key.starts_with('.') {
            return Err(PersistenceError::new(PersistenceErrorKind::Io(format!(
                "invalid memory key: {:?}",
                key
            ))));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

fn io_error(e: std::io::Error) -> PersistenceError {
    PersistenceError::new(PersistenceErrorKind::Io(e.to_string()))
}

#[async_trait]
impl MemoryStore for JsonFileMemoryStore {
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn get_memory(&self, key: &str) -> StoreResult<Option<Vec<usize>>> {
        let path = self.path_for(key)?;
        debug!(path = %path.display(), "Loading memory");
        if !tokio::fs::try_exists(&path).await.map_err(io_error)? {
            return Ok(None);
        }
        let json = tokio::fs::read_to_string(&path).await.map_err(io_error)?;
        let entries = serde_json::from_str(&json)
            .map_err(|e| PersistenceError::new(PersistenceErrorKind::Decode(e.to_string())))?;
        Ok(Some(entries))
    }

    #[instrument(skip(self, entries), fields(dir = %self.dir.display(), len = entries.len()))]
    async fn put_memory(&self, key: &str, entries: &[usize]) -> StoreResult<()> {
        let path = self.path_for(key)?;
        debug!(path = %path.display(), "Saving memory");
        tokio::fs::create_dir_all(&self.dir).await.map_err(io_error)?;
        let json = serde_json::to_string(entries)
            .map_err(|e| PersistenceError::new(PersistenceErrorKind::Decode(e.to_string())))?;
        tokio::fs::write(&path, json).await.map_err(io_error)?;
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "json_file"
    }
}
