//! HTTP memory store for JSON-bin style services.

use crate::{MemoryStore, StoreResult};
use async_trait::async_trait;
use chirp_error::{PersistenceError, PersistenceErrorKind};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, instrument};

/// Upper bound on a single store call unless configured otherwise.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(30);

/// Memory store talking to a JSON-bin service.
///
/// Each key is a bin at `{base_url}/{key}` holding a JSON array of integers.
/// `GET` reads it (404 means nothing stored yet), `PUT` replaces it.
#[derive(Debug, Clone)]
pub struct HttpMemoryStore {
    client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
}

impl HttpMemoryStore {
    /// Create a store for the service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a store sharing an existing HTTP client.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            request_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Give up on any single store call after `timeout`.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// URL of the bin holding `key`.
    pub fn bin_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

fn request_error(e: reqwest::Error) -> PersistenceError {
    PersistenceError::new(PersistenceErrorKind::Request(e.to_string()))
}

#[async_trait]
impl MemoryStore for HttpMemoryStore {
    #[instrument(skip(self))]
    async fn get_memory(&self, key: &str) -> StoreResult<Option<Vec<usize>>> {
        let url = self.bin_url(key);
        debug!(%url, "Fetching memory");

        let response = self
            .client
            .get(&url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(request_error)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(PersistenceError::new(PersistenceErrorKind::Status(
                status.as_u16(),
            )));
        }

        let body = response.text().await.map_err(request_error)?;
        let entries = serde_json::from_str::<Vec<usize>>(&body).map_err(|e| {
            PersistenceError::new(PersistenceErrorKind::Decode(format!("{}: {}", e, body)))
        })?;
        Ok(Some(entries))
    }

    #[instrument(skip(self, entries), fields(len = entries.len()))]
    async fn put_memory(&self, key: &str, entries: &[usize]) -> StoreResult<()> {
        let url = self.bin_url(key);
        debug!(%url, "Storing memory");

        let response = self
            .client
            .put(&url)
            .timeout(self.request_timeout)
            .json(entries)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PersistenceError::new(PersistenceErrorKind::Status(
                status.as_u16(),
            )));
        }
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "http"
    }
}
