//! Platform that publishes nothing.

use crate::{InboundMessage, MediaId, MentionSource, MentionStream, PostResult, SocialPlatform, StatusUpdate};
use async_trait::async_trait;
use chirp_error::PublishError;
use futures::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Logs every call and returns synthetic ids. Used for dry runs.
///
/// Its mention stream stays open and never yields.
#[derive(Debug, Default)]
pub struct NoOpPlatform {
    counter: AtomicU64,
}

impl NoOpPlatform {
    /// Create a no-op platform.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.counter.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[async_trait]
impl SocialPlatform for NoOpPlatform {
    async fn upload_media(&self, bytes: Vec<u8>) -> Result<MediaId, PublishError> {
        let id = MediaId::new(self.next_id("dry-media"));
        info!(%id, size = bytes.len(), "Dry run: would upload media");
        Ok(id)
    }

    async fn attach_metadata(
        &self,
        media_id: &MediaId,
        alt_text: &str,
    ) -> Result<(), PublishError> {
        info!(%media_id, alt_text, "Dry run: would attach alt text");
        Ok(())
    }

    async fn publish_status(&self, status: StatusUpdate) -> Result<PostResult, PublishError> {
        let id = self.next_id("dry-status");
        info!(
            %id,
            text = %status.text(),
            in_reply_to = status.in_reply_to().as_deref(),
            "Dry run: would publish status"
        );
        Ok(PostResult::new(id, status.text().clone()))
    }

    fn platform_name(&self) -> &'static str {
        "noop"
    }
}

#[async_trait]
impl MentionSource for NoOpPlatform {
    async fn stream_mentions(&self, track_term: &str) -> Result<MentionStream, PublishError> {
        info!(track_term, "Dry run: mention stream is silent");
        Ok(futures::stream::pending::<InboundMessage>().boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ids_are_distinct() {
        let platform = NoOpPlatform::new();
        let a = platform.upload_media(vec![1, 2, 3]).await.unwrap();
        let b = platform.upload_media(vec![]).await.unwrap();
        assert_ne!(a, b);

        let status = StatusUpdate::builder().text("hi").build().unwrap();
        let result = platform.publish_status(status).await.unwrap();
        assert_eq!(result.text(), "hi");
    }
}
