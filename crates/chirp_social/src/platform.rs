//! Platform capability traits.

use crate::{InboundMessage, MediaId, PostResult, StatusUpdate};
use async_trait::async_trait;
use chirp_error::PublishError;
use futures::stream::Stream;
use std::pin::Pin;

/// Largest image the platform accepts, in bytes (5 MiB).
pub const MAX_MEDIA_BYTES: usize = 5_242_880;

/// Endless stream of mentions.
pub type MentionStream = Pin<Box<dyn Stream<Item = InboundMessage> + Send>>;

/// Remote operations needed to publish a status with an image.
#[async_trait]
pub trait SocialPlatform: Send + Sync {
    /// Upload raw image bytes.
    async fn upload_media(&self, bytes: Vec<u8>) -> Result<MediaId, PublishError>;

    /// Attach alt text to uploaded media.
    async fn attach_metadata(&self, media_id: &MediaId, alt_text: &str)
    -> Result<(), PublishError>;

    /// Publish a status.
    async fn publish_status(&self, status: StatusUpdate) -> Result<PostResult, PublishError>;

    /// Platform name for logging.
    fn platform_name(&self) -> &'static str;
}

/// Source of inbound mentions.
#[async_trait]
pub trait MentionSource: Send + Sync {
    /// Open a stream of messages tracking `track_term`.
    ///
    /// The stream never ends on its own. Reconnecting after transport
    /// failures is the implementation's job, not the consumer's.
    async fn stream_mentions(&self, track_term: &str) -> Result<MentionStream, PublishError>;
}
