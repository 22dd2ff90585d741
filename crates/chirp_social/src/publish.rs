//! The upload, metadata, status chain.

use crate::{InboundMessage, MAX_MEDIA_BYTES, PostResult, SocialPlatform, StatusUpdate};
use chirp_core::{ContentItem, Library};
use chirp_error::{PublishError, PublishErrorKind, PublishStep};
use tracing::{debug, info, instrument};

/// Text of a reply to `author`.
pub fn reply_text(author: &str, text: &str) -> String {
    format!("@{} {}", author.trim_start_matches('@'), text)
}

/// Publish `item` with its image, optionally as a reply.
///
/// Each remote step is awaited before the next is issued. The first failure
/// abandons the chain; nothing is retried.
///
/// # Errors
///
/// Returns [`PublishError`] naming the step that failed, or
/// `MediaTooLarge` when the image exceeds [`MAX_MEDIA_BYTES`].
#[instrument(
    skip_all,
    fields(
        platform = platform.platform_name(),
        image = %item.image_ref(),
        reply_to = reply_to.map(|m| m.id().as_str()),
    )
)]
pub async fn publish_item(
    platform: &dyn SocialPlatform,
    library: &Library,
    item: &ContentItem,
    reply_to: Option<&InboundMessage>,
) -> Result<PostResult, PublishError> {
    let image = library.image_for(item).ok_or_else(|| {
        PublishError::failed(
            PublishStep::MediaRead,
            format!("unknown image \"{}\"", item.image_ref()),
        )
    })?;
    let path = library.image_path(image);

    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        PublishError::failed(
            PublishStep::MediaRead,
            format!("{}: {}", path.display(), e),
        )
    })?;
    if bytes.len() > MAX_MEDIA_BYTES {
        return Err(PublishError::new(PublishErrorKind::MediaTooLarge {
            size: bytes.len(),
            limit: MAX_MEDIA_BYTES,
        }));
    }
    debug!(path = %path.display(), size = bytes.len(), "Read media");

    let media_id = platform.upload_media(bytes).await?;
    debug!(%media_id, "Uploaded media");

    platform.attach_metadata(&media_id, image.alt_text()).await?;
    debug!(%media_id, "Attached alt text");

    let mut status = StatusUpdate::builder();
    status.media_id(media_id);
    match reply_to {
        Some(mention) => {
            status
                .text(reply_text(mention.author(), item.text()))
                .in_reply_to(mention.id().clone());
        }
        None => {
            status.text(item.text().clone());
        }
    }
    let status = status
        .build()
        .map_err(|e| PublishError::failed(PublishStep::Status, e.to_string()))?;

    let result = platform.publish_status(status).await?;
    match reply_to {
        Some(mention) => {
            info!(id = %result.id(), author = %mention.author(), text = %result.text(), "Replied successfully")
        }
        None => info!(id = %result.id(), text = %result.text(), "Posted successfully"),
    }
    Ok(result)
}
