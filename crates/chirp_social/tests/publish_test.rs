//! Publish chain ordering and failure handling.

use async_trait::async_trait;
use chirp_core::Library;
use chirp_error::{PublishError, PublishErrorKind, PublishStep};
use chirp_social::{
    InboundMessage, MAX_MEDIA_BYTES, MediaId, PostResult, SocialPlatform, StatusUpdate,
    publish_item,
};
use parking_lot::Mutex;
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Upload(usize),
    Metadata(String, String),
    Status(StatusUpdate),
}

#[derive(Default)]
struct RecordingPlatform {
    calls: Mutex<Vec<Call>>,
    fail_at: Option<PublishStep>,
}

impl RecordingPlatform {
    fn failing_at(step: PublishStep) -> Self {
        Self {
            fail_at: Some(step),
            ..Self::default()
        }
    }

    fn check(&self, step: PublishStep) -> Result<(), PublishError> {
        if self.fail_at == Some(step) {
            Err(PublishError::failed(step, "boom"))
        } else {
            Ok(())
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl SocialPlatform for RecordingPlatform {
    async fn upload_media(&self, bytes: Vec<u8>) -> Result<MediaId, PublishError> {
        self.calls.lock().push(Call::Upload(bytes.len()));
        self.check(PublishStep::Upload)?;
        Ok(MediaId::new("m-1"))
    }

    async fn attach_metadata(
        &self,
        media_id: &MediaId,
        alt_text: &str,
    ) -> Result<(), PublishError> {
        self.calls
            .lock()
            .push(Call::Metadata(media_id.to_string(), alt_text.to_string()));
        self.check(PublishStep::Metadata)
    }

    async fn publish_status(&self, status: StatusUpdate) -> Result<PostResult, PublishError> {
        self.calls.lock().push(Call::Status(status.clone()));
        self.check(PublishStep::Status)?;
        Ok(PostResult::new("s-1", status.text().clone()))
    }

    fn platform_name(&self) -> &'static str {
        "recording"
    }
}

fn library_with_image(dir: &TempDir, image_bytes: usize) -> Library {
    fs::create_dir_all(dir.path().join("images")).unwrap();
    fs::write(dir.path().join("images/cat.png"), vec![7u8; image_bytes]).unwrap();
    let json = r#"{
        "path": "images",
        "images": {
            "cat": { "file": "cat.png", "alt": "A sleepy cat" },
            "ghost": { "file": "missing.png", "alt": "Nothing" }
        },
        "posts": [
            { "text": "Good morning", "image": "cat" },
            { "text": "Boo", "image": "ghost" }
        ],
        "replies": [ { "text": "Purr", "image": "cat" } ]
    }"#;
    let path = dir.path().join("library.json");
    fs::write(&path, json).unwrap();
    Library::from_file(&path).unwrap()
}

#[tokio::test]
async fn test_post_runs_three_steps_in_order() {
    let dir = TempDir::new().unwrap();
    let library = library_with_image(&dir, 16);
    let platform = RecordingPlatform::default();

    let item = &library.posts()[0];
    let result = publish_item(&platform, &library, item, None).await.unwrap();
    assert_eq!(result.text(), "Good morning");

    let expected_status = StatusUpdate::builder()
        .text("Good morning")
        .media_id("m-1")
        .build()
        .unwrap();
    assert_eq!(
        platform.calls(),
        vec![
            Call::Upload(16),
            Call::Metadata("m-1".into(), "A sleepy cat".into()),
            Call::Status(expected_status),
        ]
    );
}

#[tokio::test]
async fn test_reply_is_addressed_to_author() {
    let dir = TempDir::new().unwrap();
    let library = library_with_image(&dir, 16);
    let platform = RecordingPlatform::default();
    let mention = InboundMessage::new("999", "fan", "@catbot good kitty");

    let item = &library.replies()[0];
    let result = publish_item(&platform, &library, item, Some(&mention))
        .await
        .unwrap();
    assert_eq!(result.text(), "@fan Purr");

    let Some(Call::Status(status)) = platform.calls().pop() else {
        panic!("status was not published");
    };
    assert_eq!(status.in_reply_to().as_deref(), Some("999"));
}

#[tokio::test]
async fn test_failure_stops_the_chain() {
    let dir = TempDir::new().unwrap();
    let library = library_with_image(&dir, 16);
    let item = &library.posts()[0];

    let platform = RecordingPlatform::failing_at(PublishStep::Upload);
    let err = publish_item(&platform, &library, item, None)
        .await
        .unwrap_err();
    assert_eq!(err.step(), PublishStep::Upload);
    assert_eq!(platform.calls().len(), 1);

    let platform = RecordingPlatform::failing_at(PublishStep::Metadata);
    let err = publish_item(&platform, &library, item, None)
        .await
        .unwrap_err();
    assert_eq!(err.step(), PublishStep::Metadata);
    assert_eq!(platform.calls().len(), 2);

    let platform = RecordingPlatform::failing_at(PublishStep::Status);
    let err = publish_item(&platform, &library, item, None)
        .await
        .unwrap_err();
    assert_eq!(err.step(), PublishStep::Status);
    assert_eq!(platform.calls().len(), 3);
}

#[tokio::test]
async fn test_missing_file_fails_before_upload() {
    let dir = TempDir::new().unwrap();
    let library = library_with_image(&dir, 16);
    let platform = RecordingPlatform::default();

    let err = publish_item(&platform, &library, &library.posts()[1], None)
        .await
        .unwrap_err();
    assert_eq!(err.step(), PublishStep::MediaRead);
    assert!(platform.calls().is_empty());
}

#[tokio::test]
async fn test_oversized_media_rejected() {
    let dir = TempDir::new().unwrap();
    let library = library_with_image(&dir, MAX_MEDIA_BYTES + 1);
    let platform = RecordingPlatform::default();

    let err = publish_item(&platform, &library, &library.posts()[0], None)
        .await
        .unwrap_err();
    assert!(matches!(
        err.kind,
        PublishErrorKind::MediaTooLarge { size, limit } if size == MAX_MEDIA_BYTES + 1 && limit == MAX_MEDIA_BYTES
    ));
    assert!(platform.calls().is_empty());
}
