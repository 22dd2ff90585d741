//! Publish chain error types.

/// Step of the upload, metadata, status chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PublishStep {
    /// Reading the image from disk
    #[display("media read")]
    MediaRead,
    /// Uploading the image bytes
    #[display("media upload")]
    Upload,
    /// Attaching alt text to the uploaded media
    #[display("media metadata")]
    Metadata,
    /// Publishing the status itself
    #[display("status publish")]
    Status,
    /// Receiving inbound mentions
    #[display("mention stream")]
    Stream,
}

/// Kinds of publish chain errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PublishErrorKind {
    /// A step of the chain failed
    #[display("{} failed: {}", step, message)]
    StepFailed {
        /// Step that failed
        step: PublishStep,
        /// Failure description
        message: String,
    },
    /// Image exceeds the upload size limit
    #[display("media is {} bytes, limit is {}", size, limit)]
    MediaTooLarge {
        /// Actual size in bytes
        size: usize,
        /// Maximum accepted size in bytes
        limit: usize,
    },
}

/// Publish error with location tracking.
///
/// Recovered by abandoning the publish attempt; never retried.
///
/// # Examples
///
/// ```
/// use chirp_error::{PublishError, PublishStep};
///
/// let err = PublishError::failed(PublishStep::Upload, "timeout");
/// assert_eq!(err.step(), PublishStep::Upload);
/// assert!(format!("{}", err).contains("media upload failed"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Publish Error: {} at line {} in {}", kind, line, file)]
pub struct PublishError {
    /// The kind of error that occurred
    pub kind: PublishErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PublishError {
    /// Create a new publish error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PublishErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Error for a failed chain step.
    #[track_caller]
    pub fn failed(step: PublishStep, message: impl Into<String>) -> Self {
        Self::new(PublishErrorKind::StepFailed {
            step,
            message: message.into(),
        })
    }

    /// The step that failed.
    pub fn step(&self) -> PublishStep {
        match &self.kind {
            PublishErrorKind::StepFailed { step, .. } => *step,
            PublishErrorKind::MediaTooLarge { .. } => PublishStep::MediaRead,
        }
    }
}
