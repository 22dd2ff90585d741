//! Values exchanged with a social platform.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Platform identifier of an uploaded image.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct MediaId(String);

impl MediaId {
    /// Wrap a raw platform id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MediaId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A status to publish.
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct StatusUpdate {
    /// Full status text, including any `@author` prefix.
    text: String,

    /// Attached media.
    #[builder(default, setter(into, strip_option))]
    media_id: Option<MediaId>,

    /// Message this status replies to.
    #[builder(default, setter(into, strip_option))]
    in_reply_to: Option<String>,
}

impl StatusUpdate {
    /// Start building a status.
    pub fn builder() -> StatusUpdateBuilder {
        StatusUpdateBuilder::default()
    }
}

/// A published status as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, derive_new::new)]
pub struct PostResult {
    /// Platform id of the new status.
    #[new(into)]
    id: String,

    /// Text as published.
    #[new(into)]
    text: String,
}

/// A mention of the agent's handle.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, derive_new::new)]
pub struct InboundMessage {
    /// Platform id, used as the reply target.
    #[new(into)]
    id: String,

    /// Screen name of the author, without `@`.
    #[new(into)]
    author: String,

    /// Full message text.
    #[new(into)]
    text: String,
}
