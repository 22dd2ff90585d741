//! Content items and images.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Weight assigned to items that do not declare one.
pub const DEFAULT_WEIGHT: f64 = 10.0;

fn default_weight() -> f64 {
    DEFAULT_WEIGHT
}

/// Which content sequence an item belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ContentKind {
    /// Proactive, scheduled posts
    Post,
    /// Replies to matching mentions
    Reply,
}

/// An image that content items can attach.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, derive_new::new)]
pub struct Image {
    /// File name, resolved against the library base path.
    #[new(into)]
    file: String,

    /// Alt text for accessibility.
    #[serde(alias = "alt", alias = "altText")]
    #[new(into)]
    alt_text: String,
}

/// One candidate message.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize, derive_new::new)]
pub struct ContentItem {
    /// Message text, published verbatim.
    #[new(into)]
    text: String,

    /// Key into the library's image table.
    #[serde(rename = "image")]
    #[new(into)]
    image_ref: String,

    /// Relative selection probability.
    #[serde(alias = "chance", default = "default_weight")]
    weight: f64,
}

impl ContentItem {
    /// Whether the weight is usable for sampling.
    pub fn has_valid_weight(&self) -> bool {
        self.weight.is_finite() && self.weight > 0.0
    }
}
