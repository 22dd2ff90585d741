//! Library loading and validation.

use crate::{ContentItem, ContentKind, Image};
use chirp_error::{LibraryError, LibraryErrorKind};
use derive_getters::Getters;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// The immutable collection of all content items and images.
///
/// Every `image_ref` resolves to an entry of `images` and every weight is a
/// finite number above zero. Construction fails otherwise.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Library {
    /// Scheduled post candidates.
    posts: Vec<ContentItem>,
    /// Reply candidates.
    replies: Vec<ContentItem>,
    /// Image table keyed by image reference.
    images: HashMap<String, Image>,
    /// Directory image files are resolved against.
    base_path: PathBuf,
}

/// On-disk document shape.
#[derive(Debug, Deserialize)]
struct LibraryDocument {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    images: HashMap<String, Image>,
    #[serde(default)]
    posts: Vec<ContentItem>,
    #[serde(default)]
    replies: Vec<ContentItem>,
}

impl Library {
    /// Build a library from parts, validating every entry.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryErrorKind::Invalid`] listing every broken entry.
    pub fn new(
        posts: Vec<ContentItem>,
        replies: Vec<ContentItem>,
        images: HashMap<String, Image>,
        base_path: impl Into<PathBuf>,
    ) -> Result<Self, LibraryError> {
        let library = Self {
            posts,
            replies,
            images,
            base_path: base_path.into(),
        };
        library.validate()?;
        Ok(library)
    }

    /// Load and validate a library file.
    ///
    /// A relative `path` inside the document is resolved against the
    /// directory containing the file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, is not valid JSON, or fails
    /// validation.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LibraryError> {
        let path = path.as_ref();
        debug!("Reading library");

        let contents = std::fs::read_to_string(path).map_err(|e| {
            LibraryError::new(LibraryErrorKind::Read(format!("{}: {}", path.display(), e)))
        })?;

        let origin = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_json_str(&contents, origin)
    }

    /// Parse and validate a library document.
    ///
    /// `origin` is the directory a relative base path is resolved against.
    pub fn from_json_str(json: &str, origin: impl AsRef<Path>) -> Result<Self, LibraryError> {
        let document: LibraryDocument = serde_json::from_str(json)
            .map_err(|e| LibraryError::new(LibraryErrorKind::Parse(e.to_string())))?;

        let base_path = match document.path {
            Some(p) if Path::new(&p).is_absolute() => PathBuf::from(p),
            Some(p) => origin.as_ref().join(p),
            None => origin.as_ref().to_path_buf(),
        };

        let library = Self::new(document.posts, document.replies, document.images, base_path)?;
        info!(
            posts = library.posts.len(),
            replies = library.replies.len(),
            images = library.images.len(),
            "Successfully validated library"
        );
        Ok(library)
    }

    /// Check every entry, collecting all problems.
    pub fn validate(&self) -> Result<(), LibraryError> {
        let mut errors = Vec::new();

        for kind in [ContentKind::Post, ContentKind::Reply] {
            for (i, item) in self.items(kind).iter().enumerate() {
                errors.extend(self.entry_errors(kind, i, item));
            }
        }

        if errors.is_empty() {
            return Ok(());
        }

        for error in &errors {
            warn!(%error, "Invalid library entry");
        }
        Err(LibraryError::new(LibraryErrorKind::Invalid(errors)))
    }

    fn entry_errors(&self, kind: ContentKind, index: usize, item: &ContentItem) -> Vec<String> {
        let label = match kind {
            ContentKind::Post => "Post",
            ContentKind::Reply => "Reply",
        };
        let mut errors = Vec::new();

        if !self.images.contains_key(item.image_ref()) {
            errors.push(format!(
                "{} {}: unknown image \"{}\"",
                label,
                index,
                item.image_ref()
            ));
        }

        if !item.has_valid_weight() {
            errors.push(format!(
                "{} {}: weight must be a finite number > 0 (got {})",
                label,
                index,
                item.weight()
            ));
        }

        errors
    }

    /// The content sequence for a kind.
    pub fn items(&self, kind: ContentKind) -> &[ContentItem] {
        match kind {
            ContentKind::Post => &self.posts,
            ContentKind::Reply => &self.replies,
        }
    }

    /// The image an item references.
    pub fn image_for(&self, item: &ContentItem) -> Option<&Image> {
        self.images.get(item.image_ref())
    }

    /// Full path of an image file.
    pub fn image_path(&self, image: &Image) -> PathBuf {
        self.base_path.join(image.file())
    }
}
