//! Content library data model for the chirp posting agent.
//!
//! A [`Library`] holds two ordered sequences of [`ContentItem`] (posts and
//! replies) plus the [`Image`] table they reference. It is loaded once,
//! validated as a whole, and never mutated afterwards.
//!
//! # Example
//!
//! ```
//! use chirp_core::{ContentKind, Library};
//!
//! let json = r#"{
//!     "path": "images",
//!     "images": { "cat": { "file": "cat.png", "alt": "A sleepy cat" } },
//!     "posts": [ { "text": "Good morning", "image": "cat", "chance": 10 } ],
//!     "replies": []
//! }"#;
//!
//! let library = Library::from_json_str(json, ".")?;
//! assert_eq!(library.items(ContentKind::Post).len(), 1);
//! # Ok::<(), chirp_error::LibraryError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod content;
mod library;

pub use content::{ContentItem, ContentKind, Image, DEFAULT_WEIGHT};
pub use library::Library;
