//! Weighted content selection with anti-repeat rejection.
//!
//! Items are drawn with probability proportional to their weight. A draw that
//! lands on an index still held in the [`AntiRepeatMemory`] is rejected and
//! redrawn, unless the memory window is as large as the sequence itself, in
//! which case repetition cannot be avoided and the constraint is bypassed.
//!
//! # Example
//!
//! ```
//! use chirp_core::ContentItem;
//! use chirp_memory::AntiRepeatMemory;
//! use chirp_selection::ContentSelector;
//!
//! let items = vec![
//!     ContentItem::new("rare", "cat", 10.0),
//!     ContentItem::new("common", "cat", 90.0),
//! ];
//! let mut memory = AntiRepeatMemory::new(1);
//! let mut selector = ContentSelector::seeded(7);
//!
//! let first = selector.select(&items, &memory)?;
//! memory.remember(first.index);
//! let second = selector.select(&items, &memory)?;
//! assert_ne!(first.index, second.index);
//! # Ok::<(), chirp_error::SelectionError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod selector;

pub use selector::{ContentSelector, MAX_REDRAWS, Selection, select};
