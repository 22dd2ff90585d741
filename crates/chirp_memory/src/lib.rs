//! Bounded anti-repeat memory with optional remote persistence.
//!
//! [`AntiRepeatMemory`] keeps the most recently used content indices of one
//! content sequence, evicting the oldest first once `capacity` is exceeded.
//! When a [`MemoryStore`] is attached, every mutation ships the full snapshot
//! to the store in a detached task, and [`AntiRepeatMemory::restore`] pulls it
//! back on startup.
//!
//! # Example
//!
//! ```
//! use chirp_memory::AntiRepeatMemory;
//!
//! let mut memory = AntiRepeatMemory::new(2);
//! memory.remember(4);
//! memory.remember(7);
//! memory.remember(1);
//!
//! assert_eq!(memory.snapshot(), vec![7, 1]);
//! assert!(!memory.contains(4));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod file;
mod http;
mod in_memory;
mod memory;
mod store;

pub use file::JsonFileMemoryStore;
pub use http::{DEFAULT_STORE_TIMEOUT, HttpMemoryStore};
pub use in_memory::InMemoryStore;
pub use memory::{AntiRepeatMemory, DEFAULT_MEMORY_DURATION};
pub use store::{MemoryStore, StoreResult};
