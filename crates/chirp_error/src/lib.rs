//! Error types for the chirp posting agent.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! Startup failures ([`ConfigError`], [`LibraryError`], [`EndpointError`])
//! are fatal. Runtime
//! failures ([`SelectionError`], [`PersistenceError`], [`PublishError`]) are
//! recovered by the caller and only ever surface through logs.
//!
//! # Examples
//!
//! ```
//! use chirp_error::{ChirpResult, ConfigError};
//!
//! fn load() -> ChirpResult<()> {
//!     Err(ConfigError::missing("HANDLE", "recognise its own mentions"))?
//! }
//!
//! assert!(load().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod endpoint;
mod error;
mod library;
mod persistence;
mod publish;
mod selection;

pub use config::{ConfigError, ConfigErrorKind};
pub use endpoint::{EndpointError, EndpointErrorKind};
pub use error::{ChirpError, ChirpErrorKind, ChirpResult};
pub use library::{LibraryError, LibraryErrorKind};
pub use persistence::{PersistenceError, PersistenceErrorKind};
pub use publish::{PublishError, PublishErrorKind, PublishStep};
pub use selection::{SelectionError, SelectionErrorKind};
