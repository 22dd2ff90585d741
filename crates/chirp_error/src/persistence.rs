//! Remote memory persistence error types.

/// Kinds of memory store errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PersistenceErrorKind {
    /// Request could not be sent or no response was received
    #[display("Memory store request failed: {}", _0)]
    Request(String),
    /// Store answered with an unexpected status
    #[display("Memory store returned status {}", _0)]
    Status(u16),
    /// Stored payload is not an ordered list of integers
    #[display("Memory payload could not be decoded: {}", _0)]
    Decode(String),
    /// Local file backend failed
    #[display("Memory file I/O failed: {}", _0)]
    Io(String),
}

/// Persistence error with location tracking.
///
/// Always recovered locally: restore failures leave memory empty, write
/// failures are logged and discarded.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Persistence Error: {} at line {} in {}", kind, line, file)]
pub struct PersistenceError {
    /// The kind of error that occurred
    pub kind: PersistenceErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PersistenceError {
    /// Create a new persistence error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PersistenceErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
