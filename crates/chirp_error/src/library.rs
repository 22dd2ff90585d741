//! Content library error types.

/// Kinds of library loading and validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum LibraryErrorKind {
    /// Library file could not be read
    #[display("Failed to read library: {}", _0)]
    Read(String),
    /// Library document is not well-formed
    #[display("Failed to parse library: {}", _0)]
    Parse(String),
    /// One or more entries failed validation
    #[display("{} error(s) validating library: {}", _0.len(), _0.join("; "))]
    Invalid(Vec<String>),
}

/// Library error with location tracking.
///
/// Always fatal at startup: a library is either fully valid or unusable.
///
/// # Examples
///
/// ```
/// use chirp_error::{LibraryError, LibraryErrorKind};
///
/// let err = LibraryError::new(LibraryErrorKind::Invalid(vec![
///     "Post 0: unknown image \"dog\"".to_string(),
/// ]));
/// assert!(format!("{}", err).contains("1 error(s)"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Library Error: {} at line {} in {}", kind, line, file)]
pub struct LibraryError {
    /// The kind of error that occurred
    pub kind: LibraryErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl LibraryError {
    /// Create a new library error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: LibraryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
