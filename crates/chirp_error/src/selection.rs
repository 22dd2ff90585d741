//! Content selection error types.

/// Kinds of selection errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SelectionErrorKind {
    /// Nothing to draw from: no items, or total weight is not positive
    #[display("Library is empty or has no positive weight")]
    EmptyLibrary,
}

/// Selection error with location tracking.
///
/// Fatal to a single publish attempt only; the caller skips the cycle.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Selection Error: {} at line {} in {}", kind, line, file)]
pub struct SelectionError {
    /// The kind of error that occurred
    pub kind: SelectionErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl SelectionError {
    /// Create a new selection error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SelectionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for [`SelectionErrorKind::EmptyLibrary`].
    #[track_caller]
    pub fn empty_library() -> Self {
        Self::new(SelectionErrorKind::EmptyLibrary)
    }
}
