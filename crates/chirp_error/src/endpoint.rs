//! Health endpoint error types.

/// Kinds of health endpoint errors.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum EndpointErrorKind {
    /// The port is taken or not permitted
    #[display("Port {} could not be bound: {}", port, reason)]
    Bind {
        /// Requested port
        port: u16,
        /// Reason reported by the operating system
        reason: String,
    },
    /// The listener would not report the address it bound
    #[display("Bound address is unavailable: {}", _0)]
    LocalAddr(String),
}

/// Health endpoint error with location tracking.
///
/// Only raised while starting the endpoint, before anything is published.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Health Endpoint Error: {} at line {} in {}", kind, line, file)]
pub struct EndpointError {
    /// The kind of error that occurred
    pub kind: EndpointErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl EndpointError {
    /// Create a new EndpointError at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use chirp_error::{EndpointError, EndpointErrorKind};
    ///
    /// let err = EndpointError::new(EndpointErrorKind::Bind {
    ///     port: 5000,
    ///     reason: "address in use".into(),
    /// });
    /// assert!(err.to_string().contains("Port 5000"));
    /// ```
    #[track_caller]
    pub fn new(kind: EndpointErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
