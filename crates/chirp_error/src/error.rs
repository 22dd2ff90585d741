//! Top-level error wrapper types.

use crate::{
    ConfigError, EndpointError, LibraryError, PersistenceError, PublishError,
    SelectionError,
};

/// Every error the agent can raise, by origin.
///
/// # Examples
///
/// ```
/// use chirp_error::{ChirpError, EndpointError, EndpointErrorKind};
///
/// let bind_err = EndpointError::new(EndpointErrorKind::LocalAddr("closed".into()));
/// let err: ChirpError = bind_err.into();
/// assert!(format!("{}", err).contains("Health Endpoint Error"));
/// assert!(err.kind().is_fatal());
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum ChirpErrorKind {
    /// Health endpoint could not start
    #[from(EndpointError)]
    Endpoint(EndpointError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Library loading or validation error
    #[from(LibraryError)]
    Library(LibraryError),
    /// Content selection error
    #[from(SelectionError)]
    Selection(SelectionError),
    /// Memory store error
    #[from(PersistenceError)]
    Persistence(PersistenceError),
    /// Publish chain error
    #[from(PublishError)]
    Publish(PublishError),
}

impl ChirpErrorKind {
    /// Whether the process must stop because of this error.
    ///
    /// Configuration, library and endpoint problems are fatal at startup;
    /// everything else is recovered by skipping the affected cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Library(_) | Self::Endpoint(_))
    }
}

/// Chirp error with kind discrimination.
///
/// # Examples
///
/// ```
/// use chirp_error::{ChirpResult, ConfigError};
///
/// fn might_fail() -> ChirpResult<()> {
///     Err(ConfigError::missing("ACCESS_TOKEN", "use the platform API"))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(err.kind().is_fatal());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Chirp Error: {}", _0)]
pub struct ChirpError(Box<ChirpErrorKind>);

impl ChirpError {
    /// Create a new error from a kind.
    pub fn new(kind: ChirpErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ChirpErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to ChirpErrorKind
impl<T> From<T> for ChirpError
where
    T: Into<ChirpErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for chirp operations.
pub type ChirpResult<T> = std::result::Result<T, ChirpError>;
