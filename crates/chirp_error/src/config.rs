//! Configuration error types.

/// What is wrong with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ConfigErrorKind {
    /// A required setting has no value
    #[display("{} is not set. The agent needs it to {}", setting, purpose)]
    Missing {
        /// Setting name as it appears in the environment
        setting: String,
        /// What the agent cannot do without it
        purpose: String,
    },
    /// A setting has a value the agent cannot use
    #[display("{}: {}", setting, reason)]
    Invalid {
        /// Setting name as it appears in the configuration file
        setting: String,
        /// Why the value was rejected
        reason: String,
    },
    /// The configuration sources could not be read or merged
    #[display("Configuration could not be loaded: {}", _0)]
    Unreadable(String),
}

/// Configuration error with source location.
///
/// Raised for missing credentials, malformed triggers and other settings
/// problems found at startup. Always fatal.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// The kind of error that occurred
    pub kind: ConfigErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError at the current location.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// A required setting is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use chirp_error::ConfigError;
    ///
    /// let err = ConfigError::missing("HANDLE", "recognise its own mentions");
    /// assert!(err.to_string().contains("HANDLE is not set"));
    /// ```
    #[track_caller]
    pub fn missing(setting: impl Into<String>, purpose: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Missing {
            setting: setting.into(),
            purpose: purpose.into(),
        })
    }

    /// A setting holds an unusable value.
    #[track_caller]
    pub fn invalid(setting: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Invalid {
            setting: setting.into(),
            reason: reason.into(),
        })
    }

    /// The configuration sources could not be read or merged.
    #[track_caller]
    pub fn unreadable(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Unreadable(message.into()))
    }

    /// Name of the offending setting, when one is known.
    pub fn setting(&self) -> Option<&str> {
        match &self.kind {
            ConfigErrorKind::Missing { setting, .. } | ConfigErrorKind::Invalid { setting, .. } => {
                Some(setting)
            }
            ConfigErrorKind::Unreadable(_) => None,
        }
    }
}
