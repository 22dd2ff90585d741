//! Agent configuration.
//!
//! Sources, later overriding earlier:
//! 1. Built-in defaults (`defaults.toml` shipped with the crate)
//! 2. `chirp.toml` in the working directory, or an explicit `--config` file
//! 3. Environment variables (`HANDLE`, `ACCESS_TOKEN`, `MEMORY_DURATION`, ...)

use chirp_error::{ChirpError, ChirpResult, ConfigError};
use chirp_memory::{HttpMemoryStore, JsonFileMemoryStore, MemoryStore};
use chirp_schedule::{ScheduleMode, Trigger};
use chirp_social::MentionFilter;
use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const DEFAULT_CONFIG: &str = include_str!("../defaults.toml");

/// Everything the agent needs to start.
#[derive(Debug, Clone, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_", into)]
pub struct AgentConfig {
    /// Screen name the agent posts as, with or without `@`.
    #[serde(default)]
    handle: String,

    /// Bearer token for the platform API.
    #[serde(default)]
    access_token: String,

    /// Platform account id, needed for the mention timeline.
    #[serde(default)]
    #[setters(strip_option)]
    user_id: Option<String>,

    /// Platform API root.
    api_base_url: String,

    /// Content library JSON file.
    library_path: PathBuf,

    /// Minutes between clock checks in daily-times mode.
    post_interval_length: f64,

    /// Minutes between posts in fixed-interval mode.
    post_frequency: f64,

    /// Local times of day to post at. Empty selects fixed-interval mode.
    #[serde(default)]
    post_times: Vec<Trigger>,

    /// Substrings that make a mention worth replying to.
    #[serde(default)]
    signals: Vec<String>,

    /// Regular expression that also makes a mention worth replying to.
    #[serde(default)]
    #[setters(strip_option)]
    signal_pattern: Option<String>,

    /// How many recent selections to avoid repeating.
    memory_duration: usize,

    /// Store key for the post memory.
    #[serde(default)]
    #[setters(strip_option)]
    memory_posts_id: Option<String>,

    /// Store key for the reply memory.
    #[serde(default)]
    #[setters(strip_option)]
    memory_replies_id: Option<String>,

    /// JSON-bin service holding remote memories.
    #[serde(default)]
    #[setters(strip_option)]
    memory_store_url: Option<String>,

    /// Directory of local memory files, used when no store URL is set.
    #[serde(default)]
    #[setters(strip_option)]
    memory_dir: Option<PathBuf>,

    /// Health endpoint port.
    port: u16,

    /// URL pinged periodically to keep a hosted instance awake.
    #[serde(default)]
    #[setters(strip_option)]
    keep_alive_url: Option<String>,

    /// Minutes between keep-alive pings.
    keep_alive_interval: f64,

    /// Seconds between mention timeline polls.
    mention_poll_interval: u64,

    /// Seconds to wait for remote memory at startup.
    restore_timeout: u64,

    /// Seconds before a single platform or memory store call is abandoned.
    request_timeout: u64,
}

fn config_error(message: String) -> ChirpError {
    ChirpError::from(ConfigError::unreadable(message))
}

fn minutes(value: f64, name: &str) -> Result<Duration, ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::invalid(
            name,
            format!("must be a positive number of minutes (got {})", value),
        ));
    }
    Duration::try_from_secs_f64(value * 60.0)
        .map_err(|e| ConfigError::invalid(name, format!("out of range: {}", e)))
}

impl AgentConfig {
    /// Load defaults, the optional file and the environment.
    ///
    /// Without `path`, `chirp.toml` in the working directory is used if it
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source cannot be read or parsed, or if the
    /// result fails [`AgentConfig::validate`].
    #[instrument]
    pub fn load(path: Option<&Path>) -> ChirpResult<Self> {
        let env = Environment::default()
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("signals");
        Self::load_from(path, env)
    }

    /// Load with an explicit environment source.
    fn load_from(path: Option<&Path>, env: Environment) -> ChirpResult<Self> {
        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        builder = match path {
            Some(path) => {
                debug!(path = %path.display(), "Using configuration file");
                builder.add_source(File::from(path))
            }
            None => builder.add_source(File::with_name("chirp").required(false)),
        };

        let config: Self = builder
            .add_source(env)
            .build()
            .map_err(|e| config_error(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| config_error(format!("Failed to parse configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document layered over the defaults, without the environment.
    ///
    /// # Errors
    ///
    /// Same as [`AgentConfig::load`].
    pub fn from_toml_str(toml: &str) -> ChirpResult<Self> {
        let config: Self = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .map_err(|e| config_error(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| config_error(format!("Failed to parse configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Check everything that can be checked without network access.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for missing credentials, bad intervals, repeated
    /// post times or an invalid signal pattern.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.handle.trim_start_matches('@').trim().is_empty() {
            return Err(ConfigError::missing("HANDLE", "recognise its own mentions"));
        }
        if self.access_token.trim().is_empty() {
            return Err(ConfigError::missing("ACCESS_TOKEN", "use the platform API"));
        }
        self.schedule_mode()?;
        self.mention_filter()?;
        self.keep_alive_period()?;
        if self.mention_poll_interval == 0 {
            return Err(ConfigError::invalid(
                "mention_poll_interval",
                "must be greater than zero",
            ));
        }
        if self.request_timeout == 0 {
            return Err(ConfigError::invalid(
                "request_timeout",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Scheduling strategy: daily times when any are configured, otherwise a
    /// fixed interval.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for non-positive intervals or repeated times.
    pub fn schedule_mode(&self) -> Result<ScheduleMode, ConfigError> {
        if self.post_times.is_empty() {
            ScheduleMode::fixed(minutes(self.post_frequency, "post_frequency")?)
        } else {
            ScheduleMode::daily(
                self.post_times.clone(),
                minutes(self.post_interval_length, "post_interval_length")?,
            )
        }
    }

    /// Mention filter for this agent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `signal_pattern` does not compile.
    pub fn mention_filter(&self) -> Result<MentionFilter, ConfigError> {
        let filter = MentionFilter::new(&self.handle, self.signals.clone());
        match &self.signal_pattern {
            Some(pattern) => filter.with_pattern(pattern),
            None => Ok(filter),
        }
    }

    /// Delay between keep-alive pings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the interval is not positive.
    pub fn keep_alive_period(&self) -> Result<Duration, ConfigError> {
        minutes(self.keep_alive_interval, "keep_alive_interval")
    }

    /// Delay between mention polls.
    pub fn mention_poll_period(&self) -> Duration {
        Duration::from_secs(self.mention_poll_interval)
    }

    /// Upper bound on startup memory restoration.
    pub fn restore_period(&self) -> Duration {
        Duration::from_secs(self.restore_timeout)
    }

    /// Upper bound on a single platform or memory store call.
    pub fn request_period(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// The memory store remote keys refer to, if any.
    ///
    /// A store URL wins over a local directory.
    pub fn memory_store(&self) -> Option<Arc<dyn MemoryStore>> {
        if let Some(url) = &self.memory_store_url {
            return Some(Arc::new(
                HttpMemoryStore::new(url.clone()).with_request_timeout(self.request_period()),
            ));
        }
        if let Some(dir) = &self.memory_dir {
            return Some(Arc::new(JsonFileMemoryStore::new(dir.clone())));
        }
        if self.memory_posts_id.is_some() || self.memory_replies_id.is_some() {
            warn!("Memory ids are set but no memory store is configured, memory will not survive restarts");
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::default()
            .source(Some(map))
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("signals")
    }

    #[test]
    fn test_environment_names() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("chirp.toml");
        std::fs::write(&file, "handle = \"from_file\"\nport = 8080\n").unwrap();

        let config = AgentConfig::load_from(
            Some(&file),
            env(&[
                ("HANDLE", "catbot"),
                ("ACCESS_TOKEN", "secret"),
                ("POST_INTERVAL_LENGTH", "3.5"),
                ("MEMORY_DURATION", "4"),
                ("MEMORY_POSTS_ID", "12345"),
                ("SIGNALS", "good kitty,meow"),
            ]),
        )
        .unwrap();

        assert_eq!(config.handle(), "catbot");
        assert_eq!(*config.port(), 8080);
        assert_eq!(*config.post_interval_length(), 3.5);
        assert_eq!(*config.memory_duration(), 4);
        assert_eq!(config.memory_posts_id().as_deref(), Some("12345"));
        assert_eq!(config.signals(), &vec!["good kitty".to_string(), "meow".to_string()]);
    }

    #[test]
    fn test_missing_credentials_fail() {
        let err = AgentConfig::load_from(None, env(&[("ACCESS_TOKEN", "secret")])).unwrap_err();
        assert!(err.kind().is_fatal());
        assert!(err.to_string().contains("HANDLE"));

        let err = AgentConfig::load_from(None, env(&[("HANDLE", "catbot")])).unwrap_err();
        assert!(err.to_string().contains("ACCESS_TOKEN"));
    }

    #[test]
    fn test_minutes_rejects_non_positive() {
        assert_eq!(minutes(0.0, "x").unwrap_err().setting(), Some("x"));
        assert!(minutes(-1.0, "x").is_err());
        assert!(minutes(f64::NAN, "x").is_err());
        assert_eq!(minutes(0.5, "x").unwrap(), Duration::from_secs(30));
    }
}
