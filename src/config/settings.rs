//! Application settings and configuration management

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use crate::catalog::DEFAULT_CATALOG_URL;
use crate::playback::{PlaybackDefaults, PlaybackRate, ALLOWED_PLAYBACK_RATES};

/// Application settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Base URL of the book catalog API
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,
    /// Seconds moved by the skip forward/back buttons
    #[serde(default = "default_skip_seconds")]
    pub skip_seconds: f64,
    /// Initial volume for every new book, 0-100
    #[serde(default = "default_volume")]
    pub default_volume: f64,
    /// Initial playback speed for every new book
    #[serde(default = "default_playback_rate")]
    pub default_playback_rate: f64,
    /// How often the media clock reports progress while playing
    #[serde(default = "default_clock_cadence_ms")]
    pub clock_cadence_ms: u64,
    /// Timeout for catalog and media requests
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_catalog_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

fn default_skip_seconds() -> f64 {
    10.0
}

fn default_volume() -> f64 {
    100.0
}

fn default_playback_rate() -> f64 {
    1.0
}

fn default_clock_cadence_ms() -> u64 {
    250
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Error types for configuration operations
#[derive(Debug)]
pub enum ConfigError {
    IoError(io::Error),
    ParseError(String),
    ValidationError(String),
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "I/O error: {}", e),
            ConfigError::ParseError(s) => write!(f, "Parse error: {}", s),
            ConfigError::ValidationError(s) => write!(f, "Validation error: {}", s),
        }
    }
}

impl Error for ConfigError {}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            catalog_url: default_catalog_url(),
            skip_seconds: default_skip_seconds(),
            default_volume: default_volume(),
            default_playback_rate: default_playback_rate(),
            clock_cadence_ms: default_clock_cadence_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Settings {
    /// Load settings from a file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(&self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("summarist").join("config.json")
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog_url.trim().is_empty() {
            return Err(ConfigError::ValidationError("Catalog URL cannot be empty".to_string()));
        }
        if let Err(e) = url::Url::parse(&self.catalog_url) {
            return Err(ConfigError::ValidationError(format!("Catalog URL is invalid: {}", e)));
        }

        if !(self.skip_seconds.is_finite() && self.skip_seconds > 0.0) {
            return Err(ConfigError::ValidationError("Skip step must be a positive number of seconds".to_string()));
        }

        if !(0.0..=100.0).contains(&self.default_volume) {
            return Err(ConfigError::ValidationError("Default volume must be between 0 and 100".to_string()));
        }

        if PlaybackRate::new(self.default_playback_rate).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "Default playback rate must be one of {:?}",
                ALLOWED_PLAYBACK_RATES
            )));
        }

        if self.clock_cadence_ms == 0 {
            return Err(ConfigError::ValidationError("Clock cadence must be greater than zero".to_string()));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError("Request timeout must be at least one second".to_string()));
        }

        Ok(())
    }

    /// Session defaults for the playback controller.
    /// Out-of-range values fall back to full volume and normal speed.
    pub fn playback_defaults(&self) -> PlaybackDefaults {
        let volume = if (0.0..=100.0).contains(&self.default_volume) {
            self.default_volume / 100.0
        } else {
            1.0
        };
        PlaybackDefaults {
            volume,
            playback_rate: PlaybackRate::new(self.default_playback_rate).unwrap_or_default(),
        }
    }

    pub fn clock_cadence(&self) -> StdDuration {
        StdDuration::from_millis(self.clock_cadence_ms)
    }

    pub fn request_timeout(&self) -> StdDuration {
        StdDuration::from_secs(self.request_timeout_secs)
    }
}
