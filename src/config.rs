//! Service configuration.
//!
//! Settings come from an optional TOML file (every section and key may be
//! omitted) and the OpenWeather access key comes from the environment, with
//! a `.env` file loaded first if present.
//!
//! ```toml
//! [weather]
//! base_url = "https://api.openweathermap.org/data/2.5/weather"
//! timeout_secs = 15
//!
//! [analysis]
//! window = 30
//! workers = 8
//!
//! [logging]
//! level = "info"
//! file = "tempmon.log"
//! timestamps = true
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::logging::LogLevel;

/// Environment variable holding the OpenWeather access key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_WINDOW: usize = 30;
pub const DEFAULT_WORKERS: usize = 8;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML in config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("OPENWEATHER_API_KEY is not set")]
    MissingApiKey,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Where and how to reach the current-weather endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WeatherEndpoint {
    pub base_url: String,
    pub timeout_secs: u64,
    pub units: String,
}

impl Default for WeatherEndpoint {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            units: "metric".to_string(),
        }
    }
}

impl WeatherEndpoint {
    /// Endpoint at a custom base URL with the default timeout.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisDefaults {
    pub window: usize,
    pub workers: usize,
}

impl Default for AnalysisDefaults {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            workers: DEFAULT_WORKERS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: true,
        }
    }
}

impl LoggingConfig {
    pub fn log_level(&self) -> Result<LogLevel, ConfigError> {
        self.level.parse().map_err(ConfigError::Invalid)
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub weather: WeatherEndpoint,
    pub analysis: AnalysisDefaults,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let mut config: AppConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or fall back to defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                let text = std::fs::read_to_string(p).map_err(|source| ConfigError::Io {
                    path: p.display().to_string(),
                    source,
                })?;
                Self::from_toml_str(&text)
            }
            None => Ok(Self::default()),
        }
    }

    fn validate(&mut self) -> Result<(), ConfigError> {
        if self.analysis.window == 0 {
            return Err(ConfigError::Invalid("analysis.window must be at least 1".into()));
        }
        if self.weather.timeout_secs == 0 {
            return Err(ConfigError::Invalid("weather.timeout_secs must be positive".into()));
        }
        if self.weather.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("weather.base_url must not be empty".into()));
        }
        self.analysis.workers = self.analysis.workers.max(1);
        self.logging.log_level()?;
        Ok(())
    }
}

/// Read the access key from the environment, loading `.env` first.
pub fn api_key_from_env() -> Result<String, ConfigError> {
    dotenv::dotenv().ok();
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(ConfigError::MissingApiKey),
    }
}
