//! Configuration management for the `AirWatch` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::AirWatchError;
use crate::models::City;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for the `AirWatch` application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirWatchConfig {
    /// Air-quality API key, sent as the `appid` query parameter
    #[serde(default)]
    pub api_key: String,
    /// Air-quality API endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Minimum spacing between two fetches for the same city
    #[serde(default = "default_min_request_interval")]
    pub min_request_interval_seconds: u64,
    /// Directory holding the error log and the history files
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Cities to monitor
    #[serde(default = "default_cities")]
    pub cities: Vec<City>,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_base_url() -> String {
    "http://api.openweathermap.org/data/2.5/air_pollution".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_min_request_interval() -> u64 {
    60
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_cities() -> Vec<City> {
    vec![
        City::new("Moscow", 55.7558, 37.6173),
        City::new("Saint Petersburg", 59.9343, 30.3351),
        City::new("Novosibirsk", 55.0084, 82.9357),
        City::new("Yekaterinburg", 56.8389, 60.6057),
        City::new("Kazan", 55.7961, 49.1064),
    ]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for AirWatchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            request_timeout_seconds: default_request_timeout(),
            min_request_interval_seconds: default_min_request_interval(),
            log_dir: default_log_dir(),
            cities: default_cities(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AirWatchConfig {
    /// Load configuration from file and environment variables
    ///
    /// An explicit `config_path` must exist. Without one, the user config
    /// directory and then `./config.toml` are tried, and neither is required.
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let (config_file, required) = match config_path {
            Some(path) => {
                if !path.is_file() {
                    return Err(AirWatchError::config(format!(
                        "Config file not found: {}",
                        path.display()
                    ))
                    .into());
                }
                (path, true)
            }
            None => (
                Self::get_config_path()
                    .filter(|path| path.exists())
                    .unwrap_or_else(|| PathBuf::from("config.toml")),
                false,
            ),
        };

        if required || config_file.exists() {
            builder = builder.add_source(
                File::from(config_file)
                    .required(required)
                    .format(config::FileFormat::Toml),
            );
        }

        // AIRWATCH_API_KEY -> api_key, AIRWATCH_LOGGING__LEVEL -> logging.level
        builder = builder.add_source(
            Environment::with_prefix("AIRWATCH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AirWatchConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("airwatch").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.base_url.is_empty() {
            self.base_url = default_base_url();
        }
        if self.request_timeout_seconds == 0 {
            self.request_timeout_seconds = default_request_timeout();
        }
        if self.log_dir.as_os_str().is_empty() {
            self.log_dir = default_log_dir();
        }
        if self.cities.is_empty() {
            self.cities = default_cities();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    ///
    /// The API key is checked separately by [`Self::validate_api_key`], since
    /// reading history does not need one.
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_cities()?;
        Ok(())
    }

    /// Validate the API key
    pub fn validate_api_key(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(AirWatchError::config(
                "API key is required. Set api_key in config.toml or AIRWATCH_API_KEY.",
            )
            .into());
        }

        if self.api_key.len() > 100 {
            return Err(AirWatchError::config(
                "API key appears to be invalid (too long). Please check your API key.",
            )
            .into());
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.request_timeout_seconds == 0 {
            return Err(AirWatchError::config("Request timeout must be at least 1 second").into());
        }

        if self.request_timeout_seconds > 300 {
            return Err(
                AirWatchError::config("Request timeout cannot exceed 300 seconds").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AirWatchError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AirWatchError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(
                AirWatchError::config("Base URL must be a valid HTTP or HTTPS URL").into(),
            );
        }

        Ok(())
    }

    /// Validate the configured city list
    fn validate_cities(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for city in &self.cities {
            if city.name.trim().is_empty() {
                return Err(AirWatchError::config("City names cannot be empty").into());
            }
            if !seen.insert(city.name.to_lowercase()) {
                return Err(
                    AirWatchError::config(format!("Duplicate city '{}'", city.name)).into(),
                );
            }
            if !city.has_valid_coordinates() {
                return Err(AirWatchError::config(format!(
                    "City '{}' has invalid coordinates: {}",
                    city.name,
                    city.format_coordinates()
                ))
                .into());
            }
        }
        Ok(())
    }

    /// Look up a configured city by name, ignoring case
    #[must_use]
    pub fn city(&self, name: &str) -> Option<&City> {
        let name = name.trim().to_lowercase();
        self.cities
            .iter()
            .find(|city| city.name.to_lowercase() == name)
    }

    /// Per-request timeout
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Minimum spacing between fetches for one city
    #[must_use]
    pub fn min_request_interval(&self) -> Duration {
        Duration::from_secs(self.min_request_interval_seconds)
    }

    /// Directory holding per-city history files
    #[must_use]
    pub fn history_dir(&self) -> PathBuf {
        self.log_dir.join("history")
    }

    /// Path of the persistent error log
    #[must_use]
    pub fn error_log_path(&self) -> PathBuf {
        self.log_dir.join("errors.log")
    }
}
