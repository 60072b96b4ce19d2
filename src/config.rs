//! Configuration management for the `PlaceMap` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::PlaceMapError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `PlaceMap` application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceMapConfig {
    /// Places backend configuration
    #[serde(default)]
    pub backend: BackendConfig,
    /// Page server configuration
    #[serde(default)]
    pub web: WebConfig,
    /// Map rendering configuration
    #[serde(default)]
    pub map: MapConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Default widget settings
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Places backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL the four place endpoints hang off
    #[serde(default = "default_backend_base_url")]
    pub base_url: String,
    /// Request timeout in seconds; unset leaves the transport default
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

/// Page server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// Maximum number of mounted pages kept in memory
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

/// Map tile settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Tile URL template
    #[serde(default = "default_tile_url")]
    pub tile_url: String,
    /// Attribution shown in the map corner
    #[serde(default = "default_attribution")]
    pub attribution: String,
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

/// Default widget settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Initial radius of the nearby search in kilometers
    #[serde(default = "default_search_radius")]
    pub search_radius_km: f64,
}

// Default value functions
fn default_backend_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_web_host() -> String {
    "0.0.0.0".to_string()
}

fn default_web_port() -> u16 {
    3000
}

fn default_max_sessions() -> usize {
    1024
}

fn default_tile_url() -> String {
    "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()
}

fn default_attribution() -> String {
    "&copy; OpenStreetMap contributors".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_search_radius() -> f64 {
    5.0
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_base_url(),
            timeout_seconds: None,
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile_url: default_tile_url(),
            attribution: default_attribution(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            search_radius_km: default_search_radius(),
        }
    }
}

impl Default for PlaceMapConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            web: WebConfig::default(),
            map: MapConfig::default(),
            logging: LoggingConfig::default(),
            defaults: DefaultsConfig::default(),
        }
    }
}

impl PlaceMapConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // PLACEMAP_BACKEND__BASE_URL, PLACEMAP_WEB__PORT, ...
        builder = builder.add_source(
            Environment::with_prefix("PLACEMAP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: PlaceMapConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("placemap").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.backend.base_url.is_empty() {
            self.backend.base_url = default_backend_base_url();
        }
        if self.web.host.is_empty() {
            self.web.host = default_web_host();
        }
        if self.web.max_sessions == 0 {
            self.web.max_sessions = default_max_sessions();
        }
        if self.map.tile_url.is_empty() {
            self.map.tile_url = default_tile_url();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.defaults.search_radius_km == 0.0 {
            self.defaults.search_radius_km = default_search_radius();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if let Some(timeout) = self.backend.timeout_seconds {
            if timeout == 0 || timeout > 300 {
                return Err(PlaceMapError::config(
                    "Backend timeout must be between 1 and 300 seconds",
                )
                .into());
            }
        }

        if self.web.max_sessions > 100_000 {
            return Err(PlaceMapError::config("Max sessions cannot exceed 100000").into());
        }

        let radius = self.defaults.search_radius_km;
        if !radius.is_finite() || radius <= 0.0 || radius > 20_000.0 {
            return Err(PlaceMapError::config(
                "Default search radius must be between 0 and 20000 km",
            )
            .into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(PlaceMapError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(PlaceMapError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.backend.base_url.starts_with("http://")
            && !self.backend.base_url.starts_with("https://")
        {
            return Err(PlaceMapError::config(
                "Backend base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        if !self.map.tile_url.contains("{z}")
            || !self.map.tile_url.contains("{x}")
            || !self.map.tile_url.contains("{y}")
        {
            return Err(PlaceMapError::config(
                "Tile URL must contain {z}, {x} and {y} placeholders",
            )
            .into());
        }

        Ok(())
    }
}
