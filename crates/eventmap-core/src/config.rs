//! Configuration management for EventMap.
//!
//! This module provides a configuration system that supports:
//! - Loading from YAML files
//! - Environment variable overrides (`EVENTMAP__SECTION__KEY`)
//! - Validation of all settings
//! - Map styles, theme tokens, geocoder settings and logging

use crate::error::{ConfigError, Result};
use crate::types::{GeoPoint, ScreenSize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

/// Main application configuration.
///
/// # Examples
///
/// ```
/// use eventmap_core::config::AppConfig;
///
/// let config = AppConfig::from_yaml("map:\n  access_token: pk.test\n").unwrap();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.search.limit, 5);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Map engine settings
    #[serde(default)]
    pub map: MapConfig,

    /// Visual theme tokens
    #[serde(default)]
    pub theme: ThemeConfig,

    /// Geocoding search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Event dataset settings
    #[serde(default)]
    pub events: EventsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path.display().to_string()).into());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::from_yaml(&contents)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            ConfigError::InvalidFormat {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Loads configuration using the `config` crate, layering environment
    /// variables (`EVENTMAP__MAP__ACCESS_TOKEN`, ...) over the file.
    pub fn from_config_builder<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let config = config::Config::builder()
            .add_source(config::File::from(path).required(true))
            .add_source(
                config::Environment::with_prefix("EVENTMAP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::LoadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        config.try_deserialize().map_err(|e| {
            ConfigError::InvalidFormat {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Validates numeric ranges.
    ///
    /// A missing access token is not a validation failure: it only disables
    /// the map (see [`MapConfig::require_access_token`]).
    pub fn validate(&self) -> Result<()> {
        self.map.validate()?;
        self.search.validate()?;
        self.logging.parse_level()?;
        Ok(())
    }
}

/// Initial camera of the map.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InitialView {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
}

impl Default for InitialView {
    fn default() -> Self {
        Self {
            longitude: 0.0,
            latitude: 0.0,
            zoom: 1.0,
        }
    }
}

impl InitialView {
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.longitude, self.latitude)
    }
}

/// Optional alternative style URLs offered by the style selector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleUrls {
    pub default: Option<String>,
    pub alt1: Option<String>,
    /// The dark style
    pub alt2: Option<String>,
    pub terrain: Option<String>,
    pub satellite: Option<String>,
}

/// Viewport size used by the headless engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

impl ViewportConfig {
    pub fn size(&self) -> ScreenSize {
        ScreenSize::new(self.width, self.height)
    }
}

/// Map engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Access credential for the map provider
    #[serde(default)]
    pub access_token: Option<String>,

    /// Style loaded at mount time
    #[serde(default = "default_style_url")]
    pub style_url: String,

    #[serde(default)]
    pub styles: StyleUrls,

    #[serde(default)]
    pub initial_view: InitialView,

    #[serde(default = "default_projection")]
    pub projection: String,

    #[serde(default)]
    pub viewport: ViewportConfig,
}

fn default_style_url() -> String {
    "mapbox://styles/mapbox/streets-v11".to_string()
}

fn default_projection() -> String {
    "globe".to_string()
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            style_url: default_style_url(),
            styles: StyleUrls::default(),
            initial_view: InitialView::default(),
            projection: default_projection(),
            viewport: ViewportConfig::default(),
        }
    }
}

impl MapConfig {
    /// Returns the access token, or a configuration error if it is unset.
    pub fn require_access_token(&self) -> std::result::Result<&str, ConfigError> {
        match self.access_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(ConfigError::missing_field("map.access_token")),
        }
    }

    /// The style mounted first: the configured default option, else `style_url`.
    pub fn initial_style_url(&self) -> &str {
        self.styles.default.as_deref().unwrap_or(&self.style_url)
    }

    pub fn validate(&self) -> Result<()> {
        if self.style_url.trim().is_empty() {
            return Err(ConfigError::missing_field("map.style_url").into());
        }
        if !(self.initial_view.zoom >= 0.0) {
            return Err(ConfigError::invalid_value(
                "map.initial_view.zoom",
                "zoom must be non-negative",
            )
            .into());
        }
        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            return Err(ConfigError::invalid_value(
                "map.viewport",
                "width and height must be positive",
            )
            .into());
        }
        Ok(())
    }
}

/// Visual theme mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

/// Named color tokens per theme mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(default)]
    pub mode: ThemeMode,

    #[serde(default)]
    pub light: BTreeMap<String, String>,

    #[serde(default)]
    pub dark: BTreeMap<String, String>,
}

/// Geocoding search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_geocoder_url")]
    pub geocoder_url: String,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_limit")]
    pub limit: usize,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_geocoder_url() -> String {
    "https://photon.komoot.io/api".to_string()
}

fn default_debounce_ms() -> u64 {
    400
}

fn default_limit() -> usize {
    5
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            geocoder_url: default_geocoder_url(),
            debounce_ms: default_debounce_ms(),
            limit: default_limit(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(
                ConfigError::invalid_value("search.limit", "limit must be positive").into(),
            );
        }
        if self.geocoder_url.trim().is_empty() {
            return Err(ConfigError::missing_field("search.geocoder_url").into());
        }
        Ok(())
    }
}

/// Event dataset settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventsConfig {
    /// JSON file holding the event records
    pub dataset: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    /// Parses the log level string to a tracing Level.
    pub fn parse_level(&self) -> Result<Level> {
        self.level.parse().map_err(|_| {
            ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Invalid log level: {}", self.level),
            }
            .into()
        })
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
}
