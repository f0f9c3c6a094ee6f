//! Error types for the EventMap core.
//!
//! Every failure in the map layer is non-fatal to the session. The variants
//! below classify failures so callers can decide whether to log and carry
//! on (engine writes, network) or to disable a single feature (configuration).

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Result type alias using EventMapError as the error type.
pub type Result<T> = std::result::Result<T, EventMapError>;

/// Top-level error type for EventMap operations.
#[derive(Debug, Error, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum EventMapError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Event dataset errors
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Map engine errors
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
}

/// Errors related to configuration.
///
/// A configuration error disables the feature it belongs to (usually the map
/// itself) but never the rest of the page.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {reason}")]
    InvalidFormat { reason: String },

    /// Missing required configuration field
    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    /// Creates a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while loading the event dataset.
#[derive(Debug, Error, Serialize, Deserialize, PartialEq)]
pub enum DataError {
    /// Record has neither an explicit lon/lat pair nor a planar pair
    #[error("Event '{id}' has no usable location")]
    MissingLocation { id: String },

    /// Two records share the same id
    #[error("Duplicate event id: {id}")]
    DuplicateId { id: String },

    /// A coordinate is NaN or infinite
    #[error("Event '{id}' has a non-finite {field}")]
    NonFinite { id: String, field: String },

    /// An explicit coordinate lies outside its geographic range
    #[error("Event '{id}' has {field} = {value} outside its valid range")]
    OutOfRange { id: String, field: String, value: f64 },

    /// Dataset could not be decoded
    #[error("Invalid event dataset: {reason}")]
    InvalidFormat { reason: String },
}

impl DataError {
    /// Creates a missing location error.
    pub fn missing_location(id: impl Into<String>) -> Self {
        Self::MissingLocation { id: id.into() }
    }

    /// Creates a non-finite coordinate error.
    pub fn non_finite(id: impl Into<String>, field: impl Into<String>) -> Self {
        Self::NonFinite {
            id: id.into(),
            field: field.into(),
        }
    }
}

/// Errors reported by a map engine.
///
/// Paint-property failures are expected during theming and are swallowed one
/// write at a time.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum EngineError {
    /// No engine is attached to the map context yet
    #[error("Map engine is not ready")]
    NotReady,

    /// Layer id is not part of the current style
    #[error("Unknown layer: {layer}")]
    UnknownLayer { layer: String },

    /// Layer exists but does not accept the property
    #[error("Layer '{layer}' does not support paint property '{property}'")]
    UnsupportedProperty { layer: String, property: String },

    /// Style URL cannot be resolved
    #[error("Unknown style: {url}")]
    UnknownStyle { url: String },

    /// Engine refused the operation for another reason
    #[error("Engine rejected operation: {reason}")]
    Rejected { reason: String },
}

impl EngineError {
    /// Creates an unsupported property error.
    pub fn unsupported(layer: impl Into<String>, property: impl Into<String>) -> Self {
        Self::UnsupportedProperty {
            layer: layer.into(),
            property: property.into(),
        }
    }
}

/// Wrapper for I/O errors to make them serializable.
#[derive(Debug, Error, Serialize, Deserialize)]
#[error("I/O error: {kind}: {message}")]
pub struct IoError {
    pub kind: String,
    pub message: String,
}

impl From<io::Error> for IoError {
    fn from(err: io::Error) -> Self {
        Self {
            kind: format!("{:?}", err.kind()),
            message: err.to_string(),
        }
    }
}

impl From<io::Error> for EventMapError {
    fn from(err: io::Error) -> Self {
        EventMapError::Io(err.into())
    }
}
