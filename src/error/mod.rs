//! Error handling module for TrackAlign

use thiserror::Error;

use crate::domain::errors::AlignmentFailure;

/// Main error type for TrackAlign operations
///
/// `Config` and `Validation` are fatal for a whole batch: they are raised
/// before any track is processed. Per-track problems are reported as
/// [`AlignmentFailure`] inside the batch result instead; `TrackFailed` only
/// surfaces from the two-track convenience API where there is no batch map
/// to carry the failure.
#[derive(Error, Debug)]
pub enum AlignError {
    /// Invalid alignment configuration
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Invalid batch input (no reference track, bad durations, ...)
    #[error("Invalid track data: {message}")]
    Validation { message: String },

    /// A single track could not be aligned
    #[error("Track '{track_id}' could not be aligned: {source}")]
    TrackFailed {
        track_id: String,
        #[source]
        source: AlignmentFailure,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML (de)serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl AlignError {
    /// Shorthand for a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        AlignError::Config {
            message: message.into(),
        }
    }

    /// Shorthand for a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        AlignError::Validation {
            message: message.into(),
        }
    }
}

/// Result type alias for TrackAlign operations
pub type AlignResult<T> = std::result::Result<T, AlignError>;
