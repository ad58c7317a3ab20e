//! Error types for metarmap.
//!
//! Malformed report fields, unmatched identifiers and stale slots are not
//! errors: the parser leaves the field absent, and the registry drops or keeps
//! data by policy. The variants here cover configuration, feed and rendering
//! failures around that core.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for metarmap operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Registry Errors ===
    /// More airports were configured than the display has positions for.
    #[error("{requested} airport slots configured, but at most {max} are supported")]
    SlotCapacity {
        /// Number of slots requested.
        requested: usize,
        /// Configured maximum.
        max: usize,
    },

    // === Feed Errors ===
    /// Failed to read reports from the feed source.
    #[error("failed to read reports from {path}: {source}")]
    FeedRead {
        /// Path of the report source.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Render Errors ===
    /// The strip renderer failed to draw a frame.
    #[error("render error: {0}")]
    Render(#[source] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for metarmap operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create a feed read error for the given path.
    #[must_use]
    pub fn feed_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FeedRead {
            path: path.into(),
            source,
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error came from the report feed.
    #[must_use]
    pub fn is_feed_error(&self) -> bool {
        matches!(self, Self::FeedRead { .. })
    }

    /// Check if this error is a configuration problem.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigLoad(_) | Self::ConfigValidation { .. } | Self::SlotCapacity { .. }
        )
    }
}
