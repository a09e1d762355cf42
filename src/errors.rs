//! Error types for seismap.
//!
//! Uses `thiserror` for library-style error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in seismap operations.
#[derive(Error, Debug)]
pub enum SeismapError {
    /// Zoom level outside the configured tile set
    #[error("invalid zoom level {zoom} (expected 0..={max})")]
    InvalidZoomLevel { zoom: i64, max: u8 },

    /// Coordinate rejected by strict validation
    #[error("coordinate out of range: lat {latitude}, lon {longitude}")]
    CoordinateOutOfRange { latitude: f64, longitude: f64 },

    /// Quadkey contains something other than base-4 digits
    #[error("invalid quadkey: {0}")]
    InvalidQuadKey(String),

    /// Reading a file failed
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Event validation failed
    #[error("Invalid event data: {0}")]
    Validation(String),

    /// Configuration rejected
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// No event with the requested ID
    #[error("event not found: {0}")]
    EventNotFound(String),
}
