//! Error handling module for dashtrack

use thiserror::Error;

/// Main error type for track reconstruction
#[derive(Error, Debug)]
pub enum TrackError {
    /// External metadata tool failed, timed out, or could not be started
    #[error("Telemetry extraction failed for {path}: {message}")]
    TelemetryExtraction { path: String, message: String },

    /// Tool output does not have the expected record shape
    #[error("Malformed telemetry: {message}")]
    MalformedTelemetry { message: String },

    /// Frame rate, creation time or duration could not be established
    #[error("Unable to resolve video time base: {message}")]
    TimeBaseUnresolved { message: String },

    /// No usable fixes remain for the source
    #[error("Track '{source_name}' has no usable GPS fixes")]
    EmptyTrack { source_name: String },

    /// GPX track is too short to resample
    #[error("GPX track needs at least 2 timed points, found {found}")]
    InsufficientData { found: usize },

    /// Resampling frequency below one sample per second
    #[error("Invalid resampling frequency {frequency}: must be at least 1 sample per second")]
    InvalidFrequency { frequency: f64 },

    /// Unknown feature collection assembly mode
    #[error("Invalid assembly mode: {mode}. Choose 'all', 'point', or 'line'")]
    InvalidAssemblyMode { mode: String },

    /// GPX document could not be read
    #[error("Failed to parse GPX {path}: {message}")]
    GpxParse { path: String, message: String },

    /// A merge input is not a GeoJSON feature collection
    #[error("Cannot merge {path}: {message}")]
    MergeInput { path: String, message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// GeoJSON structure error
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}

impl TrackError {
    /// Whether a batch run may skip the offending source and keep going
    pub fn is_recoverable(&self) -> bool {
        match self {
            TrackError::TelemetryExtraction { .. }
            | TrackError::MalformedTelemetry { .. }
            | TrackError::TimeBaseUnresolved { .. }
            | TrackError::EmptyTrack { .. }
            | TrackError::InsufficientData { .. }
            | TrackError::GpxParse { .. }
            | TrackError::MergeInput { .. }
            | TrackError::Io(_)
            | TrackError::Json(_)
            | TrackError::GeoJson(_) => true,
            TrackError::InvalidFrequency { .. }
            | TrackError::InvalidAssemblyMode { .. }
            | TrackError::Config { .. } => false,
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        TrackError::MalformedTelemetry {
            message: message.into(),
        }
    }

    pub(crate) fn unresolved(message: impl Into<String>) -> Self {
        TrackError::TimeBaseUnresolved {
            message: message.into(),
        }
    }
}

/// Result type alias for dashtrack operations
pub type TrackResult<T> = std::result::Result<T, TrackError>;
