//! Dashtrack Library
//!
//! Reconstructs geographic tracks from the GPS telemetry embedded in dashcam
//! and action-camera video, or from GPX files, and writes them as GeoJSON
//! feature collections.
//!
//! The pipeline for a video is: [`telemetry`] extracts ordered fixes,
//! [`timebase`] places them on the video timeline, [`projection`] adds
//! EPSG:3857 coordinates, and [`track`] assembles the line and point
//! features. [`gpx`] is the alternate ingestion path.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod gpx;
pub mod output;
pub mod ports;
pub mod projection;
pub mod telemetry;
pub mod timebase;
pub mod track;
pub mod utils;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use domain::model::{AssemblyMode, Fix, PointProperty, SourceKind, TimeBase, TimestampFormat, Track};
pub use error::{TrackError, TrackResult};
pub use track::{FeatureOptions, TrackBuilder};
