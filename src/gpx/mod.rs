//! GPX ingestion and fixed-frequency resampling
//!
//! The resampled track carries elevation but no speed, heading or frame
//! information; GPX timestamps are already absolute.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::domain::model::Fix;
use crate::domain::rules;
use crate::error::{TrackError, TrackResult};

pub mod reader;
pub mod resample;

pub use reader::{parse_gpx, parse_gpx_time};
pub use resample::{sample_count, time_grid, LinearInterpolant};

/// Lowest accepted sampling frequency in Hz
pub const MIN_FREQUENCY: f64 = 1.0;

/// Resamples a GPX track onto a uniform time grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpxResampler {
    frequency: f64,
}

impl GpxResampler {
    pub fn new(frequency: f64) -> TrackResult<Self> {
        if !frequency.is_finite() || frequency < MIN_FREQUENCY {
            return Err(TrackError::InvalidFrequency { frequency });
        }
        Ok(Self { frequency })
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Read and resample a GPX file
    pub async fn load(&self, path: &Path) -> TrackResult<Vec<Fix>> {
        let xml = tokio::fs::read_to_string(path).await?;
        let label = path.display().to_string();
        let fixes = self.resample_document(&label, &xml)?;
        info!(
            gpx = %label,
            samples = fixes.len(),
            frequency = self.frequency,
            "Resampled GPX track"
        );
        Ok(fixes)
    }

    /// Parse a GPX document and resample its track points
    pub fn resample_document(&self, source: &str, xml: &str) -> TrackResult<Vec<Fix>> {
        let mut points = rules::dedup_fixes(parse_gpx(source, xml)?);
        rules::order_fixes(&mut points);
        debug!(source, points = points.len(), "Read GPX track points");
        self.resample(&points)
    }

    /// Interpolate latitude, longitude and elevation onto the grid.
    ///
    /// `points` must be ordered by time. Elevation is only carried when every
    /// source point has one.
    pub fn resample(&self, points: &[Fix]) -> TrackResult<Vec<Fix>> {
        if points.len() < 2 {
            return Err(TrackError::InsufficientData {
                found: points.len(),
            });
        }

        let first = points[0].timestamp;
        let last = points[points.len() - 1].timestamp;
        let xs: Vec<f64> = points
            .iter()
            .map(|p| resample::seconds_since(first, p.timestamp))
            .collect();

        let interpolant =
            |values: Vec<f64>| LinearInterpolant::new(xs.clone(), values);
        let latitude = interpolant(points.iter().map(|p| p.latitude).collect());
        let longitude = interpolant(points.iter().map(|p| p.longitude).collect());

        let elevations: Option<Vec<f64>> = points.iter().map(|p| p.elevation).collect();
        let elevation = match elevations {
            Some(values) => Some(interpolant(values)),
            None => {
                if points.iter().any(|p| p.elevation.is_some()) {
                    warn!("Some GPX points lack elevation; elevation dropped from resampled track");
                }
                None
            }
        };

        let fixes = time_grid(first, last, self.frequency)
            .into_iter()
            .map(|t| {
                let x = resample::seconds_since(first, t);
                Fix::new(t, latitude.at(x), longitude.at(x))
                    .with_elevation(elevation.as_ref().map(|f| f.at(x)))
            })
            .collect();
        Ok(fixes)
    }
}
