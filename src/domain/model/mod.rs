// Domain models - Core types and data structures

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::rules;
use crate::error::{TrackError, TrackResult};


/// Planar coordinates in EPSG:3857 (meters)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
}

/// One GPS record as reported by the metadata tool, before time parsing
#[derive(Debug, Clone, PartialEq)]
pub struct RawGpsRecord {
    pub datetime: String,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: Option<f64>,
    pub heading: Option<f64>,
}

/// One timestamped GPS observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projected: Option<ProjectedPoint>,
}

impl Fix {
    /// Create a bare fix with no optional fields
    pub fn new(timestamp: DateTime<Utc>, latitude: f64, longitude: f64) -> Self {
        Self {
            timestamp,
            latitude,
            longitude,
            elevation: None,
            speed: None,
            heading: None,
            elapsed_seconds: None,
            frame_index: None,
            projected: None,
        }
    }

    pub fn with_elevation(mut self, elevation: Option<f64>) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn with_motion(mut self, speed: Option<f64>, heading: Option<f64>) -> Self {
        self.speed = speed;
        self.heading = heading;
        self
    }
}

/// Anchors a video's frame indices to wall-clock time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBase {
    pub frame_rate: f64,
    pub start_time: DateTime<Utc>,
    pub creation_time: DateTime<Utc>,
    pub duration_seconds: i64,
}

impl TimeBase {
    /// Resolve the start time as `creation_time - duration`
    pub fn new(
        creation_time: DateTime<Utc>,
        duration: Duration,
        frame_rate: f64,
    ) -> TrackResult<Self> {
        if !frame_rate.is_finite() || frame_rate <= 0.0 {
            return Err(TrackError::unresolved(format!(
                "frame rate must be positive, got {}",
                frame_rate
            )));
        }

        Ok(Self {
            frame_rate,
            start_time: creation_time - duration,
            creation_time,
            duration_seconds: duration.num_seconds(),
        })
    }

    /// Whole seconds from the start time, truncated toward zero
    pub fn elapsed_seconds(&self, timestamp: DateTime<Utc>) -> i64 {
        (timestamp - self.start_time).num_seconds()
    }

    /// Frame index before normalization; may be negative
    pub fn raw_frame_index(&self, elapsed_seconds: i64) -> i64 {
        (elapsed_seconds as f64 * self.frame_rate).floor() as i64
    }
}

/// Where a track's fixes came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// Telemetry embedded in the video container
    Video,
    /// External GPX track file
    Gpx,
}

/// An ordered, immutable sequence of fixes from one source
#[derive(Debug, Clone, Serialize)]
pub struct Track {
    source_name: String,
    kind: SourceKind,
    fixes: Vec<Fix>,
    time_base: Option<TimeBase>,
    total_distance_meters: f64,
}

impl Track {
    /// Build a track; fails when there is nothing to draw
    pub fn new(
        source_name: impl Into<String>,
        kind: SourceKind,
        fixes: Vec<Fix>,
        time_base: Option<TimeBase>,
    ) -> TrackResult<Self> {
        let source_name = source_name.into();
        if fixes.is_empty() {
            return Err(TrackError::EmptyTrack { source_name });
        }

        let total_distance_meters = rules::total_distance_meters(&fixes);

        Ok(Self {
            source_name,
            kind,
            fixes,
            time_base,
            total_distance_meters,
        })
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn fixes(&self) -> &[Fix] {
        &self.fixes
    }

    pub fn time_base(&self) -> Option<&TimeBase> {
        self.time_base.as_ref()
    }

    pub fn total_distance_meters(&self) -> f64 {
        self.total_distance_meters
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    /// Timestamp of the first fix
    pub fn start_time(&self) -> DateTime<Utc> {
        self.fixes[0].timestamp
    }

    /// Timestamp of the last fix
    pub fn end_time(&self) -> DateTime<Utc> {
        self.fixes[self.fixes.len() - 1].timestamp
    }
}

/// Which features go into the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssemblyMode {
    /// Line feature followed by one point per fix
    All,
    /// Points only
    Point,
    /// Line only
    Line,
}

impl AssemblyMode {
    /// Parse assembly mode from string
    pub fn parse(mode_str: &str) -> TrackResult<Self> {
        match mode_str.trim().to_lowercase().as_str() {
            "all" => Ok(AssemblyMode::All),
            "point" => Ok(AssemblyMode::Point),
            "line" => Ok(AssemblyMode::Line),
            _ => Err(TrackError::InvalidAssemblyMode {
                mode: mode_str.to_string(),
            }),
        }
    }

    pub fn includes_line(&self) -> bool {
        matches!(self, AssemblyMode::All | AssemblyMode::Line)
    }

    pub fn includes_points(&self) -> bool {
        matches!(self, AssemblyMode::All | AssemblyMode::Point)
    }
}

impl fmt::Display for AssemblyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyMode::All => write!(f, "all"),
            AssemblyMode::Point => write!(f, "point"),
            AssemblyMode::Line => write!(f, "line"),
        }
    }
}

/// How timestamps are written into feature properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// RFC 3339 string in the configured display offset
    Iso8601,
    /// Integer seconds since the Unix epoch
    UnixEpoch,
}

impl TimestampFormat {
    pub fn parse(format_str: &str) -> TrackResult<Self> {
        match format_str.trim().to_lowercase().as_str() {
            "iso8601" | "iso" => Ok(TimestampFormat::Iso8601),
            "unix" | "epoch" => Ok(TimestampFormat::UnixEpoch),
            _ => Err(TrackError::Config {
                message: format!(
                    "unknown timestamp format '{}', expected 'iso8601' or 'unix'",
                    format_str
                ),
            }),
        }
    }
}

/// Per-fix properties a caller may put on point features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointProperty {
    Timestamp,
    Speed,
    Heading,
    Elevation,
    Frame,
    Elapsed,
    Projected,
}

impl PointProperty {
    pub fn parse(name: &str) -> TrackResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "timestamp" | "datetime" => Ok(PointProperty::Timestamp),
            "speed" => Ok(PointProperty::Speed),
            "heading" | "azimuth" => Ok(PointProperty::Heading),
            "elevation" | "ele" => Ok(PointProperty::Elevation),
            "frame" => Ok(PointProperty::Frame),
            "sec" | "elapsed" => Ok(PointProperty::Elapsed),
            "projected" | "lon3857" | "lat3857" => Ok(PointProperty::Projected),
            other => Err(TrackError::Config {
                message: format!("unknown point property '{}'", other),
            }),
        }
    }

    /// Parse a list of names, dropping repeats while keeping order
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> TrackResult<Vec<Self>> {
        let mut properties = Vec::with_capacity(names.len());
        for name in names {
            let property = Self::parse(name.as_ref())?;
            if !properties.contains(&property) {
                properties.push(property);
            }
        }
        Ok(properties)
    }

    /// Property set used when the caller does not choose one
    pub fn defaults_for(kind: SourceKind) -> Vec<Self> {
        match kind {
            SourceKind::Video => vec![
                PointProperty::Timestamp,
                PointProperty::Speed,
                PointProperty::Heading,
            ],
            SourceKind::Gpx => vec![PointProperty::Timestamp, PointProperty::Elevation],
        }
    }
}
