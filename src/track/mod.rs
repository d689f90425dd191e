//! Track assembly into GeoJSON features
//!
//! A collection holds the line feature first (when the mode asks for it),
//! followed by one point feature per fix in track order.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use geojson::{Feature, FeatureCollection, Geometry, JsonValue, Value};
use tracing::debug;

use crate::domain::model::{
    AssemblyMode, Fix, PointProperty, SourceKind, TimeBase, TimestampFormat, Track,
};
use crate::domain::rules;
use crate::error::TrackResult;
use crate::utils::time::utc_offset;

/// Line feature property keys
pub const LINE_NAME_KEY: &str = "filename";
pub const LINE_START_KEY: &str = "starttime";
pub const LINE_END_KEY: &str = "endtime";
pub const LINE_LENGTH_KEY: &str = "length(m)";

/// Caller-selected shape of the emitted collection
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureOptions {
    pub mode: AssemblyMode,
    pub timestamp_format: TimestampFormat,
    /// Point properties; `None` picks the set that fits the source kind
    pub properties: Option<Vec<PointProperty>>,
    /// Offset ISO timestamps are rendered in
    pub display_offset: FixedOffset,
}

impl Default for FeatureOptions {
    fn default() -> Self {
        Self {
            mode: AssemblyMode::All,
            timestamp_format: TimestampFormat::Iso8601,
            properties: None,
            display_offset: utc_offset(),
        }
    }
}

impl FeatureOptions {
    pub fn with_mode(mut self, mode: AssemblyMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    pub fn with_properties(mut self, properties: Vec<PointProperty>) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn with_display_offset(mut self, offset: FixedOffset) -> Self {
        self.display_offset = offset;
        self
    }

    /// Properties that apply to a track of the given kind
    pub fn properties_for(&self, kind: SourceKind) -> Vec<PointProperty> {
        self.properties
            .clone()
            .unwrap_or_else(|| PointProperty::defaults_for(kind))
    }

    /// Key the point timestamp is written under
    pub fn timestamp_key(&self) -> &'static str {
        match self.timestamp_format {
            TimestampFormat::Iso8601 => "datetime",
            TimestampFormat::UnixEpoch => "timestamp",
        }
    }

    pub fn format_timestamp(&self, timestamp: DateTime<Utc>) -> JsonValue {
        match self.timestamp_format {
            TimestampFormat::Iso8601 => JsonValue::from(
                timestamp
                    .with_timezone(&self.display_offset)
                    .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            ),
            TimestampFormat::UnixEpoch => JsonValue::from(timestamp.timestamp()),
        }
    }
}

fn optional(value: Option<f64>) -> JsonValue {
    value.map(JsonValue::from).unwrap_or(JsonValue::Null)
}

fn bare_feature(geometry: Value) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geometry)),
        id: None,
        properties: None,
        foreign_members: None,
    }
}

/// Turns ordered fixes into a [`Track`] and the track into features
#[derive(Debug, Clone, Default)]
pub struct TrackBuilder {
    options: FeatureOptions,
}

impl TrackBuilder {
    pub fn new(options: FeatureOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FeatureOptions {
        &self.options
    }

    /// Build the immutable track; an empty fix list is an error
    pub fn build_track(
        &self,
        source_name: &str,
        kind: SourceKind,
        fixes: Vec<Fix>,
        time_base: Option<TimeBase>,
    ) -> TrackResult<Track> {
        let track = Track::new(source_name, kind, fixes, time_base)?;
        debug!(
            source = source_name,
            fixes = track.len(),
            meters = track.total_distance_meters(),
            "Built track"
        );
        Ok(track)
    }

    /// The whole path with its summary properties
    pub fn line_feature(&self, track: &Track) -> Feature {
        let coordinates = track
            .fixes()
            .iter()
            .map(|fix| vec![fix.longitude, fix.latitude])
            .collect();

        let mut feature = bare_feature(Value::LineString(coordinates));
        feature.set_property(LINE_NAME_KEY, track.source_name());
        feature.set_property(LINE_START_KEY, self.options.format_timestamp(track.start_time()));
        feature.set_property(LINE_END_KEY, self.options.format_timestamp(track.end_time()));
        feature.set_property(
            LINE_LENGTH_KEY,
            rules::round_meters(track.total_distance_meters()),
        );
        feature
    }

    /// One point with the selected per-fix properties
    pub fn point_feature(&self, fix: &Fix, properties: &[PointProperty]) -> Feature {
        let mut feature = bare_feature(Value::Point(vec![fix.longitude, fix.latitude]));

        for property in properties {
            match property {
                PointProperty::Timestamp => feature.set_property(
                    self.options.timestamp_key(),
                    self.options.format_timestamp(fix.timestamp),
                ),
                PointProperty::Speed => feature.set_property("speed", optional(fix.speed)),
                PointProperty::Heading => feature.set_property("azimuth", optional(fix.heading)),
                PointProperty::Elevation => {
                    feature.set_property("elevation", optional(fix.elevation))
                }
                PointProperty::Frame => feature.set_property(
                    "frame",
                    fix.frame_index.map(JsonValue::from).unwrap_or(JsonValue::Null),
                ),
                PointProperty::Elapsed => feature.set_property(
                    "sec",
                    fix.elapsed_seconds
                        .map(JsonValue::from)
                        .unwrap_or(JsonValue::Null),
                ),
                PointProperty::Projected => {
                    let projected = fix.projected;
                    feature.set_property("lon3857", optional(projected.map(|p| p.x)));
                    feature.set_property("lat3857", optional(projected.map(|p| p.y)));
                }
            }
        }
        feature
    }

    pub fn point_features(&self, track: &Track) -> Vec<Feature> {
        let properties = self.options.properties_for(track.kind());
        track
            .fixes()
            .iter()
            .map(|fix| self.point_feature(fix, &properties))
            .collect()
    }

    /// Assemble the collection according to the configured mode
    pub fn to_feature_collection(&self, track: &Track) -> FeatureCollection {
        let mode = self.options.mode;
        let mut features = Vec::with_capacity(track.len() + 1);
        if mode.includes_line() {
            features.push(self.line_feature(track));
        }
        if mode.includes_points() {
            features.extend(self.point_features(track));
        }

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    /// Build the track and its collection in one step
    pub fn assemble(
        &self,
        source_name: &str,
        kind: SourceKind,
        fixes: Vec<Fix>,
        time_base: Option<TimeBase>,
    ) -> TrackResult<(Track, FeatureCollection)> {
        let track = self.build_track(source_name, kind, fixes, time_base)?;
        let collection = self.to_feature_collection(&track);
        Ok((track, collection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackError;
    use crate::projection;
    use crate::timebase;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 26, 3, 20, 32).unwrap()
    }

    fn northbound() -> Vec<Fix> {
        vec![
            Fix::new(t0(), 25.0, 121.5).with_motion(Some(35.0), Some(0.0)),
            Fix::new(t0() + Duration::seconds(1), 25.0009, 121.5).with_motion(Some(36.0), Some(0.0)),
            Fix::new(t0() + Duration::seconds(2), 25.0018, 121.5).with_motion(None, None),
        ]
    }

    fn builder(mode: AssemblyMode) -> TrackBuilder {
        TrackBuilder::new(FeatureOptions::default().with_mode(mode))
    }

    fn geometry(feature: &Feature) -> &Value {
        &feature.geometry.as_ref().unwrap().value
    }

    #[test]
    fn test_end_to_end_frames_and_length() {
        let time_base = TimeBase::new(t0(), Duration::zero(), 30.0).unwrap();
        let mut fixes = northbound();
        timebase::annotate(&time_base, &mut fixes);
        projection::annotate(&mut fixes);

        let (track, collection) = builder(AssemblyMode::All)
            .assemble("clip", SourceKind::Video, fixes, Some(time_base))
            .unwrap();

        let frames: Vec<i64> = track.fixes().iter().map(|f| f.frame_index.unwrap()).collect();
        assert_eq!(frames, vec![0, 30, 60]);

        let line = &collection.features[0];
        let length = line.property(LINE_LENGTH_KEY).unwrap().as_f64().unwrap();
        assert!((length - 200.0).abs() < 10.0, "length {}", length);
        assert_eq!(line.property(LINE_NAME_KEY).unwrap(), "clip");
        assert_eq!(
            line.property(LINE_START_KEY).unwrap(),
            "2025-02-26T03:20:32Z"
        );
        assert_eq!(line.property(LINE_END_KEY).unwrap(), "2025-02-26T03:20:34Z");
        assert_eq!(collection.features.len(), 4);
    }

    #[test]
    fn test_line_comes_first_with_all_vertices() {
        let (_, collection) = builder(AssemblyMode::All)
            .assemble("clip", SourceKind::Video, northbound(), None)
            .unwrap();

        match geometry(&collection.features[0]) {
            Value::LineString(coords) => {
                assert_eq!(coords.len(), 3);
                assert_eq!(coords[0], vec![121.5, 25.0]);
            }
            other => panic!("expected line, got {:?}", other),
        }
        assert!(matches!(geometry(&collection.features[1]), Value::Point(_)));
    }

    #[test]
    fn test_point_and_line_modes() {
        let track = builder(AssemblyMode::Point)
            .build_track("clip", SourceKind::Video, northbound(), None)
            .unwrap();

        let points = builder(AssemblyMode::Point).to_feature_collection(&track);
        assert_eq!(points.features.len(), 3);
        assert!(points
            .features
            .iter()
            .all(|f| matches!(geometry(f), Value::Point(_))));

        let line = builder(AssemblyMode::Line).to_feature_collection(&track);
        assert_eq!(line.features.len(), 1);
        assert!(matches!(geometry(&line.features[0]), Value::LineString(_)));
    }

    #[test]
    fn test_empty_fixes_fail() {
        let err = builder(AssemblyMode::All)
            .assemble("clip", SourceKind::Video, Vec::new(), None)
            .unwrap_err();
        assert!(matches!(err, TrackError::EmptyTrack { .. }));
    }

    #[test]
    fn test_single_fix_track() {
        let fixes = northbound().into_iter().take(1).collect();
        let (_, collection) = builder(AssemblyMode::All)
            .assemble("clip", SourceKind::Video, fixes, None)
            .unwrap();
        let line = &collection.features[0];
        assert_eq!(line.property(LINE_LENGTH_KEY).unwrap().as_f64(), Some(0.0));
        assert_eq!(collection.features.len(), 2);
    }

    #[test]
    fn test_video_default_properties() {
        let track = Track::new("clip", SourceKind::Video, northbound(), None).unwrap();
        let features = builder(AssemblyMode::Point).point_features(&track);

        let first = &features[0];
        assert_eq!(first.property("datetime").unwrap(), "2025-02-26T03:20:32Z");
        assert_eq!(first.property("speed").unwrap().as_f64(), Some(35.0));
        assert_eq!(first.property("azimuth").unwrap().as_f64(), Some(0.0));
        assert!(!first.contains_property("elevation"));
        assert!(features[2].property("speed").unwrap().is_null());
    }

    #[test]
    fn test_unix_timestamps_replace_iso() {
        let options = FeatureOptions::default()
            .with_mode(AssemblyMode::All)
            .with_timestamp_format(TimestampFormat::UnixEpoch);
        let (_, collection) = TrackBuilder::new(options)
            .assemble("clip", SourceKind::Video, northbound(), None)
            .unwrap();

        let point = &collection.features[1];
        assert_eq!(
            point.property("timestamp").unwrap().as_i64(),
            Some(t0().timestamp())
        );
        assert!(!point.contains_property("datetime"));
        assert_eq!(
            collection.features[0].property(LINE_START_KEY).unwrap().as_i64(),
            Some(t0().timestamp())
        );
    }

    #[test]
    fn test_display_offset_and_extra_properties() {
        let taipei = FixedOffset::east_opt(8 * 3600).unwrap();
        let options = FeatureOptions::default()
            .with_display_offset(taipei)
            .with_properties(vec![
                PointProperty::Timestamp,
                PointProperty::Frame,
                PointProperty::Elapsed,
                PointProperty::Projected,
            ]);

        let mut fixes = northbound();
        let time_base = TimeBase::new(t0(), Duration::zero(), 30.0).unwrap();
        timebase::annotate(&time_base, &mut fixes);
        projection::annotate(&mut fixes);
        let track = Track::new("clip", SourceKind::Video, fixes, Some(time_base)).unwrap();

        let point = &TrackBuilder::new(options).point_features(&track)[1];
        assert_eq!(point.property("datetime").unwrap(), "2025-02-26T11:20:33+08:00");
        assert_eq!(point.property("frame").unwrap().as_i64(), Some(30));
        assert_eq!(point.property("sec").unwrap().as_i64(), Some(1));
        assert!((point.property("lon3857").unwrap().as_f64().unwrap() - 13_525_318.131).abs() < 1.0);
        assert!(point.property("lat3857").unwrap().is_number());
        assert!(!point.contains_property("speed"));
    }

    #[test]
    fn test_gpx_defaults_use_elevation() {
        let fixes = vec![
            Fix::new(t0(), 25.0, 121.5).with_elevation(Some(12.5)),
            Fix::new(t0() + Duration::seconds(1), 25.0001, 121.5).with_elevation(Some(13.0)),
        ];
        let track = Track::new("ride", SourceKind::Gpx, fixes, None).unwrap();
        let point = &builder(AssemblyMode::Point).point_features(&track)[0];
        assert_eq!(point.property("elevation").unwrap().as_f64(), Some(12.5));
        assert!(!point.contains_property("speed"));
    }
}
