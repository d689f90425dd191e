// Single-source pipelines - video telemetry and GPX to track

use std::path::Path;
use std::sync::Arc;

use chrono::FixedOffset;
use geojson::FeatureCollection;
use tracing::info;

use crate::domain::model::{SourceKind, Track};
use crate::error::{TrackError, TrackResult};
use crate::gpx::GpxResampler;
use crate::ports::MetadataToolPort;
use crate::projection;
use crate::telemetry::TelemetryExtractor;
use crate::timebase::{self, TimeBaseResolver};
use crate::track::{FeatureOptions, TrackBuilder};
use crate::utils::path::source_name;

/// Embedded telemetry -> time base -> projection -> track
pub struct VideoPipeline {
    extractor: TelemetryExtractor,
    resolver: TimeBaseResolver,
    builder: TrackBuilder,
}

impl VideoPipeline {
    pub fn new(
        tool: Arc<dyn MetadataToolPort>,
        creation_offset: FixedOffset,
        options: FeatureOptions,
    ) -> Self {
        Self {
            extractor: TelemetryExtractor::new(Arc::clone(&tool)),
            resolver: TimeBaseResolver::new(tool).with_creation_offset(creation_offset),
            builder: TrackBuilder::new(options),
        }
    }

    pub fn builder(&self) -> &TrackBuilder {
        &self.builder
    }

    /// Build the annotated track for one video
    pub async fn build_track(&self, video: &Path) -> TrackResult<Track> {
        let name = source_name(video);
        let mut fixes = self.extractor.extract_fixes(video).await?;
        if fixes.is_empty() {
            return Err(TrackError::EmptyTrack { source_name: name });
        }

        let time_base = self.resolver.resolve(video).await?;
        timebase::annotate(&time_base, &mut fixes);
        projection::annotate(&mut fixes);

        self.builder
            .build_track(&name, SourceKind::Video, fixes, Some(time_base))
    }

    /// Build the track and its feature collection
    pub async fn run(&self, video: &Path) -> TrackResult<(Track, FeatureCollection)> {
        let track = self.build_track(video).await?;
        let collection = self.builder.to_feature_collection(&track);
        info!(
            source = track.source_name(),
            fixes = track.len(),
            meters = track.total_distance_meters(),
            "Video track assembled"
        );
        Ok((track, collection))
    }
}

/// GPX file -> resampled fixes -> projection -> track
pub struct GpxPipeline {
    resampler: GpxResampler,
    builder: TrackBuilder,
}

impl GpxPipeline {
    pub fn new(resampler: GpxResampler, options: FeatureOptions) -> Self {
        Self {
            resampler,
            builder: TrackBuilder::new(options),
        }
    }

    pub fn builder(&self) -> &TrackBuilder {
        &self.builder
    }

    /// `name` overrides the GPX file stem as the source name
    pub async fn build_track(&self, gpx: &Path, name: Option<&str>) -> TrackResult<Track> {
        let name = name.map(str::to_string).unwrap_or_else(|| source_name(gpx));
        let mut fixes = self.resampler.load(gpx).await?;
        projection::annotate(&mut fixes);
        self.builder.build_track(&name, SourceKind::Gpx, fixes, None)
    }

    pub async fn run(
        &self,
        gpx: &Path,
        name: Option<&str>,
    ) -> TrackResult<(Track, FeatureCollection)> {
        let track = self.build_track(gpx, name).await?;
        let collection = self.builder.to_feature_collection(&track);
        info!(
            source = track.source_name(),
            fixes = track.len(),
            meters = track.total_distance_meters(),
            "GPX track assembled"
        );
        Ok((track, collection))
    }
}
