use std::sync::Arc;

use crate::adapters::ExifToolAdapter;
use crate::app::batch::BatchRunner;
use crate::app::inspect::InspectInteractor;
use crate::app::pipeline::{GpxPipeline, VideoPipeline};
use crate::config::PipelineConfig;
use crate::domain::model::SourceKind;
use crate::error::TrackResult;
use crate::gpx::GpxResampler;
use crate::output::GeoJsonWriter;
use crate::ports::MetadataToolPort;

/// Wires pipelines to a metadata tool from one resolved configuration
pub struct AppContainer {
    video: Arc<VideoPipeline>,
    gpx: Arc<GpxPipeline>,
    inspect: Arc<InspectInteractor>,
    writer: GeoJsonWriter,
    config: PipelineConfig,
}

impl AppContainer {
    /// Container backed by the real exiftool binary
    pub fn new(config: PipelineConfig) -> TrackResult<Self> {
        let tool = Arc::new(ExifToolAdapter::from_config(&config.exiftool)?);
        Self::with_tool(config, tool)
    }

    /// Container backed by any metadata tool implementation
    pub fn with_tool(config: PipelineConfig, tool: Arc<dyn MetadataToolPort>) -> TrackResult<Self> {
        config.exiftool.timeout()?;
        let creation_offset = config.create_date_offset()?;

        let video = Arc::new(VideoPipeline::new(
            Arc::clone(&tool),
            creation_offset,
            config.feature_options(SourceKind::Video)?,
        ));
        let gpx = Arc::new(GpxPipeline::new(
            GpxResampler::new(config.gpx.frequency)?,
            config.feature_options(SourceKind::Gpx)?,
        ));
        let inspect = Arc::new(InspectInteractor::new(tool, creation_offset));
        let writer = GeoJsonWriter::new(config.output.pretty);

        Ok(Self {
            video,
            gpx,
            inspect,
            writer,
            config,
        })
    }

    pub fn video_pipeline(&self) -> Arc<VideoPipeline> {
        Arc::clone(&self.video)
    }

    pub fn gpx_pipeline(&self) -> Arc<GpxPipeline> {
        Arc::clone(&self.gpx)
    }

    pub fn inspect_interactor(&self) -> Arc<InspectInteractor> {
        Arc::clone(&self.inspect)
    }

    pub fn writer(&self) -> &GeoJsonWriter {
        &self.writer
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn batch_runner(&self) -> BatchRunner {
        BatchRunner::new(
            Arc::clone(&self.video),
            Arc::clone(&self.gpx),
            self.writer.clone(),
            self.config.batch.clone(),
            self.config.effective_concurrency(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::FixtureToolAdapter;
    use crate::error::TrackError;

    #[test]
    fn test_bad_frequency_fails_wiring() {
        let mut config = PipelineConfig::default();
        config.gpx.frequency = 0.2;
        let result = AppContainer::with_tool(config, Arc::new(FixtureToolAdapter::new()));
        assert!(matches!(result, Err(TrackError::InvalidFrequency { .. })));
    }

    #[test]
    fn test_zero_tool_timeout_fails_wiring() {
        let mut config = PipelineConfig::default();
        config.exiftool.timeout_secs = 0;
        let result = AppContainer::with_tool(config.clone(), Arc::new(FixtureToolAdapter::new()));
        assert!(matches!(result, Err(TrackError::Config { .. })));
        assert!(matches!(AppContainer::new(config), Err(TrackError::Config { .. })));
    }

    #[test]
    fn test_default_config_wires() {
        let container =
            AppContainer::with_tool(PipelineConfig::default(), Arc::new(FixtureToolAdapter::new()))
                .unwrap();
        assert!(container.config().batch.merge);
        let _runner = container.batch_runner();
    }
}
