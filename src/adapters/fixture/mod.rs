//! Fixture adapter serving captured tool output
//!
//! Stands in for the metadata tool in tests and offline replays. Output is
//! keyed by the video's file stem; a stem without a fixture behaves like a
//! failing tool run.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;

use crate::error::{TrackError, TrackResult};
use crate::ports::MetadataToolPort;

#[derive(Debug, Clone, Default)]
struct CapturedOutput {
    gps: String,
    time_tags: String,
    tags: Option<serde_json::Value>,
}

/// In-memory metadata adapter
#[derive(Debug, Clone, Default)]
pub struct FixtureToolAdapter {
    sources: HashMap<String, CapturedOutput>,
}

impl FixtureToolAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register captured GPS and time tag output for a video stem
    pub fn with_source(
        mut self,
        stem: impl Into<String>,
        gps: impl Into<String>,
        time_tags: impl Into<String>,
    ) -> Self {
        self.sources.insert(
            stem.into(),
            CapturedOutput {
                gps: gps.into(),
                time_tags: time_tags.into(),
                tags: None,
            },
        );
        self
    }

    /// Attach a JSON tag dump to an already registered stem
    pub fn with_tags(mut self, stem: &str, tags: serde_json::Value) -> Self {
        if let Some(source) = self.sources.get_mut(stem) {
            source.tags = Some(tags);
        }
        self
    }

    fn lookup(&self, video: &Path) -> TrackResult<&CapturedOutput> {
        let stem = video
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        self.sources
            .get(&stem)
            .ok_or_else(|| TrackError::TelemetryExtraction {
                path: video.display().to_string(),
                message: "no captured output for this source".to_string(),
            })
    }
}

#[async_trait]
impl MetadataToolPort for FixtureToolAdapter {
    async fn embedded_gps(&self, video: &Path) -> TrackResult<String> {
        Ok(self.lookup(video)?.gps.clone())
    }

    async fn time_tags(&self, video: &Path) -> TrackResult<String> {
        Ok(self.lookup(video)?.time_tags.clone())
    }

    async fn all_tags(&self, video: &Path) -> TrackResult<serde_json::Value> {
        let source = self.lookup(video)?;
        source
            .tags
            .clone()
            .ok_or_else(|| TrackError::TelemetryExtraction {
                path: video.display().to_string(),
                message: "no captured tag dump".to_string(),
            })
    }
}
