// Inspect interactor - Annotated fix table and raw tag dump for one video

use std::path::Path;
use std::sync::Arc;

use chrono::FixedOffset;
use serde::Serialize;
use tracing::info;

use crate::domain::model::{Fix, TimeBase};
use crate::error::TrackResult;
use crate::ports::MetadataToolPort;
use crate::projection;
use crate::telemetry::TelemetryExtractor;
use crate::timebase::{self, TimeBaseResolver};
use crate::utils::path::source_name;

/// What `inspect` reports for a video
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub source_name: String,
    /// Absent when the container has no GPS stream to anchor
    pub time_base: Option<TimeBase>,
    pub fix_count: usize,
    pub fixes: Vec<Fix>,
}

/// Interactor for the inspect use case
pub struct InspectInteractor {
    tool: Arc<dyn MetadataToolPort>,
    extractor: TelemetryExtractor,
    resolver: TimeBaseResolver,
}

impl InspectInteractor {
    pub fn new(tool: Arc<dyn MetadataToolPort>, creation_offset: FixedOffset) -> Self {
        Self {
            extractor: TelemetryExtractor::new(Arc::clone(&tool)),
            resolver: TimeBaseResolver::new(Arc::clone(&tool)).with_creation_offset(creation_offset),
            tool,
        }
    }

    /// Extract and annotate fixes without building features
    pub async fn inspect(&self, video: &Path) -> TrackResult<InspectReport> {
        let mut fixes = self.extractor.extract_fixes(video).await?;

        let time_base = if fixes.is_empty() {
            None
        } else {
            let time_base = self.resolver.resolve(video).await?;
            timebase::annotate(&time_base, &mut fixes);
            projection::annotate(&mut fixes);
            Some(time_base)
        };

        info!(video = %video.display(), fixes = fixes.len(), "Inspection complete");
        Ok(InspectReport {
            source_name: source_name(video),
            time_base,
            fix_count: fixes.len(),
            fixes,
        })
    }

    /// Every tag the tool reports, untouched
    pub async fn raw_tags(&self, video: &Path) -> TrackResult<serde_json::Value> {
        self.tool.all_tags(video).await
    }
}
