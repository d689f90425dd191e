// Ports - Interface definitions (contracts)

use std::path::Path;

use async_trait::async_trait;

use crate::error::TrackResult;

/// Port for the external metadata tool.
///
/// Implementations return the tool's plain-text output untouched; all parsing
/// happens in the telemetry and time base modules so the brittle formats stay
/// testable against captured fixtures.
#[async_trait]
pub trait MetadataToolPort: Send + Sync {
    /// Every embedded GPS record as tab-delimited tokens, five per record:
    /// date-time, latitude, longitude, speed, track.
    async fn embedded_gps(&self, video: &Path) -> TrackResult<String>;

    /// Short-name tag listing with `VideoFrameRate`, `CreateDate` and `Duration`
    async fn time_tags(&self, video: &Path) -> TrackResult<String>;

    /// Full tag dump as a JSON document, for inspection only
    async fn all_tags(&self, video: &Path) -> TrackResult<serde_json::Value>;
}
