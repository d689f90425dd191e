//! Embedded GPS telemetry extraction
//!
//! Wraps the metadata tool behind [`TelemetryExtractor::extract_fixes`] so
//! the fixed-stride output format is handled in one place.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::model::{Fix, RawGpsRecord};
use crate::domain::rules;
use crate::error::TrackResult;
use crate::ports::MetadataToolPort;

pub mod dms;
pub mod parser;

pub use dms::{dms_to_decimal, parse_coordinate};
pub use parser::{parse_gps_records, records_to_fixes};

/// Pulls the per-second GPS stream out of a video container
pub struct TelemetryExtractor {
    tool: Arc<dyn MetadataToolPort>,
}

impl TelemetryExtractor {
    pub fn new(tool: Arc<dyn MetadataToolPort>) -> Self {
        Self { tool }
    }

    /// Raw records in the order the tool reported them
    pub async fn extract_records(&self, video: &Path) -> TrackResult<Vec<RawGpsRecord>> {
        let output = self.tool.embedded_gps(video).await?;
        parse_gps_records(&output)
    }

    /// Ordered, de-duplicated fixes. An empty vector means the container
    /// carries no GPS stream.
    pub async fn extract_fixes(&self, video: &Path) -> TrackResult<Vec<Fix>> {
        let records = self.extract_records(video).await?;
        let reported = records.len();

        let mut fixes = rules::dedup_fixes(records_to_fixes(records)?);
        rules::order_fixes(&mut fixes);

        if fixes.len() < reported {
            debug!(
                video = %video.display(),
                duplicates = reported - fixes.len(),
                "Dropped duplicate GPS records"
            );
        }
        info!(video = %video.display(), fixes = fixes.len(), "Extracted embedded GPS fixes");
        Ok(fixes)
    }
}
