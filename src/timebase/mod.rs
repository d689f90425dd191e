//! Video time base resolution
//!
//! The start of a recording is not stored directly; it is derived as
//! `CreateDate - Duration`, where `CreateDate` marks the end of recording.
//! Each fix is then placed on the video timeline as whole elapsed seconds
//! and a frame index.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, FixedOffset};
use tracing::{debug, info};

use crate::domain::model::{Fix, TimeBase};
use crate::domain::rules;
use crate::error::{TrackError, TrackResult};
use crate::ports::MetadataToolPort;
use crate::utils::time::{parse_exif_datetime_in, utc_offset};

pub const FRAME_RATE_TAG: &str = "VideoFrameRate";
pub const CREATE_DATE_TAG: &str = "CreateDate";
pub const DURATION_TAG: &str = "Duration";

/// Parse `Key   : value` lines into a map. Values keep their own colons.
pub fn parse_tag_lines(output: &str) -> HashMap<String, String> {
    output
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// Frame rate from a value such as `29.97` or `30 fps`
pub fn parse_frame_rate(value: &str) -> Option<f64> {
    value
        .split_whitespace()
        .next()
        .and_then(|token| token.parse::<f64>().ok())
        .filter(|fps| fps.is_finite() && *fps > 0.0)
}

/// Parse the tool's duration in either of its two shapes.
///
/// `12.51 s` is truncated to whole seconds. A clock value such as `0:01:05`
/// contributes only its minutes and seconds; the tool uses the clock form for
/// short clips and the hour field is ignored. Either form may be followed by
/// an annotation such as `(approx)`.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let mut tokens = value.split_whitespace();
    let first = tokens.next()?;

    let seconds_value = match first.strip_suffix('s') {
        Some(number) => Some(number),
        None if tokens.next() == Some("s") => Some(first),
        None => None,
    };
    if let Some(number) = seconds_value {
        let seconds: f64 = number.parse().ok()?;
        if !seconds.is_finite() || seconds < 0.0 {
            return None;
        }
        return Some(Duration::seconds(seconds.trunc() as i64));
    }

    let parts: Vec<&str> = first.split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    let _hours: u32 = parts[0].parse().ok()?;
    let minutes: u32 = parts[1].parse().ok()?;
    let seconds: f64 = parts[2].parse().ok()?;
    if minutes >= 60 || !(0.0..60.0).contains(&seconds) {
        return None;
    }

    Some(Duration::seconds(minutes as i64 * 60 + seconds.trunc() as i64))
}

/// Build a time base from a tag listing.
///
/// `creation_offset` is applied when `CreateDate` carries no zone of its own.
pub fn parse_time_base(output: &str, creation_offset: &FixedOffset) -> TrackResult<TimeBase> {
    let tags = parse_tag_lines(output);
    let tag = |name: &str| {
        tags.get(name)
            .filter(|value| !value.is_empty() && value.as_str() != "-")
            .ok_or_else(|| TrackError::unresolved(format!("{} is missing", name)))
    };

    let frame_rate_value = tag(FRAME_RATE_TAG)?;
    let frame_rate = parse_frame_rate(frame_rate_value).ok_or_else(|| {
        TrackError::unresolved(format!("unreadable {} '{}'", FRAME_RATE_TAG, frame_rate_value))
    })?;

    let create_value = tag(CREATE_DATE_TAG)?;
    let creation_time = parse_exif_datetime_in(create_value, creation_offset).ok_or_else(|| {
        TrackError::unresolved(format!("unreadable {} '{}'", CREATE_DATE_TAG, create_value))
    })?;

    let duration_value = tag(DURATION_TAG)?;
    let duration = parse_duration(duration_value).ok_or_else(|| {
        TrackError::unresolved(format!("unreadable {} '{}'", DURATION_TAG, duration_value))
    })?;

    TimeBase::new(creation_time, duration, frame_rate)
}

/// Stamp elapsed seconds and frame indices onto an ordered track, then shift
/// the indices if the first one came out negative.
pub fn annotate(time_base: &TimeBase, fixes: &mut [Fix]) {
    for fix in fixes.iter_mut() {
        let elapsed = time_base.elapsed_seconds(fix.timestamp);
        fix.elapsed_seconds = Some(elapsed);
        fix.frame_index = Some(time_base.raw_frame_index(elapsed));
    }

    let shift = rules::normalize_frame_indices(fixes);
    if shift > 0 {
        info!(
            frames = shift,
            "GPS clock runs ahead of the video start; frame indices shifted"
        );
    }
}

/// Resolves a video's time base through the metadata tool
pub struct TimeBaseResolver {
    tool: Arc<dyn MetadataToolPort>,
    creation_offset: FixedOffset,
}

impl TimeBaseResolver {
    pub fn new(tool: Arc<dyn MetadataToolPort>) -> Self {
        Self {
            tool,
            creation_offset: utc_offset(),
        }
    }

    /// Read zone-less `CreateDate` values as local time in this offset
    pub fn with_creation_offset(mut self, offset: FixedOffset) -> Self {
        self.creation_offset = offset;
        self
    }

    pub async fn resolve(&self, video: &Path) -> TrackResult<TimeBase> {
        let output = self.tool.time_tags(video).await?;
        let time_base = parse_time_base(&output, &self.creation_offset)?;
        debug!(
            video = %video.display(),
            frame_rate = time_base.frame_rate,
            start = %time_base.start_time,
            "Resolved video time base"
        );
        Ok(time_base)
    }
}
