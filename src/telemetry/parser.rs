//! Fixed-stride parsing of the tool's tab-delimited GPS dump

use tracing::{debug, warn};

use crate::domain::model::{Fix, RawGpsRecord};
use crate::error::{TrackError, TrackResult};
use crate::telemetry::dms::parse_coordinate;
use crate::utils::time::parse_exif_datetime;

/// Tokens per record: date-time, latitude, longitude, speed, track
pub const FIELDS_PER_RECORD: usize = 5;

/// Placeholder the tool prints for an absent tag
pub const MISSING_VALUE: &str = "-";

/// Split on tabs and line breaks, dropping empty tokens
pub fn tokenize(output: &str) -> Vec<&str> {
    output
        .split(|c: char| c == '\t' || c == '\n')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}

fn is_missing(token: &str) -> bool {
    token == MISSING_VALUE
}

fn parse_optional(token: &str, field: &str, record: usize) -> TrackResult<Option<f64>> {
    if is_missing(token) {
        return Ok(None);
    }
    token.parse::<f64>().map(Some).map_err(|_| {
        TrackError::malformed(format!(
            "record {}: {} '{}' is not a number",
            record, field, token
        ))
    })
}

/// Group the dump into five-token records.
///
/// Records without a date-time or position are skipped; the count of skipped
/// records is logged.
pub fn parse_gps_records(output: &str) -> TrackResult<Vec<RawGpsRecord>> {
    let tokens = tokenize(output);
    if tokens.len() % FIELDS_PER_RECORD != 0 {
        return Err(TrackError::malformed(format!(
            "{} tokens is not a multiple of {}",
            tokens.len(),
            FIELDS_PER_RECORD
        )));
    }

    let mut records = Vec::with_capacity(tokens.len() / FIELDS_PER_RECORD);
    let mut incomplete = 0usize;

    for (index, chunk) in tokens.chunks_exact(FIELDS_PER_RECORD).enumerate() {
        let (datetime, lat, lon, speed, heading) = (chunk[0], chunk[1], chunk[2], chunk[3], chunk[4]);

        if is_missing(datetime) || is_missing(lat) || is_missing(lon) {
            debug!(record = index, "Skipping GPS record with missing fields");
            incomplete += 1;
            continue;
        }

        records.push(RawGpsRecord {
            datetime: datetime.to_string(),
            latitude: parse_coordinate(lat)?,
            longitude: parse_coordinate(lon)?,
            speed: parse_optional(speed, "speed", index)?,
            heading: parse_optional(heading, "track", index)?,
        });
    }

    if incomplete > 0 {
        warn!(
            skipped = incomplete,
            kept = records.len(),
            "GPS records without date-time or position were skipped"
        );
    }

    Ok(records)
}

/// Turn raw records into fixes, parsing the date-time as UTC
pub fn records_to_fixes(records: Vec<RawGpsRecord>) -> TrackResult<Vec<Fix>> {
    records
        .into_iter()
        .map(|record| {
            let timestamp = parse_exif_datetime(&record.datetime).ok_or_else(|| {
                TrackError::malformed(format!("unparsable GPS date-time '{}'", record.datetime))
            })?;
            Ok(Fix::new(timestamp, record.latitude, record.longitude)
                .with_motion(record.speed, record.heading))
        })
        .collect()
}
