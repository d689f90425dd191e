//! Date-time parsing for metadata tool output

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y:%m:%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const OFFSET_FORMATS: &[&str] = &["%Y:%m:%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];

/// Parse an exif-style date-time (`2025:03:19 02:24:34Z`) as UTC.
///
/// A trailing `Z` or an explicit offset is honored; a bare value is taken
/// to be UTC.
pub fn parse_exif_datetime(value: &str) -> Option<DateTime<Utc>> {
    parse_exif_datetime_in(value, &utc_offset())
}

/// Like [`parse_exif_datetime`], but a bare value is read as local time in
/// `offset`.
pub fn parse_exif_datetime_in(value: &str, offset: &FixedOffset) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Some(utc) = value.strip_suffix('Z') {
        return parse_naive(utc).map(|naive| naive.and_utc());
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let naive = parse_naive(value)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Parse `+08:00`, `-0530`, `Z` or `UTC` into a fixed offset
pub fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return Some(utc_offset());
    }

    let (sign, rest) = match value.as_bytes().first()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return None,
    };

    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

pub fn utc_offset() -> FixedOffset {
    Utc.fix()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_parse_gps_datetime_with_zulu_suffix() {
        assert_eq!(
            parse_exif_datetime("2025:03:19 02:24:34Z"),
            Some(utc(2025, 3, 19, 2, 24, 34))
        );
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let parsed = parse_exif_datetime("2025:03:19 02:24:34.500Z").unwrap();
        assert_eq!(parsed.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_parse_explicit_offset() {
        assert_eq!(
            parse_exif_datetime("2025:03:19 10:24:34+08:00"),
            Some(utc(2025, 3, 19, 2, 24, 34))
        );
    }

    #[test]
    fn test_bare_value_uses_given_offset() {
        let taipei = parse_utc_offset("+08:00").unwrap();
        assert_eq!(
            parse_exif_datetime_in("2025:03:19 10:24:34", &taipei),
            Some(utc(2025, 3, 19, 2, 24, 34))
        );
        assert_eq!(
            parse_exif_datetime("2025:03:19 10:24:34"),
            Some(utc(2025, 3, 19, 10, 24, 34))
        );
    }

    #[test]
    fn test_dash_separated_dates() {
        assert_eq!(
            parse_exif_datetime("2025-03-19 02:24:34"),
            Some(utc(2025, 3, 19, 2, 24, 34))
        );
    }

    #[test]
    fn test_rejects_zero_dates_and_garbage() {
        assert_eq!(parse_exif_datetime("0000:00:00 00:00:00"), None);
        assert_eq!(parse_exif_datetime("-"), None);
        assert_eq!(parse_exif_datetime(""), None);
    }

    #[test]
    fn test_parse_utc_offset_forms() {
        assert_eq!(parse_utc_offset("+08:00").unwrap().local_minus_utc(), 8 * 3600);
        assert_eq!(parse_utc_offset("-0530").unwrap().local_minus_utc(), -(5 * 3600 + 30 * 60));
        assert_eq!(parse_utc_offset("+9").unwrap().local_minus_utc(), 9 * 3600);
        assert_eq!(parse_utc_offset("Z").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_utc_offset("UTC").unwrap().local_minus_utc(), 0);
        assert!(parse_utc_offset("08:00").is_none());
        assert!(parse_utc_offset("+25:00").is_none());
    }
}
