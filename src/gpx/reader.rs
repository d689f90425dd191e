//! GPX `trk/trkseg/trkpt` reader

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::warn;

use crate::domain::model::Fix;
use crate::error::{TrackError, TrackResult};
use crate::utils::time::parse_exif_datetime;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Elevation,
    Time,
}

#[derive(Debug, Default)]
struct PendingPoint {
    latitude: Option<f64>,
    longitude: Option<f64>,
    elevation: Option<f64>,
    time: Option<DateTime<Utc>>,
}

/// GPX times are RFC 3339; zone-less values are read as UTC
pub fn parse_gpx_time(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| parse_exif_datetime(text))
}

fn parse_error(source: &str, message: impl Into<String>) -> TrackError {
    TrackError::GpxParse {
        path: source.to_string(),
        message: message.into(),
    }
}

fn start_point(source: &str, element: &BytesStart<'_>) -> TrackResult<PendingPoint> {
    let mut point = PendingPoint::default();
    for attribute in element.attributes().flatten() {
        let value = std::str::from_utf8(&attribute.value)
            .map_err(|_| parse_error(source, "trkpt attribute is not UTF-8"))?;
        let key = attribute.key.local_name();
        let target = match key.as_ref() {
            b"lat" => &mut point.latitude,
            b"lon" => &mut point.longitude,
            _ => continue,
        };
        let parsed = value
            .trim()
            .parse::<f64>()
            .map_err(|_| parse_error(source, format!("bad trkpt coordinate '{}'", value)))?;
        *target = Some(parsed);
    }
    Ok(point)
}

fn finish_point(source: &str, point: PendingPoint, untimed: &mut usize) -> TrackResult<Option<Fix>> {
    let (Some(latitude), Some(longitude)) = (point.latitude, point.longitude) else {
        return Err(parse_error(source, "trkpt without lat/lon"));
    };
    match point.time {
        Some(time) => Ok(Some(
            Fix::new(time, latitude, longitude).with_elevation(point.elevation),
        )),
        None => {
            *untimed += 1;
            Ok(None)
        }
    }
}

/// Read every timed track point in document order.
///
/// `source` names the document in errors. Points without a `<time>` are
/// skipped since they cannot be placed on the resampling grid.
pub fn parse_gpx(source: &str, xml: &str) -> TrackResult<Vec<Fix>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut fixes = Vec::new();
    let mut point: Option<PendingPoint> = None;
    let mut field: Option<Field> = None;
    let mut untimed = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"trkpt" => point = Some(start_point(source, &e)?),
                b"ele" if point.is_some() => field = Some(Field::Elevation),
                b"time" if point.is_some() => field = Some(Field::Time),
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"trkpt" {
                    let pending = start_point(source, &e)?;
                    finish_point(source, pending, &mut untimed)?;
                }
            }
            Ok(Event::Text(t)) => {
                if let (Some(pending), Some(current)) = (point.as_mut(), field) {
                    let text = t
                        .unescape()
                        .map_err(|e| parse_error(source, e.to_string()))?;
                    match current {
                        Field::Elevation => {
                            pending.elevation = text.trim().parse::<f64>().ok();
                        }
                        Field::Time => {
                            let time = parse_gpx_time(&text).ok_or_else(|| {
                                parse_error(source, format!("bad trkpt time '{}'", text))
                            })?;
                            pending.time = Some(time);
                        }
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"trkpt" => {
                    if let Some(pending) = point.take() {
                        if let Some(fix) = finish_point(source, pending, &mut untimed)? {
                            fixes.push(fix);
                        }
                    }
                    field = None;
                }
                b"ele" | b"time" => field = None,
                _ => {}
            },
            Err(e) => {
                return Err(parse_error(
                    source,
                    format!("at byte {}: {}", reader.buffer_position(), e),
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    if untimed > 0 {
        warn!(source, skipped = untimed, "GPX track points without time were skipped");
    }
    Ok(fixes)
}
