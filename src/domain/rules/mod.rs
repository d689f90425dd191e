// Domain rules - Ordering, dedup, frame normalization and distance policy

use std::collections::HashSet;

use geo::{Distance, Geodesic, Point};

use crate::domain::model::Fix;

#[cfg(test)]
mod tests;

/// Drop fixes whose timestamp and coordinates repeat an earlier fix.
///
/// The first occurrence wins, so the surviving fixes keep the source order.
pub fn dedup_fixes(fixes: Vec<Fix>) -> Vec<Fix> {
    let mut seen = HashSet::with_capacity(fixes.len());
    fixes
        .into_iter()
        .filter(|fix| {
            seen.insert((
                fix.timestamp,
                fix.latitude.to_bits(),
                fix.longitude.to_bits(),
            ))
        })
        .collect()
}

/// Stable sort by timestamp so the track is non-decreasing in time
pub fn order_fixes(fixes: &mut [Fix]) {
    fixes.sort_by_key(|fix| fix.timestamp);
}

/// Shift every frame index so that a negative first index becomes zero.
///
/// Only the first fix decides the shift; `elapsed_seconds` is left alone.
/// Returns the applied offset (0 when nothing moved).
pub fn normalize_frame_indices(fixes: &mut [Fix]) -> i64 {
    let first = match fixes.first().and_then(|fix| fix.frame_index) {
        Some(first) if first < 0 => first,
        _ => return 0,
    };

    for fix in fixes.iter_mut() {
        if let Some(frame) = fix.frame_index.as_mut() {
            *frame -= first;
        }
    }
    -first
}

/// Geodesic (WGS84 ellipsoid) distance between two fixes in meters
pub fn segment_distance(a: &Fix, b: &Fix) -> f64 {
    Geodesic::distance(
        Point::new(a.longitude, a.latitude),
        Point::new(b.longitude, b.latitude),
    )
}

/// Running distance at every fix; the first entry is always 0
pub fn cumulative_distances(fixes: &[Fix]) -> Vec<f64> {
    let mut total = 0.0;
    let mut distances = Vec::with_capacity(fixes.len());
    if !fixes.is_empty() {
        distances.push(0.0);
    }
    for pair in fixes.windows(2) {
        total += segment_distance(&pair[0], &pair[1]);
        distances.push(total);
    }
    distances
}

/// Sum of consecutive segment distances at full precision
pub fn total_distance_meters(fixes: &[Fix]) -> f64 {
    fixes
        .windows(2)
        .map(|pair| segment_distance(&pair[0], &pair[1]))
        .sum()
}

/// Round to millimeters for the emitted length property
pub fn round_meters(meters: f64) -> f64 {
    (meters * 1000.0).round() / 1000.0
}
