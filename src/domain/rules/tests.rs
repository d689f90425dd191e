// Unit tests for domain rules

use super::*;
use chrono::{DateTime, Duration, TimeZone, Utc};

fn at(seconds: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 19, 2, 24, 0).unwrap() + Duration::seconds(seconds)
}

fn framed(frames: &[i64]) -> Vec<Fix> {
    frames
        .iter()
        .enumerate()
        .map(|(i, frame)| {
            let mut fix = Fix::new(at(i as i64), 25.0, 121.5);
            fix.elapsed_seconds = Some(i as i64 - 2);
            fix.frame_index = Some(*frame);
            fix
        })
        .collect()
}

#[test]
fn test_dedup_keeps_first_occurrence() {
    let fixes = vec![
        Fix::new(at(0), 25.0, 121.5).with_motion(Some(10.0), None),
        Fix::new(at(0), 25.0, 121.5).with_motion(Some(12.0), None),
        Fix::new(at(1), 25.0, 121.5),
        Fix::new(at(0), 25.0, 121.5),
    ];
    let deduped = dedup_fixes(fixes);
    assert_eq!(deduped.len(), 2);
    assert_eq!(deduped[0].speed, Some(10.0));
    assert_eq!(deduped[1].timestamp, at(1));
}

#[test]
fn test_dedup_keeps_distinct_coordinates_at_same_time() {
    let fixes = vec![Fix::new(at(0), 25.0, 121.5), Fix::new(at(0), 25.1, 121.5)];
    assert_eq!(dedup_fixes(fixes).len(), 2);
}

#[test]
fn test_order_fixes_is_stable() {
    let mut fixes = vec![
        Fix::new(at(2), 1.0, 1.0),
        Fix::new(at(1), 2.0, 2.0),
        Fix::new(at(1), 3.0, 3.0),
    ];
    order_fixes(&mut fixes);
    assert_eq!(fixes[0].latitude, 2.0);
    assert_eq!(fixes[1].latitude, 3.0);
    assert_eq!(fixes[2].latitude, 1.0);
}

#[test]
fn test_negative_first_frame_is_shifted_to_zero() {
    let mut fixes = framed(&[-60, -30, 0, 30]);
    let shift = normalize_frame_indices(&mut fixes);

    assert_eq!(shift, 60);
    let frames: Vec<i64> = fixes.iter().map(|f| f.frame_index.unwrap()).collect();
    assert_eq!(frames, vec![0, 30, 60, 90]);
    // elapsed seconds are untouched
    assert_eq!(fixes[0].elapsed_seconds, Some(-2));
}

#[test]
fn test_normalization_preserves_deltas() {
    let raw = [-45, -44, -10, 7, 7, 100];
    let mut fixes = framed(&raw);
    normalize_frame_indices(&mut fixes);

    let frames: Vec<i64> = fixes.iter().map(|f| f.frame_index.unwrap()).collect();
    assert_eq!(frames[0], 0);
    for i in 1..raw.len() {
        assert_eq!(frames[i] - frames[i - 1], raw[i] - raw[i - 1]);
    }
}

#[test]
fn test_non_negative_first_frame_is_left_alone() {
    let mut fixes = framed(&[15, -3, 45]);
    assert_eq!(normalize_frame_indices(&mut fixes), 0);
    let frames: Vec<i64> = fixes.iter().map(|f| f.frame_index.unwrap()).collect();
    assert_eq!(frames, vec![15, -3, 45]);
}

#[test]
fn test_segment_distance_is_geodesic() {
    // 0.0009 degrees of latitude at 25N is close to 100 m
    let a = Fix::new(at(0), 25.0, 121.5);
    let b = Fix::new(at(1), 25.0009, 121.5);
    let meters = segment_distance(&a, &b);
    assert!((meters - 99.7).abs() < 1.0, "got {}", meters);
}

#[test]
fn test_cumulative_distance_is_a_non_decreasing_prefix_sum() {
    let fixes = vec![
        Fix::new(at(0), 25.0, 121.5),
        Fix::new(at(1), 25.0009, 121.5),
        Fix::new(at(2), 25.0009, 121.5),
        Fix::new(at(3), 25.0, 121.501),
        Fix::new(at(4), 24.999, 121.5),
    ];
    let running = cumulative_distances(&fixes);
    assert_eq!(running.len(), fixes.len());
    assert_eq!(running[0], 0.0);
    for pair in running.windows(2) {
        assert!(pair[1] >= pair[0]);
    }
    for n in 2..=fixes.len() {
        let prefix = total_distance_meters(&fixes[..n]);
        assert!((prefix - running[n - 1]).abs() < 1e-9);
    }
}

#[test]
fn test_distance_of_short_inputs() {
    assert!(cumulative_distances(&[]).is_empty());
    assert_eq!(total_distance_meters(&[]), 0.0);
    assert_eq!(total_distance_meters(&[Fix::new(at(0), 1.0, 1.0)]), 0.0);
}

#[test]
fn test_round_meters() {
    assert_eq!(round_meters(199.87654), 199.877);
    assert_eq!(round_meters(0.0004), 0.0);
}
