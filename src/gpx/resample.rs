//! Fixed-frequency resampling by piecewise-linear interpolation

use chrono::{DateTime, Duration, Utc};

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// One-dimensional piecewise-linear interpolant over sorted knots
#[derive(Debug, Clone)]
pub struct LinearInterpolant {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl LinearInterpolant {
    /// `xs` must be non-decreasing and the same length as `ys`
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Self {
        debug_assert_eq!(xs.len(), ys.len());
        Self { xs, ys }
    }

    /// Value at `x`, clamped to the end knots outside their range
    pub fn at(&self, x: f64) -> f64 {
        let n = self.xs.len();
        if n == 0 {
            return f64::NAN;
        }
        if x <= self.xs[0] {
            return self.ys[0];
        }
        if x >= self.xs[n - 1] {
            return self.ys[n - 1];
        }

        // first knot strictly greater than x; 1 <= upper <= n - 1 here
        let upper = self.xs.partition_point(|&knot| knot <= x);
        let (x0, x1) = (self.xs[upper - 1], self.xs[upper]);
        let (y0, y1) = (self.ys[upper - 1], self.ys[upper]);
        if x1 == x0 {
            return y0;
        }
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }
}

/// Samples on `[first, last]` at `frequency` Hz: `floor(span * frequency) + 1`
pub fn sample_count(span: Duration, frequency: f64) -> usize {
    let nanos = span.num_nanoseconds().unwrap_or(i64::MAX).max(0) as f64;
    (nanos * frequency / NANOS_PER_SECOND).floor() as usize + 1
}

/// Uniform grid starting at `first`; no sample lies past `last`
pub fn time_grid(first: DateTime<Utc>, last: DateTime<Utc>, frequency: f64) -> Vec<DateTime<Utc>> {
    let count = sample_count(last - first, frequency);
    let step_nanos = NANOS_PER_SECOND / frequency;
    (0..count)
        .map(|k| {
            let offset = Duration::nanoseconds((k as f64 * step_nanos).round() as i64);
            (first + offset).min(last)
        })
        .collect()
}

/// Seconds since `origin` as a float, the interpolation axis
pub fn seconds_since(origin: DateTime<Utc>, t: DateTime<Utc>) -> f64 {
    (t - origin).num_nanoseconds().unwrap_or(i64::MAX) as f64 / NANOS_PER_SECOND
}
