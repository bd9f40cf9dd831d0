//! Shared evaluation grid and cross-camera summation.
//!
//! The grid spans the observed data range (the earliest to the latest
//! sample across all contributing cameras) rather than the nominal request
//! window, so the engine never extrapolates across large data-free spans at
//! the window edges. Grid density is fixed at 120 points per lookback hour
//! (~30 s resolution) regardless of camera count.

use chrono::{DateTime, Utc};

use occu_models::PredictionData;

use crate::interpolate::Interpolator;

/// Evaluation points per lookback hour.
const POINTS_PER_HOUR: f64 = 120.0;

/// Number of grid points for a lookback window.
pub fn grid_size(lookback_hours: f64) -> usize {
    (lookback_hours * POINTS_PER_HOUR).floor() as usize
}

/// Elapsed seconds of `instant` since `start`, with millisecond precision.
pub fn elapsed_seconds(start: DateTime<Utc>, instant: DateTime<Utc>) -> f64 {
    (instant - start).num_milliseconds() as f64 / 1000.0
}

/// The `[min, max]` elapsed-seconds span of every observed sample across all
/// cameras, or `None` when no camera has data.
pub fn observed_span(
    predictions: &[PredictionData],
    start: DateTime<Utc>,
) -> Option<(f64, f64)> {
    let mut span: Option<(f64, f64)> = None;

    for pred in predictions {
        for &ts in &pred.timestamps {
            let offset = elapsed_seconds(start, ts);
            span = Some(match span {
                None => (offset, offset),
                Some((min, max)) => (min.min(offset), max.max(offset)),
            });
        }
    }

    span
}

/// `num` evenly spaced values over `[start, end]`, endpoints included.
///
/// Degenerate cases follow numpy's `linspace`: zero points yields an empty
/// vector, one point yields `[start]`.
pub fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num - 1) as f64;
            let mut grid: Vec<f64> = (0..num).map(|i| start + step * i as f64).collect();
            // The endpoint must be exact, not accumulated float steps.
            grid[num - 1] = end;
            grid
        }
    }
}

/// Evaluate every interpolator on the grid and sum elementwise.
pub fn sum_on_grid(interpolators: &[Interpolator], grid: &[f64]) -> Vec<f64> {
    let mut sums = vec![0.0; grid.len()];

    for interp in interpolators {
        for (sum, value) in sums.iter_mut().zip(interp.evaluate_many(grid)) {
            *sum += value;
        }
    }

    sums
}
