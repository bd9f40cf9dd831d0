//! The aggregation orchestrator.
//!
//! Sequences one request through: validate, resolve, fetch (concurrent per
//! camera), classify data availability, build interpolators, evaluate the
//! shared grid, smooth, assemble. Errors from the first three steps surface
//! verbatim; there are no internal retries and no partial recovery.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures_util::future::try_join_all;
use tracing::debug;

use occu_models::{
    AggregateRequest, AggregateResponse, CameraTimestamp, PredictionData, TimeSeriesPoint,
};

use crate::aggregate::{elapsed_seconds, grid_size, linspace, observed_span, sum_on_grid};
use crate::error::{EngineError, EngineResult};
use crate::interpolate::Interpolator;
use crate::mapping::MappingCache;
use crate::smooth::moving_average;
use crate::store::SampleStore;

/// Aggregates per-camera predictions into one area time series.
pub struct AggregationService {
    mappings: Arc<MappingCache>,
    samples: Arc<dyn SampleStore>,
}

impl AggregationService {
    pub fn new(mappings: Arc<MappingCache>, samples: Arc<dyn SampleStore>) -> Self {
        Self { mappings, samples }
    }

    /// Aggregate predictions for an area over the request's lookback window.
    pub async fn aggregate(
        &self,
        project_id: &str,
        area_id: &str,
        request: &AggregateRequest,
    ) -> EngineResult<AggregateResponse> {
        // Step 1: reject invalid parameters before any store access.
        if !request.lookback_hours.is_finite() || request.lookback_hours <= 0.0 {
            return Err(EngineError::validation(
                "lookback_hours must be greater than 0",
            ));
        }

        // Step 2: resolve the area against the current mapping snapshot.
        let snapshot = self.mappings.snapshot();
        let area = snapshot.resolve(project_id, area_id)?;

        // Step 3: fetch every camera's samples concurrently over the window.
        let end = request.end_date;
        let start = end - lookback_duration(request.lookback_hours);

        let fetches = area.cameras.iter().map(|camera| {
            self.samples
                .fetch_window(project_id, area_id, camera, start, end)
        });
        let predictions: Vec<PredictionData> = try_join_all(fetches).await?;

        debug!(
            project_id,
            area_id,
            cameras = predictions.len(),
            samples = predictions.iter().map(|p| p.counts.len()).sum::<usize>(),
            "fetched prediction data"
        );

        // Step 4: classify data availability.
        if predictions.iter().all(|pred| !pred.has_data()) {
            // Confirmed absence of any data is a valid, empty result.
            return Ok(AggregateResponse::empty());
        }

        let missing: Vec<String> = predictions
            .iter()
            .filter(|pred| !pred.has_data())
            .map(|pred| pred.feed())
            .collect();
        if !missing.is_empty() {
            // Summing a subset would misrepresent true occupancy.
            return Err(EngineError::PartialData { missing });
        }

        // Step 5: build one interpolator per camera and collect the raw
        // timestamps actually consumed.
        let mut camera_timestamps = Vec::new();
        let mut interpolators = Vec::with_capacity(predictions.len());

        for pred in &predictions {
            for &ts in &pred.timestamps {
                camera_timestamps.push(CameraTimestamp {
                    camera_id: pred.camera_id.clone(),
                    position: pred.position.clone(),
                    timestamp: ts,
                });
            }

            let offsets: Vec<f64> = pred
                .timestamps
                .iter()
                .map(|&ts| elapsed_seconds(start, ts))
                .collect();
            if let Some(interp) = Interpolator::from_samples(&offsets, &pred.counts) {
                interpolators.push(interp);
            }
        }

        // Step 6: evaluate and sum on the shared grid over the observed span.
        // Classification guarantees data exists; stay total regardless.
        let Some((min_offset, max_offset)) = observed_span(&predictions, start) else {
            return Ok(AggregateResponse::empty());
        };
        let grid = linspace(min_offset, max_offset, grid_size(request.lookback_hours));
        let sums = sum_on_grid(&interpolators, &grid);

        // Step 7: smooth.
        let smoothed = moving_average(&sums, request.half_moving_avg_size as usize);

        // Step 8: assemble the response.
        let time_series = grid
            .iter()
            .zip(smoothed)
            .map(|(&offset, value)| TimeSeriesPoint {
                timestamp: offset_timestamp(start, offset),
                value: clamp_count(value),
            })
            .collect();

        Ok(AggregateResponse {
            time_series,
            camera_timestamps,
        })
    }
}

fn lookback_duration(lookback_hours: f64) -> Duration {
    Duration::milliseconds((lookback_hours * 3_600_000.0).round() as i64)
}

fn offset_timestamp(start: DateTime<Utc>, offset_seconds: f64) -> DateTime<Utc> {
    start + Duration::milliseconds((offset_seconds * 1000.0).round() as i64)
}

/// Non-negative integer value: truncation toward zero, then floor at zero.
fn clamp_count(value: f64) -> i64 {
    (value.trunc() as i64).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_count_truncates_toward_zero() {
        assert_eq!(clamp_count(3.9), 3);
        assert_eq!(clamp_count(0.9), 0);
        assert_eq!(clamp_count(-0.4), 0);
        assert_eq!(clamp_count(-7.2), 0);
        assert_eq!(clamp_count(12.0), 12);
    }

    #[test]
    fn test_lookback_duration_fractional_hours() {
        assert_eq!(lookback_duration(0.5), Duration::minutes(30));
        assert_eq!(lookback_duration(3.0), Duration::hours(3));
        assert_eq!(lookback_duration(0.25), Duration::minutes(15));
    }
}
