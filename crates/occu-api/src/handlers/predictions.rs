//! Aggregation endpoint.

use std::collections::HashSet;

use axum::extract::{Path, State};
use axum::Json;
use validator::Validate;

use occu_engine::EngineError;
use occu_models::{AggregateRequest, AggregateResponse};

use crate::error::{ApiError, ApiResult};
use crate::metrics::record_aggregation;
use crate::state::AppState;

/// Aggregate predictions for an area over a lookback window.
///
/// Sums all camera predictions covering the area on a shared time grid,
/// with optional moving-average smoothing. An area where no camera has any
/// samples yields an empty series; an area where only some cameras have
/// samples is rejected as partial data.
pub async fn aggregate_time_series(
    State(state): State<AppState>,
    Path((project_id, area_id)): Path<(String, String)>,
    Json(request): Json<AggregateRequest>,
) -> ApiResult<Json<AggregateResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

    let result = state
        .aggregation
        .aggregate(&project_id, &area_id, &request)
        .await;

    match &result {
        Ok(response) if response.time_series.is_empty() => record_aggregation("empty", 0),
        Ok(response) => {
            let cameras: HashSet<(&str, &str)> = response
                .camera_timestamps
                .iter()
                .map(|ct| (ct.camera_id.as_str(), ct.position.as_str()))
                .collect();
            record_aggregation("ok", cameras.len());
        }
        Err(EngineError::PartialData { missing }) => record_aggregation("partial", missing.len()),
        Err(_) => record_aggregation("error", 0),
    }

    Ok(Json(result?))
}
