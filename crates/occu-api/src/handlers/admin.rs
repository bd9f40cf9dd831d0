//! Administrative endpoints.

use axum::extract::State;
use axum::Json;
use tracing::info;

use occu_engine::MappingStats;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Rebuild the camera-area mapping snapshot from project configuration.
///
/// Call after project/camera/area configuration changes; in-flight requests
/// keep the snapshot they started with.
pub async fn reload_mappings(State(state): State<AppState>) -> ApiResult<Json<MappingStats>> {
    let stats = state
        .mappings
        .reload(state.projects.as_ref())
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    info!(
        projects = stats.projects,
        areas = stats.areas,
        "camera-area mappings reloaded"
    );

    Ok(Json(stats))
}
