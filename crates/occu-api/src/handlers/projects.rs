//! Project lookup endpoint.

use axum::extract::{Path, State};
use axum::Json;

use occu_models::Project;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Retrieve a project configuration by its ID.
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Project>> {
    let project = state
        .projects
        .get_project(&project_id)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!("Project with ID {} not found.", project_id))
        })?;

    Ok(Json(project))
}
