//! Camera snapshot image endpoint.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Retrieve a camera snapshot image from the blob store.
pub async fn get_image(
    State(state): State<AppState>,
    Path(image_name): Path<String>,
) -> ApiResult<Response> {
    let (bytes, content_type) =
        state
            .storage
            .get_object_bytes(&image_name)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    ApiError::not_found(format!("Image '{}' not found", image_name))
                } else {
                    ApiError::from(e)
                }
            })?;

    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}
