//! Engine error taxonomy.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by the aggregation orchestrator.
///
/// "All cameras empty" is deliberately absent: that case is a valid success
/// with an empty response, not an error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Project '{0}' not found")]
    ProjectNotFound(String),

    #[error("Area '{area_id}' not found in project '{project_id}'")]
    AreaNotFound {
        project_id: String,
        area_id: String,
    },

    #[error(
        "Partial prediction data found. Missing data for cameras: {}. \
         Cannot aggregate when some cameras have data but others don't in the requested timespan.",
        .missing.join(", ")
    )]
    PartialData { missing: Vec<String> },

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Store request failed: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// True for errors caused by the request rather than the backend.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, EngineError::Store(_))
    }
}
