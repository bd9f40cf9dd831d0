//! Cosmos DB error types.

use thiserror::Error;

/// Result type for Cosmos operations.
pub type CosmosResult<T> = Result<T, CosmosError>;

/// Errors that can occur during Cosmos DB operations.
#[derive(Debug, Error)]
pub enum CosmosError {
    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document already exists: {0}")]
    AlreadyExists(String),

    #[error("Rate limited, retry after {0}ms")]
    RateLimited(u64),

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CosmosError {
    pub fn auth_error(msg: impl Into<String>) -> Self {
        Self::AuthError(msg.into())
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Map an HTTP status to the matching error variant.
    ///
    /// `retry_after_ms` comes from the `x-ms-retry-after-ms` header on 429.
    pub fn from_http_status(status: u16, msg: String, retry_after_ms: Option<u64>) -> Self {
        match status {
            401 => Self::AuthError(msg),
            403 => Self::PermissionDenied(msg),
            404 => Self::NotFound(msg),
            409 => Self::AlreadyExists(msg),
            429 => Self::RateLimited(retry_after_ms.unwrap_or(1000)),
            500..=599 => Self::ServerError(status, msg),
            _ => Self::RequestFailed(msg),
        }
    }

    /// Check if the error is worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CosmosError::Network(_) | CosmosError::RateLimited(_) | CosmosError::ServerError(_, _)
        )
    }

    /// Server-advertised retry delay, if any.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            CosmosError::RateLimited(ms) => Some(*ms),
            _ => None,
        }
    }

    /// HTTP status for metrics labeling.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            CosmosError::AuthError(_) => Some(401),
            CosmosError::PermissionDenied(_) => Some(403),
            CosmosError::NotFound(_) => Some(404),
            CosmosError::AlreadyExists(_) => Some(409),
            CosmosError::RateLimited(_) => Some(429),
            CosmosError::ServerError(status, _) => Some(*status),
            _ => None,
        }
    }
}
