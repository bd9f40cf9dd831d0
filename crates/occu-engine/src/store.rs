//! Store collaborator contracts.
//!
//! The engine fetches project configuration and raw samples through these
//! traits; the concrete implementations live with the store client. Retry
//! policy, timeouts, and query construction belong to the implementor. A
//! failed or timed-out fetch must surface as an error, never as "no data".

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use occu_models::{CameraPosition, PredictionData, ProjectMapping};

/// Opaque store failure, carrying the implementor's error.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StoreError(Box<dyn std::error::Error + Send + Sync>);

impl StoreError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(source.into())
    }

    /// Borrow the underlying error.
    pub fn source_err(&self) -> &(dyn std::error::Error + Send + Sync) {
        self.0.as_ref()
    }
}

/// Read access to project configuration.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Scan every project and derive its camera-area mappings.
    async fn camera_mappings(&self) -> Result<HashMap<String, ProjectMapping>, StoreError>;
}

/// Read access to raw prediction samples.
#[async_trait]
pub trait SampleStore: Send + Sync {
    /// Fetch one camera position's samples within `[start, end]`, ordered by
    /// ascending timestamp, with the count selected per the camera's masking
    /// flag.
    async fn fetch_window(
        &self,
        project_id: &str,
        area_id: &str,
        camera: &CameraPosition,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PredictionData, StoreError>;
}
