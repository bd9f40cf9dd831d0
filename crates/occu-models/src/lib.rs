//! Shared data models for the OccuCount backend.
//!
//! This crate provides Serde-serializable types for:
//! - Aggregation requests and responses
//! - Per-camera prediction data and camera/area mappings
//! - Project configuration (cameras, positions, model schedules)
//! - The fixed wire timestamp format

pub mod prediction;
pub mod project;
pub mod time;

// Re-export common types
pub use prediction::{
    AggregateRequest, AggregateResponse, AreaMapping, CameraPosition, CameraTimestamp,
    PredictionData, ProjectMapping, TimeSeriesPoint,
};
pub use project::{
    Area, Camera, CameraConfig, CountingModel, MaskingConfig, ModelSchedule, Position, Project,
    ProjectConfigError, TimeAtDay,
};
pub use time::{format_utc, parse_utc, DATETIME_FORMAT};
