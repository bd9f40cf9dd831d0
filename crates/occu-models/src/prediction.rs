//! Aggregation request/response types and per-camera prediction data.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::time::utc_second;

/// One camera feed: a camera paired with a named viewing position.
///
/// `enable_masking` selects which count field of a raw prediction document is
/// relevant for an area: the area-specific sub-count when masking is enabled,
/// the total count otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraPosition {
    pub camera_id: String,
    pub position: String,
    #[serde(default)]
    pub enable_masking: bool,
}

impl fmt::Display for CameraPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.camera_id, self.position)
    }
}

/// Diagnostic record: one raw prediction timestamp actually consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraTimestamp {
    pub camera_id: String,
    pub position: String,
    #[serde(with = "utc_second")]
    pub timestamp: DateTime<Utc>,
}

impl CameraTimestamp {
    /// Blob key prefix of the snapshot image matching this prediction.
    pub fn blob_prefix(&self, project_id: &str) -> String {
        let date_str = self.timestamp.format("%Y_%m_%d-%H_%M_%S");
        format!(
            "{}-{}-{}-{}",
            project_id, self.camera_id, self.position, date_str
        )
    }
}

/// Mapping of an area to the camera positions covering it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaMapping {
    pub area_id: String,
    #[serde(default)]
    pub cameras: Vec<CameraPosition>,
}

/// Mapping of a project to its areas and their camera positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProjectMapping {
    pub project_id: String,
    #[serde(default)]
    pub areas: HashMap<String, AreaMapping>,
}

impl ProjectMapping {
    /// Look up an area by ID.
    pub fn get_area(&self, area_id: &str) -> Option<&AreaMapping> {
        self.areas.get(area_id)
    }
}

/// Raw prediction data for one camera position over a query window.
///
/// Invariant: `timestamps` is strictly increasing and `counts` has the same
/// length (the repository enforces both when parsing query results).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionData {
    pub camera_id: String,
    pub position: String,
    pub timestamps: Vec<DateTime<Utc>>,
    pub counts: Vec<i64>,
}

impl PredictionData {
    /// An empty series for a camera position.
    pub fn empty(camera_id: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            camera_id: camera_id.into(),
            position: position.into(),
            timestamps: Vec::new(),
            counts: Vec::new(),
        }
    }

    /// Whether any samples were observed in the window.
    pub fn has_data(&self) -> bool {
        !self.timestamps.is_empty()
    }

    /// The latest observed sample instant, if any.
    pub fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    /// `camera@position` label used in diagnostics and error messages.
    pub fn feed(&self) -> String {
        format!("{}@{}", self.camera_id, self.position)
    }
}

fn default_lookback_hours() -> f64 {
    3.0
}

/// Request body for the aggregate operation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AggregateRequest {
    /// End of the lookback window.
    #[serde(with = "utc_second")]
    pub end_date: DateTime<Utc>,
    /// Hours to look back from `end_date`. Must be positive.
    #[serde(default = "default_lookback_hours")]
    #[validate(range(exclusive_min = 0.0, message = "lookback_hours must be greater than 0"))]
    pub lookback_hours: f64,
    /// Half size of the moving average window (0 = no smoothing).
    #[serde(default)]
    pub half_moving_avg_size: u32,
}

/// A single point of the aggregated series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    #[serde(with = "utc_second")]
    pub timestamp: DateTime<Utc>,
    /// Summed occupancy estimate, clamped to non-negative integers.
    pub value: i64,
}

/// Response body for the aggregate operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AggregateResponse {
    pub time_series: Vec<TimeSeriesPoint>,
    pub camera_timestamps: Vec<CameraTimestamp>,
}

impl AggregateResponse {
    /// The valid "no data anywhere" outcome: both lists empty.
    pub fn empty() -> Self {
        Self::default()
    }
}
