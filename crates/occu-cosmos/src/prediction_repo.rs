//! Typed repository for raw prediction samples.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use occu_engine::store::{SampleStore, StoreError};
use occu_models::time::{format_utc, parse_utc};
use occu_models::{CameraPosition, PredictionData};

use crate::client::CosmosClient;
use crate::error::CosmosResult;
use crate::types::SqlQuery;

const COLLECTION: &str = "predictions";

/// Repository for the `predictions` container, partitioned by project.
pub struct PredictionRepository {
    client: CosmosClient,
}

impl PredictionRepository {
    pub fn new(client: CosmosClient) -> Self {
        Self { client }
    }

    /// Fetch one camera position's samples within `[start, end]`.
    ///
    /// The count per sample is selected by the camera's masking flag: the
    /// area-specific sub-count when masking is enabled, the total otherwise.
    pub async fn fetch_window(
        &self,
        project_id: &str,
        area_id: &str,
        camera: &CameraPosition,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> CosmosResult<PredictionData> {
        let query = SqlQuery::new(
            "SELECT c.timestamp, c.counts FROM c \
             WHERE c.camera = @camera AND c.position = @position \
             AND c.timestamp >= @start AND c.timestamp <= @end \
             ORDER BY c.timestamp",
        )
        .param("@camera", camera.camera_id.as_str())
        .param("@position", camera.position.as_str())
        .param("@start", format_utc(&start))
        .param("@end", format_utc(&end));

        let docs = self
            .client
            .with_retry("query_predictions", || {
                self.client
                    .query_documents(COLLECTION, Some(project_id), &query)
            })
            .await?;

        let data = predictions_from_docs(&docs, area_id, camera);

        debug!(
            camera = %camera,
            samples = data.counts.len(),
            masking = camera.enable_masking,
            "retrieved predictions"
        );

        Ok(data)
    }
}

/// Parse query result documents into a prediction series.
///
/// Documents with a missing or unparseable timestamp, a missing count key,
/// or a timestamp not strictly after the previous one are skipped with a
/// warning; a skipped document contributes neither a count nor a timestamp.
fn predictions_from_docs(
    docs: &[Value],
    area_id: &str,
    camera: &CameraPosition,
) -> PredictionData {
    let mut data = PredictionData::empty(camera.camera_id.clone(), camera.position.clone());

    for doc in docs {
        let Some(timestamp_str) = doc.get("timestamp").and_then(Value::as_str) else {
            warn!(camera = %camera, "skipping prediction without timestamp");
            continue;
        };

        let timestamp = match parse_utc(timestamp_str) {
            Ok(ts) => ts,
            Err(e) => {
                warn!(
                    camera = %camera,
                    timestamp = timestamp_str,
                    "skipping prediction with invalid timestamp format: {}",
                    e
                );
                continue;
            }
        };

        let Some(counts) = doc.get("counts").and_then(Value::as_object) else {
            warn!(camera = %camera, timestamp = timestamp_str, "skipping prediction without counts");
            continue;
        };

        let count_key = if camera.enable_masking { area_id } else { "total" };
        let Some(count) = counts.get(count_key).and_then(Value::as_i64) else {
            warn!(
                camera = %camera,
                timestamp = timestamp_str,
                count_key,
                available = ?counts.keys().collect::<Vec<_>>(),
                "skipping prediction missing expected count key"
            );
            continue;
        };

        // Timestamps must be strictly increasing for interpolation.
        if data.timestamps.last().is_some_and(|&last| timestamp <= last) {
            warn!(
                camera = %camera,
                timestamp = timestamp_str,
                "skipping prediction with out-of-order timestamp"
            );
            continue;
        }

        data.timestamps.push(timestamp);
        data.counts.push(count);
    }

    data
}

#[async_trait]
impl SampleStore for PredictionRepository {
    async fn fetch_window(
        &self,
        project_id: &str,
        area_id: &str,
        camera: &CameraPosition,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PredictionData, StoreError> {
        PredictionRepository::fetch_window(self, project_id, area_id, camera, start, end)
            .await
            .map_err(StoreError::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn camera(enable_masking: bool) -> CameraPosition {
        CameraPosition {
            camera_id: "cam1".to_string(),
            position: "standard".to_string(),
            enable_masking,
        }
    }

    #[test]
    fn test_masking_enabled_uses_area_count() {
        let docs = vec![json!({
            "timestamp": "2025-01-01T00:00:00Z",
            "counts": {"entrance": 7, "total": 99}
        })];

        let data = predictions_from_docs(&docs, "entrance", &camera(true));
        assert_eq!(data.counts, vec![7]);
    }

    #[test]
    fn test_masking_disabled_uses_total() {
        let docs = vec![json!({
            "timestamp": "2025-01-01T00:00:00Z",
            "counts": {"entrance": 7, "total": 99}
        })];

        let data = predictions_from_docs(&docs, "entrance", &camera(false));
        assert_eq!(data.counts, vec![99]);
    }

    #[test]
    fn test_missing_count_key_skips_document() {
        let docs = vec![
            json!({
                "timestamp": "2025-01-01T00:00:00Z",
                "counts": {"other_area": 3}
            }),
            json!({
                "timestamp": "2025-01-01T00:01:00Z",
                "counts": {"entrance": 5}
            }),
        ];

        let data = predictions_from_docs(&docs, "entrance", &camera(true));
        assert_eq!(data.counts, vec![5]);
        assert_eq!(data.timestamps.len(), 1);
    }

    #[test]
    fn test_invalid_timestamp_skips_document() {
        let docs = vec![
            json!({"timestamp": "yesterday", "counts": {"total": 1}}),
            json!({"timestamp": "2025-01-01T00:00:00Z", "counts": {"total": 2}}),
        ];

        let data = predictions_from_docs(&docs, "entrance", &camera(false));
        assert_eq!(data.counts, vec![2]);
    }

    #[test]
    fn test_out_of_order_timestamp_skips_document() {
        let docs = vec![
            json!({"timestamp": "2025-01-01T00:02:00Z", "counts": {"total": 1}}),
            json!({"timestamp": "2025-01-01T00:01:00Z", "counts": {"total": 2}}),
            json!({"timestamp": "2025-01-01T00:02:00Z", "counts": {"total": 3}}),
            json!({"timestamp": "2025-01-01T00:03:00Z", "counts": {"total": 4}}),
        ];

        let data = predictions_from_docs(&docs, "entrance", &camera(false));
        assert_eq!(data.counts, vec![1, 4]);
    }

    #[test]
    fn test_empty_result_has_no_data() {
        let data = predictions_from_docs(&[], "entrance", &camera(false));
        assert!(!data.has_data());
    }
}
