//! Orchestrator scenarios against an in-memory sample store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use occu_models::{
    AggregateRequest, AreaMapping, CameraPosition, PredictionData, ProjectMapping,
};

use crate::error::EngineError;
use crate::mapping::{MappingCache, MappingSnapshot};
use crate::service::AggregationService;
use crate::store::{SampleStore, StoreError};

/// In-memory sample store keyed by `camera@position`.
struct FixtureStore {
    data: HashMap<String, PredictionData>,
    fail: bool,
}

impl FixtureStore {
    fn new(predictions: Vec<PredictionData>) -> Self {
        let data = predictions
            .into_iter()
            .map(|pred| (pred.feed(), pred))
            .collect();
        Self { data, fail: false }
    }

    fn failing() -> Self {
        Self {
            data: HashMap::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl SampleStore for FixtureStore {
    async fn fetch_window(
        &self,
        _project_id: &str,
        _area_id: &str,
        camera: &CameraPosition,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<PredictionData, StoreError> {
        if self.fail {
            return Err(StoreError::new("sample store unavailable"));
        }
        Ok(self
            .data
            .get(&camera.to_string())
            .cloned()
            .unwrap_or_else(|| {
                PredictionData::empty(camera.camera_id.clone(), camera.position.clone())
            }))
    }
}

fn camera(id: &str, position: &str) -> CameraPosition {
    CameraPosition {
        camera_id: id.to_string(),
        position: position.to_string(),
        enable_masking: false,
    }
}

fn service_for(cameras: Vec<CameraPosition>, store: FixtureStore) -> AggregationService {
    let mut areas = HashMap::new();
    areas.insert(
        "entrance".to_string(),
        AreaMapping {
            area_id: "entrance".to_string(),
            cameras,
        },
    );

    let mut projects = HashMap::new();
    projects.insert(
        "demo".to_string(),
        ProjectMapping {
            project_id: "demo".to_string(),
            areas,
        },
    );

    AggregationService::new(
        Arc::new(MappingCache::new(MappingSnapshot::new(projects))),
        Arc::new(store),
    )
}

fn samples(id: &str, position: &str, points: &[(i64, i64)], start: DateTime<Utc>) -> PredictionData {
    PredictionData {
        camera_id: id.to_string(),
        position: position.to_string(),
        timestamps: points
            .iter()
            .map(|&(secs, _)| start + Duration::seconds(secs))
            .collect(),
        counts: points.iter().map(|&(_, count)| count).collect(),
    }
}

fn request(end: DateTime<Utc>, lookback_hours: f64, half: u32) -> AggregateRequest {
    AggregateRequest {
        end_date: end,
        lookback_hours,
        half_moving_avg_size: half,
    }
}

fn window_start(end: DateTime<Utc>, lookback_hours: f64) -> DateTime<Utc> {
    end - Duration::milliseconds((lookback_hours * 3_600_000.0).round() as i64)
}

fn end_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 5, 10, 0, 0).unwrap()
}

#[tokio::test]
async fn two_cameras_linear_plus_constant() {
    let end = end_instant();
    let start = window_start(end, 0.5);

    let service = service_for(
        vec![camera("camA", "standard"), camera("camB", "standard")],
        FixtureStore::new(vec![
            samples("camA", "standard", &[(0, 10), (1800, 20)], start),
            samples("camB", "standard", &[(900, 5)], start),
        ]),
    );

    let response = service
        .aggregate("demo", "entrance", &request(end, 0.5, 0))
        .await
        .unwrap();

    // floor(0.5 * 120) grid points over the observed [0, 1800] s span.
    assert_eq!(response.time_series.len(), 60);
    assert_eq!(response.time_series[0].value, 15);
    assert_eq!(response.time_series[59].value, 25);
    assert_eq!(response.time_series[0].timestamp, start);
    assert_eq!(
        response.time_series[59].timestamp,
        start + Duration::seconds(1800)
    );

    // Linear contribution from camera A: monotone nondecreasing throughout.
    for pair in response.time_series.windows(2) {
        assert!(pair[1].value >= pair[0].value);
    }

    // One diagnostic timestamp per raw sample consumed.
    assert_eq!(response.camera_timestamps.len(), 3);
    assert!(response
        .camera_timestamps
        .iter()
        .all(|ct| ct.camera_id == "camA" || ct.camera_id == "camB"));
}

#[tokio::test]
async fn values_never_negative() {
    let end = end_instant();
    let start = window_start(end, 0.5);

    // Camera B's data stops early with a steep downward slope; on the tail
    // of the grid its linear extrapolation goes far below zero.
    let service = service_for(
        vec![camera("camA", "standard"), camera("camB", "standard")],
        FixtureStore::new(vec![
            samples("camA", "standard", &[(0, 5), (1800, 5)], start),
            samples("camB", "standard", &[(0, 20), (600, 2)], start),
        ]),
    );

    let response = service
        .aggregate("demo", "entrance", &request(end, 0.5, 0))
        .await
        .unwrap();

    assert!(!response.time_series.is_empty());
    for point in &response.time_series {
        assert!(point.value >= 0);
    }
    // The extrapolated tail is genuinely clamped, not coincidentally positive.
    assert_eq!(response.time_series.last().unwrap().value, 0);
}

#[tokio::test]
async fn identical_requests_yield_identical_output() {
    let end = end_instant();
    let start = window_start(end, 1.0);

    let service = service_for(
        vec![camera("camA", "standard")],
        FixtureStore::new(vec![samples(
            "camA",
            "standard",
            &[(0, 3), (700, 9), (1400, 6), (3500, 11)],
            start,
        )]),
    );

    let req = request(end, 1.0, 2);
    let first = service.aggregate("demo", "entrance", &req).await.unwrap();
    let second = service.aggregate("demo", "entrance", &req).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn all_cameras_empty_is_success_with_empty_response() {
    let end = end_instant();

    let service = service_for(
        vec![camera("camA", "standard"), camera("camB", "wide")],
        FixtureStore::new(vec![]),
    );

    let response = service
        .aggregate("demo", "entrance", &request(end, 3.0, 0))
        .await
        .unwrap();

    assert!(response.time_series.is_empty());
    assert!(response.camera_timestamps.is_empty());
}

#[tokio::test]
async fn partial_data_names_exactly_the_empty_cameras() {
    let end = end_instant();
    let start = window_start(end, 3.0);

    let service = service_for(
        vec![camera("camA", "standard"), camera("camB", "wide")],
        FixtureStore::new(vec![samples("camA", "standard", &[(0, 4), (60, 6)], start)]),
    );

    let err = service
        .aggregate("demo", "entrance", &request(end, 3.0, 0))
        .await
        .unwrap_err();

    match err {
        EngineError::PartialData { missing } => {
            assert_eq!(missing, vec!["camB@wide".to_string()]);
        }
        other => panic!("expected PartialData, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_project_and_area_are_distinguished() {
    let service = service_for(vec![camera("camA", "standard")], FixtureStore::new(vec![]));
    let req = request(end_instant(), 3.0, 0);

    let err = service.aggregate("ghost", "entrance", &req).await.unwrap_err();
    assert!(matches!(err, EngineError::ProjectNotFound(_)));

    let err = service.aggregate("demo", "roof", &req).await.unwrap_err();
    assert!(matches!(err, EngineError::AreaNotFound { .. }));
}

#[tokio::test]
async fn store_failure_is_fatal_not_no_data() {
    let service = service_for(vec![camera("camA", "standard")], FixtureStore::failing());

    let err = service
        .aggregate("demo", "entrance", &request(end_instant(), 3.0, 0))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Store(_)));
}

#[tokio::test]
async fn nonpositive_lookback_rejected_before_fetch() {
    // A failing store proves validation fires before any store access.
    let service = service_for(vec![camera("camA", "standard")], FixtureStore::failing());

    let err = service
        .aggregate("demo", "entrance", &request(end_instant(), 0.0, 0))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn smoothing_preserves_length_and_replicates_edges() {
    let end = end_instant();
    let start = window_start(end, 1.0);

    // Alternating 0/10 counts every 100 seconds across the window.
    let points: Vec<(i64, i64)> = (0..36)
        .map(|i| (i * 100, if i % 2 == 0 { 0 } else { 10 }))
        .collect();

    let service = service_for(
        vec![camera("camA", "standard")],
        FixtureStore::new(vec![samples("camA", "standard", &points, start)]),
    );

    let raw = service
        .aggregate("demo", "entrance", &request(end, 1.0, 0))
        .await
        .unwrap();
    let smoothed = service
        .aggregate("demo", "entrance", &request(end, 1.0, 2))
        .await
        .unwrap();

    assert_eq!(raw.time_series.len(), 120);
    assert_eq!(smoothed.time_series.len(), raw.time_series.len());
    assert_eq!(smoothed.camera_timestamps, raw.camera_timestamps);

    // Edge replication: the first and last outputs average a window padded
    // with the boundary value itself, so they stay near that value instead
    // of being dragged toward zero by synthetic padding.
    let first_raw = raw.time_series[0].value as f64;
    let last_raw = raw.time_series[119].value as f64;
    assert!((smoothed.time_series[0].value as f64 - first_raw).abs() <= 4.0);
    assert!((smoothed.time_series[119].value as f64 - last_raw).abs() <= 4.0);
}

#[tokio::test]
async fn area_with_no_cameras_yields_empty_response() {
    let service = service_for(vec![], FixtureStore::new(vec![]));

    let response = service
        .aggregate("demo", "entrance", &request(end_instant(), 3.0, 0))
        .await
        .unwrap();

    assert_eq!(response.time_series.len(), 0);
    assert_eq!(response.camera_timestamps.len(), 0);
}

#[tokio::test]
async fn grid_length_matches_lookback_budget() {
    let end = end_instant();
    let start = window_start(end, 2.5);

    let service = service_for(
        vec![camera("camA", "standard")],
        FixtureStore::new(vec![samples(
            "camA",
            "standard",
            &[(100, 1), (5000, 3), (8900, 2)],
            start,
        )]),
    );

    let response = service
        .aggregate("demo", "entrance", &request(end, 2.5, 0))
        .await
        .unwrap();

    assert_eq!(response.time_series.len(), 300);
}
