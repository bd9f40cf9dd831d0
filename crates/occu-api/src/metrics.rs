//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "occu_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "occu_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "occu_http_requests_in_flight";

    pub const AGGREGATIONS_TOTAL: &str = "occu_aggregations_total";
    pub const AGGREGATION_CAMERAS: &str = "occu_aggregation_cameras";

    pub const RATE_LIMIT_HITS_TOTAL: &str = "occu_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a completed aggregation with its outcome label.
pub fn record_aggregation(outcome: &str, cameras: usize) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::AGGREGATIONS_TOTAL, &labels).increment(1);
    histogram!(names::AGGREGATION_CAMERAS).record(cameras as f64);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", sanitize_path(endpoint))];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Sanitize path for metrics labels (collapse identifiers).
fn sanitize_path(path: &str) -> String {
    let path = regex_lite::Regex::new(r"/projects/[^/]+")
        .unwrap()
        .replace_all(path, "/projects/:project_id");
    let path = regex_lite::Regex::new(r"/areas/[^/]+")
        .unwrap()
        .replace_all(&path, "/areas/:area_id");
    let path = regex_lite::Regex::new(r"/images/[^/]+")
        .unwrap()
        .replace_all(&path, "/images/:image_name");
    path.to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
