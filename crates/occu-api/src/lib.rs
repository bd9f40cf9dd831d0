//! Axum HTTP API server.
//!
//! This crate provides:
//! - The aggregation endpoint and its read-side plumbing (project lookup,
//!   snapshot images, mapping reload)
//! - API key authentication, per-IP rate limiting, security headers
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
