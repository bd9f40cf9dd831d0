//! Azure Cosmos DB REST API client and typed repositories.
//!
//! This crate provides:
//! - A REST client with master-key request signing, parameterized SQL
//!   queries (partitioned and cross-partition, with continuation paging),
//!   and document get/create
//! - Retry with exponential backoff and full jitter (Retry-After aware)
//! - Request tracing spans and Prometheus metrics
//! - `ProjectRepository`: project lookup and camera-area mapping scan
//! - `PredictionRepository`: masking-aware sample fetch for the engine

pub mod auth;
pub mod client;
pub mod error;
pub mod metrics;
pub mod prediction_repo;
pub mod project_repo;
pub mod retry;
pub mod types;

pub use client::{CosmosClient, CosmosConfig};
pub use error::{CosmosError, CosmosResult};
pub use prediction_repo::PredictionRepository;
pub use project_repo::ProjectRepository;
pub use retry::RetryConfig;
pub use types::{SqlParameter, SqlQuery};
