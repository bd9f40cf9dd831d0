//! Occupancy aggregation engine.
//!
//! This crate reconstructs a single continuous occupancy estimate for an
//! area from the irregular per-camera samples stored upstream:
//!
//! - [`interpolate`]: per-camera continuous reconstruction (piecewise-linear
//!   with linear extrapolation, or constant for single-sample cameras)
//! - [`aggregate`]: shared evaluation grid over the observed data span and
//!   elementwise summation across cameras
//! - [`smooth`]: centered moving average with edge-replication padding
//! - [`mapping`]: immutable camera-area snapshot with an explicit reload
//! - [`service`]: the per-request orchestration (validate, resolve, fetch,
//!   classify, build, aggregate, smooth, assemble)
//!
//! Store access goes through the [`store`] traits; the engine itself never
//! constructs queries, retries, or recovers partially.

pub mod aggregate;
pub mod error;
pub mod interpolate;
pub mod mapping;
pub mod service;
pub mod smooth;
pub mod store;

#[cfg(test)]
mod tests;

pub use error::EngineError;
pub use interpolate::Interpolator;
pub use mapping::{MappingCache, MappingSnapshot, MappingStats};
pub use service::AggregationService;
pub use store::{ProjectStore, SampleStore, StoreError};
