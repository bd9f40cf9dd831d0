//! Blob store client for camera snapshot images.
//!
//! This crate provides:
//! - Image retrieval as bytes with content-type resolution
//! - Connectivity check for readiness probes

pub mod client;
pub mod error;

pub use client::{BlobClient, BlobConfig};
pub use error::{StorageError, StorageResult};
