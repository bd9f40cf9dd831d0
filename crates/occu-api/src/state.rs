//! Application state.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use occu_cosmos::{CosmosClient, PredictionRepository, ProjectRepository};
use occu_engine::{AggregationService, MappingCache};
use occu_storage::BlobClient;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub cosmos: Arc<CosmosClient>,
    pub storage: Arc<BlobClient>,
    pub projects: Arc<ProjectRepository>,
    pub mappings: Arc<MappingCache>,
    pub aggregation: Arc<AggregationService>,
}

impl AppState {
    /// Create new application state.
    ///
    /// The camera-area mapping snapshot is built once here, at startup;
    /// `POST /api/admin/mappings/reload` rebuilds it after configuration
    /// changes.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let cosmos = CosmosClient::from_env().context("Failed to create Cosmos client")?;
        let storage = BlobClient::from_env().context("Failed to create blob client")?;

        let projects = Arc::new(ProjectRepository::new(cosmos.clone()));
        let samples = Arc::new(PredictionRepository::new(cosmos.clone()));

        let mappings = Arc::new(
            MappingCache::load(projects.as_ref())
                .await
                .context("Failed to load camera-area mappings")?,
        );
        let stats = mappings.snapshot().stats();
        info!(
            projects = stats.projects,
            areas = stats.areas,
            "camera-area mappings loaded"
        );

        let aggregation = Arc::new(AggregationService::new(Arc::clone(&mappings), samples));

        Ok(Self {
            config,
            cosmos: Arc::new(cosmos),
            storage: Arc::new(storage),
            projects,
            mappings,
            aggregation,
        })
    }
}
