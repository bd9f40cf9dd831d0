//! Typed repository for project configuration.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use occu_engine::store::{ProjectStore, StoreError};
use occu_models::{Project, ProjectMapping};

use crate::client::CosmosClient;
use crate::error::{CosmosError, CosmosResult};
use crate::types::SqlQuery;

const COLLECTION: &str = "projects";

/// Repository for the `projects` container.
pub struct ProjectRepository {
    client: CosmosClient,
}

impl ProjectRepository {
    pub fn new(client: CosmosClient) -> Self {
        Self { client }
    }

    /// Fetch a project configuration document by ID.
    pub async fn get_project(&self, project_id: &str) -> CosmosResult<Option<Project>> {
        let query = SqlQuery::new("SELECT * FROM c WHERE c.id = @project_id")
            .param("@project_id", project_id);

        let docs = self
            .client
            .with_retry("query_project", || {
                self.client.query_documents(COLLECTION, None, &query)
            })
            .await?;

        match docs.into_iter().next() {
            None => Ok(None),
            Some(doc) => serde_json::from_value(doc)
                .map(Some)
                .map_err(|e| {
                    CosmosError::invalid_response(format!(
                        "Project '{}' does not match expected schema: {}",
                        project_id, e
                    ))
                }),
        }
    }

    /// Scan every project and derive its camera-area mappings.
    ///
    /// Documents that fail to parse as project configuration are skipped
    /// with a warning so one malformed project cannot take down the scan.
    pub async fn get_camera_mappings(&self) -> CosmosResult<HashMap<String, ProjectMapping>> {
        let docs = self
            .client
            .with_retry("scan_projects", || {
                self.client
                    .query_documents(COLLECTION, None, &SqlQuery::new("SELECT * FROM c"))
            })
            .await?;

        let mappings = mappings_from_docs(docs);
        info!(projects = mappings.len(), "loaded camera-area mappings");
        Ok(mappings)
    }
}

fn mappings_from_docs(docs: Vec<Value>) -> HashMap<String, ProjectMapping> {
    let mut mappings = HashMap::new();

    for doc in docs {
        let doc_id = doc
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("?")
            .to_string();

        match serde_json::from_value::<Project>(doc) {
            Ok(project) => {
                mappings.insert(project.id.clone(), project.area_mappings());
            }
            Err(e) => {
                warn!(project = doc_id, "skipping malformed project document: {}", e);
            }
        }
    }

    mappings
}

#[async_trait]
impl ProjectStore for ProjectRepository {
    async fn camera_mappings(&self) -> Result<HashMap<String, ProjectMapping>, StoreError> {
        self.get_camera_mappings().await.map_err(StoreError::new)
    }
}
