//! Cosmos DB REST API client.
//!
//! Production-grade client with:
//! - Master-key request signing (per-request `authorization` header)
//! - HTTP client tuning (pooling, timeouts)
//! - Parameterized SQL queries with continuation-token paging
//! - Exponential backoff with jitter (via [`crate::retry`])
//! - Observability (tracing spans, metrics)

use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{info_span, Instrument};

use crate::auth;
use crate::error::{CosmosError, CosmosResult};
use crate::metrics::record_request;
use crate::retry::RetryConfig;
use crate::types::{QueryResponse, SqlQuery};

/// REST API version pinned for stable wire behavior.
const API_VERSION: &str = "2018-12-31";

// =============================================================================
// Configuration
// =============================================================================

/// Cosmos DB client configuration.
#[derive(Debug, Clone)]
pub struct CosmosConfig {
    /// Account endpoint, e.g. `https://myaccount.documents.azure.com`
    pub endpoint: String,
    /// Base64 account primary key
    pub primary_key: String,
    /// Database name
    pub database: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
}

impl CosmosConfig {
    /// Create config from environment variables.
    pub fn from_env() -> CosmosResult<Self> {
        let endpoint = std::env::var("COSMOS_DB_ENDPOINT")
            .map_err(|_| CosmosError::auth_error("COSMOS_DB_ENDPOINT must be set"))?;
        let primary_key = std::env::var("COSMOS_DB_PRIMARY_KEY")
            .map_err(|_| CosmosError::auth_error("COSMOS_DB_PRIMARY_KEY must be set"))?;
        let database = std::env::var("COSMOS_DB_DATABASE_NAME")
            .map_err(|_| CosmosError::auth_error("COSMOS_DB_DATABASE_NAME must be set"))?;

        if endpoint.is_empty() || primary_key.is_empty() || database.is_empty() {
            return Err(CosmosError::auth_error(
                "Cosmos DB connection settings cannot be empty",
            ));
        }

        let connect_timeout_secs: u64 = std::env::var("COSMOS_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            endpoint,
            primary_key,
            database,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            retry: RetryConfig::from_env(),
        })
    }
}

// =============================================================================
// Client
// =============================================================================

/// Cosmos DB REST API client.
#[derive(Clone)]
pub struct CosmosClient {
    http: Client,
    endpoint: String,
    database: String,
    key: Vec<u8>,
    retry: RetryConfig,
}

impl CosmosClient {
    /// Create a new Cosmos client.
    pub fn new(config: CosmosConfig) -> CosmosResult<Self> {
        let key = auth::decode_key(&config.primary_key)?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("occu-cosmos/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(CosmosError::Network)?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            database: config.database,
            key,
            retry: config.retry,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> CosmosResult<Self> {
        Self::new(CosmosConfig::from_env()?)
    }

    fn collection_link(&self, collection: &str) -> String {
        format!("dbs/{}/colls/{}", self.database, collection)
    }

    fn document_link(&self, collection: &str, doc_id: &str) -> String {
        format!("{}/docs/{}", self.collection_link(collection), doc_id)
    }

    /// Apply the common signed headers for one request.
    fn signed(&self, request: RequestBuilder, verb: &str, resource_link: &str) -> RequestBuilder {
        let date = auth::request_date(chrono::Utc::now());
        let token = auth::authorization(&self.key, verb, "docs", resource_link, &date);

        request
            .header("authorization", token)
            .header("x-ms-date", date)
            .header("x-ms-version", API_VERSION)
    }

    fn partition_key_header(partition_key: &str) -> String {
        // The header carries a JSON array of key values.
        serde_json::json!([partition_key]).to_string()
    }

    // =========================================================================
    // Document Operations
    // =========================================================================

    /// Get a document by ID within a partition. Returns `None` on 404.
    pub async fn get_document(
        &self,
        collection: &str,
        partition_key: &str,
        doc_id: &str,
    ) -> CosmosResult<Option<Value>> {
        let link = self.document_link(collection, doc_id);
        let url = format!("{}/{}", self.endpoint, link);

        self.execute_request("get_document", collection, async {
            let response = self
                .signed(self.http.get(&url), "GET", &link)
                .header(
                    "x-ms-documentdb-partitionkey",
                    Self::partition_key_header(partition_key),
                )
                .send()
                .await?;

            match response.status() {
                StatusCode::OK => {
                    let doc: Value = response.json().await?;
                    Ok(Some(doc))
                }
                StatusCode::NOT_FOUND => Ok(None),
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Create a document within a partition.
    pub async fn create_document(
        &self,
        collection: &str,
        partition_key: &str,
        body: &Value,
    ) -> CosmosResult<Value> {
        let link = self.collection_link(collection);
        let url = format!("{}/{}/docs", self.endpoint, link);

        self.execute_request("create_document", collection, async {
            let response = self
                .signed(self.http.post(&url), "POST", &link)
                .header(
                    "x-ms-documentdb-partitionkey",
                    Self::partition_key_header(partition_key),
                )
                .json(body)
                .send()
                .await?;

            match response.status() {
                StatusCode::OK | StatusCode::CREATED => {
                    let doc: Value = response.json().await?;
                    Ok(doc)
                }
                StatusCode::CONFLICT => Err(CosmosError::AlreadyExists(format!(
                    "{}/{}",
                    collection,
                    body.get("id").and_then(Value::as_str).unwrap_or("?")
                ))),
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    // =========================================================================
    // Query Operations
    // =========================================================================

    /// Run a parameterized SQL query, following continuation tokens until
    /// all pages are drained.
    ///
    /// With a partition key the query stays within one partition; without
    /// one it fans out cross-partition.
    pub async fn query_documents(
        &self,
        collection: &str,
        partition_key: Option<&str>,
        query: &SqlQuery,
    ) -> CosmosResult<Vec<Value>> {
        let link = self.collection_link(collection);
        let url = format!("{}/{}/docs", self.endpoint, link);

        self.execute_request("query_documents", collection, async {
            let mut documents = Vec::new();
            let mut continuation: Option<String> = None;

            loop {
                let mut request = self
                    .signed(self.http.post(&url), "POST", &link)
                    .header("content-type", "application/query+json")
                    .header("x-ms-documentdb-isquery", "True");

                request = match partition_key {
                    Some(pk) => request.header(
                        "x-ms-documentdb-partitionkey",
                        Self::partition_key_header(pk),
                    ),
                    None => request.header("x-ms-documentdb-query-enablecrosspartition", "True"),
                };

                if let Some(token) = &continuation {
                    request = request.header("x-ms-continuation", token);
                }

                let response = request.json(query).send().await?;
                let status = response.status();

                if status != StatusCode::OK {
                    return Err(Self::handle_error_response(status, &url, response).await);
                }

                continuation = response
                    .headers()
                    .get("x-ms-continuation")
                    .and_then(|v| v.to_str().ok())
                    .map(String::from);

                let page: QueryResponse = response.json().await?;
                documents.extend(page.documents);

                if continuation.is_none() {
                    return Ok(documents);
                }
            }
        })
        .await
    }

    /// Execute an operation with the configured retry policy.
    pub async fn with_retry<T, F, Fut>(&self, operation: &str, op: F) -> CosmosResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = CosmosResult<T>>,
    {
        crate::retry::with_retry(&self.retry, operation, op).await
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    /// Execute a request with tracing and metrics.
    async fn execute_request<T, F>(
        &self,
        operation: &str,
        collection: &str,
        fut: F,
    ) -> CosmosResult<T>
    where
        F: std::future::Future<Output = CosmosResult<T>>,
    {
        let span = info_span!("cosmos_request", operation = %operation, collection = %collection);

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, latency_ms);

        result
    }

    async fn handle_error_response(
        status: StatusCode,
        url: &str,
        response: Response,
    ) -> CosmosError {
        let retry_after_ms = response
            .headers()
            .get("x-ms-retry-after-ms")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<f64>().ok())
            .map(|ms| ms.round() as u64);

        let body = response.text().await.unwrap_or_default();
        CosmosError::from_http_status(
            status.as_u16(),
            format!("{} failed: {}", url, body),
            retry_after_ms,
        )
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
#[path = "client_tests.rs"]
mod client_tests;

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_from_env_requires_endpoint() {
        std::env::remove_var("COSMOS_DB_ENDPOINT");
        std::env::set_var("COSMOS_DB_PRIMARY_KEY", "a2V5");
        std::env::set_var("COSMOS_DB_DATABASE_NAME", "counts");
        assert!(CosmosConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn test_config_from_env_defaults() {
        std::env::set_var("COSMOS_DB_ENDPOINT", "https://test.documents.azure.com");
        std::env::set_var("COSMOS_DB_PRIMARY_KEY", "a2V5");
        std::env::set_var("COSMOS_DB_DATABASE_NAME", "counts");
        std::env::remove_var("COSMOS_CONNECT_TIMEOUT_SECS");

        let config = CosmosConfig::from_env().unwrap();
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_resource_links() {
        let client = CosmosClient::new(CosmosConfig {
            endpoint: "https://test.documents.azure.com/".to_string(),
            primary_key: "a2V5".to_string(),
            database: "counts".to_string(),
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            retry: RetryConfig::default(),
        })
        .unwrap();

        assert_eq!(
            client.collection_link("predictions"),
            "dbs/counts/colls/predictions"
        );
        assert_eq!(
            client.document_link("projects", "demo"),
            "dbs/counts/colls/projects/docs/demo"
        );
        // Trailing slash on the endpoint is normalized away.
        assert_eq!(client.endpoint, "https://test.documents.azure.com");
    }

    #[test]
    fn test_partition_key_header_is_json_array() {
        assert_eq!(CosmosClient::partition_key_header("demo"), r#"["demo"]"#);
    }
}
