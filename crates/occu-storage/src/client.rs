//! Blob client implementation.

use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::Client;
use tracing::debug;

use crate::error::{StorageError, StorageResult};

/// Configuration for the blob client.
#[derive(Debug, Clone)]
pub struct BlobConfig {
    /// S3-compatible endpoint URL
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket holding camera snapshot images
    pub bucket_name: String,
    /// Region (often "auto" for S3-compatible stores)
    pub region: String,
}

impl BlobConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: std::env::var("BLOB_ENDPOINT_URL")
                .map_err(|_| StorageError::config_error("BLOB_ENDPOINT_URL not set"))?,
            access_key_id: std::env::var("BLOB_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config_error("BLOB_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("BLOB_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("BLOB_SECRET_ACCESS_KEY not set"))?,
            bucket_name: std::env::var("BLOB_BUCKET_NAME")
                .map_err(|_| StorageError::config_error("BLOB_BUCKET_NAME not set"))?,
            region: std::env::var("BLOB_REGION").unwrap_or_else(|_| "auto".to_string()),
        })
    }
}

/// Blob store client for the images bucket.
#[derive(Clone)]
pub struct BlobClient {
    client: Client,
    bucket: String,
}

impl BlobClient {
    /// Create a new blob client from configuration.
    pub fn new(config: BlobConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "blob",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket_name,
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self::new(BlobConfig::from_env()?))
    }

    /// Download an object as bytes with its content type.
    ///
    /// Falls back to extension-based inference when the stored content type
    /// is absent or the generic binary default.
    pub async fn get_object_bytes(&self, key: &str) -> StorageResult<(Vec<u8>, String)> {
        debug!("Downloading blob {}", key);

        let response = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                if err.as_service_error().is_some_and(|e| e.is_no_such_key()) {
                    return Err(StorageError::not_found(key));
                }
                return Err(StorageError::download_failed(err.to_string()));
            }
        };

        let content_type = match response.content_type() {
            Some(ct) if !ct.is_empty() && ct != "application/octet-stream" => ct.to_string(),
            _ => infer_content_type(key).to_string(),
        };

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::download_failed(e.to_string()))?
            .into_bytes()
            .to_vec();

        Ok((bytes, content_type))
    }

    /// Verify the bucket is reachable (readiness probe).
    pub async fn check_connectivity(&self) -> StorageResult<()> {
        tokio::time::timeout(
            Duration::from_secs(5),
            self.client.head_bucket().bucket(&self.bucket).send(),
        )
        .await
        .map_err(|_| StorageError::ConnectivityFailed("head_bucket timed out".to_string()))?
        .map_err(|e| StorageError::ConnectivityFailed(e.to_string()))?;

        Ok(())
    }
}

/// Infer a content type from the file extension.
fn infer_content_type(filename: &str) -> &'static str {
    let lower = filename.to_lowercase();

    if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".gif") {
        "image/gif"
    } else if lower.ends_with(".bmp") {
        "image/bmp"
    } else if lower.ends_with(".svg") {
        "image/svg+xml"
    } else if lower.ends_with(".tiff") || lower.ends_with(".tif") {
        "image/tiff"
    } else if lower.ends_with(".webp") {
        "image/webp"
    } else {
        "application/octet-stream"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_content_type_common_images() {
        assert_eq!(infer_content_type("shot.jpg"), "image/jpeg");
        assert_eq!(infer_content_type("SHOT.JPEG"), "image/jpeg");
        assert_eq!(infer_content_type("map.png"), "image/png");
        assert_eq!(infer_content_type("anim.webp"), "image/webp");
    }

    #[test]
    fn test_infer_content_type_unknown_is_binary() {
        assert_eq!(infer_content_type("report.pdf"), "application/octet-stream");
        assert_eq!(infer_content_type("noextension"), "application/octet-stream");
    }
}
