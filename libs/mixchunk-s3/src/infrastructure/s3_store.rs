//! S3 Object Store Implementation
//!
//! This module implements the `ObjectStore` trait using AWS S3 as the
//! backend. It handles all S3 operations and converts AWS errors to domain
//! errors.

use std::path::Path;

use aws_sdk_s3::{primitives::ByteStream, Client};
use tracing::{debug, error, info, instrument, warn};

use mixchunk_domain::{ports::ObjectStore, segmentation::error::SegmentationError};

/// S3-based implementation of the ObjectStore port
///
/// This adapter translates the pipeline's storage operations into AWS S3 API
/// calls. It is bucket-agnostic: the orchestration layer names the source and
/// destination buckets per call, so one client serves both ends of the
/// pipeline.
///
/// ## Error Handling
///
/// Fetch-side SDK errors become `SegmentationError::FetchFailure`, publish-side
/// errors become `SegmentationError::PublishFailure`, both with descriptive
/// messages for debugging. No retries are performed; a single attempt per
/// operation matches the invocation contract.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Create a new S3 object store
    ///
    /// # Arguments
    ///
    /// * `client` - Configured AWS S3 client
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use aws_sdk_s3::Client;
    /// use mixchunk_s3::S3ObjectStore;
    ///
    /// # async fn example() {
    /// let config = aws_config::load_from_env().await;
    /// let s3_client = Client::new(&config);
    /// let store = S3ObjectStore::new(s3_client);
    /// # }
    /// ```
    pub fn new(client: Client) -> Self {
        info!("Initializing S3ObjectStore");
        Self { client }
    }
}

impl ObjectStore for S3ObjectStore {
    #[instrument(skip(self), fields(bucket = %bucket, key = %key))]
    fn fetch(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, SegmentationError>> + Send {
        let client = self.client.clone();
        let bucket = bucket.to_string();
        let key = key.to_string();

        async move {
            debug!(key = %key, bucket = %bucket, "Fetching source object from S3");

            match client.get_object().bucket(&bucket).key(&key).send().await {
                Ok(output) => match output.body.collect().await {
                    Ok(data) => {
                        let bytes = data.into_bytes().to_vec();
                        info!(key = %key, size = bytes.len(), "Successfully fetched source object");
                        Ok(bytes)
                    }
                    Err(err) => {
                        error!(key = %key, error = ?err, "Failed to read S3 object body");
                        Err(SegmentationError::fetch_failure(format!(
                            "failed to read S3 object body for key '{}': {}",
                            key, err
                        )))
                    }
                },
                Err(err) => {
                    warn!(key = %key, error = ?err, "Failed to fetch object from S3");
                    Err(SegmentationError::fetch_failure(format!(
                        "S3 get_object failed for key '{}': {}",
                        key, err
                    )))
                }
            }
        }
    }

    #[instrument(skip(self, path), fields(bucket = %bucket, key = %key))]
    fn publish_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> impl std::future::Future<Output = Result<(), SegmentationError>> + Send {
        let client = self.client.clone();
        let bucket = bucket.to_string();
        let key = key.to_string();
        let path = path.to_path_buf();
        let content_type = content_type.to_string();

        async move {
            debug!(key = %key, bucket = %bucket, path = %path.display(), "Uploading chunk to S3");

            // Streamed from disk; chunk files never pass through memory whole.
            let body = ByteStream::from_path(&path).await.map_err(|err| {
                error!(path = %path.display(), error = ?err, "Failed to open chunk file");
                SegmentationError::publish_failure(format!(
                    "failed to open chunk file '{}': {}",
                    path.display(),
                    err
                ))
            })?;

            match client
                .put_object()
                .bucket(&bucket)
                .key(&key)
                .body(body)
                .content_type(&content_type)
                .send()
                .await
            {
                Ok(_) => {
                    info!(key = %key, "Successfully uploaded chunk to S3");
                    Ok(())
                }
                Err(err) => {
                    error!(key = %key, error = ?err, "Failed to upload chunk to S3");
                    Err(SegmentationError::publish_failure(format!(
                        "S3 put_object failed for key '{}': {}",
                        key, err
                    )))
                }
            }
        }
    }
}
