use crate::keys::{key_from_public_url, public_url};
use crate::traits::{DeleteOutcome, PhotoStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};

/// S3 photo store
#[derive(Clone)]
pub struct S3PhotoStore {
    store: AmazonS3,
    bucket: String,
    public_base: String,
}

impl S3PhotoStore {
    /// Create a new S3PhotoStore instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    /// * `public_base` - `{storage_base}` of public URLs; defaults to the endpoint,
    ///   or `https://s3.{region}.amazonaws.com` without one
    pub fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        public_base: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http)
                .with_virtual_hosted_style_request(false);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        // Path-style URLs keep the bucket in the path for AWS and S3-compatible providers.
        let public_base = public_base
            .or(endpoint_url)
            .unwrap_or_else(|| format!("https://s3.{}.amazonaws.com", region))
            .trim_end_matches('/')
            .to_string();

        Ok(S3PhotoStore {
            store,
            bucket,
            public_base,
        })
    }
}

#[async_trait]
impl PhotoStore for S3PhotoStore {
    async fn put(&self, key: &str, content_type: &str, data: Vec<u8>) -> StorageResult<String> {
        let size = data.len() as u64;
        let location = Path::from(key.to_string());
        let attributes = Attributes::from_iter([(Attribute::ContentType, content_type.to_string())]);
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self
            .store
            .put_opts(&location, PutPayload::from(Bytes::from(data)), options)
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> StorageResult<DeleteOutcome> {
        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());

        // S3 deletes of missing objects succeed silently, so probe first.
        match self.store.head(&location).await {
            Ok(_) => {}
            Err(ObjectStoreError::NotFound { .. }) => {
                tracing::debug!(bucket = %self.bucket, key = %key, "S3 object already absent");
                return Ok(DeleteOutcome::NotFound);
            }
            Err(e) => return Err(StorageError::BackendError(e.to_string())),
        }

        let result: ObjectResult<_> = self.store.delete(&location).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(DeleteOutcome::Deleted)
    }

    fn public_url(&self, key: &str) -> String {
        public_url(&self.public_base, &self.bucket, key)
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        key_from_public_url(&self.public_base, &self.bucket, url)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
