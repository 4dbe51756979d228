// S3 implementation of the object store

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};
use tracing::debug;

use super::{ObjectStore, StoreError};
use crate::config::{StorageConfig, MAX_PRESIGN_TTL_SECS};

pub struct S3Client {
    bucket: Bucket,
    timeout: Duration,
}

impl S3Client {
    /// Build a client for the configured bucket. No network traffic happens
    /// here; bad credentials only show up on the first call.
    pub fn new(config: &StorageConfig) -> anyhow::Result<Self> {
        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config.region.parse()?,
        };

        let credentials = Credentials::new(
            Some(&config.access_key_id),
            Some(&config.secret_access_key),
            None,
            None,
            None,
        )?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials)?;
        if config.endpoint.is_some() {
            bucket = bucket.with_path_style();
        }

        Ok(Self {
            bucket: *bucket,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, S3Error>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
            .map_err(StoreError::from)
    }
}

impl From<S3Error> for StoreError {
    fn from(err: S3Error) -> Self {
        match err {
            S3Error::HttpFailWithBody(status, body) => StoreError::Client {
                status,
                message: body,
            },
            other => StoreError::Unexpected(other.to_string()),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StoreError> {
        let response = self
            .bounded(self.bucket.put_object_with_content_type(key, &body, content_type))
            .await?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StoreError::Client {
                status,
                message: String::from_utf8_lossy(response.as_slice()).into_owned(),
            });
        }

        debug!(key, status, "Stored object");
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        // `Bucket::list` follows continuation tokens, so every page is read.
        let pages = self.bounded(self.bucket.list(prefix.to_string(), None)).await?;

        Ok(pages
            .into_iter()
            .flat_map(|page| page.contents)
            .map(|object| object.key)
            .collect())
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String, StoreError> {
        let expiry_secs = u32::try_from(ttl.as_secs())
            .ok()
            .filter(|secs| (1..=MAX_PRESIGN_TTL_SECS).contains(secs))
            .ok_or_else(|| StoreError::Unexpected(format!("presign expiry {:?} is out of range", ttl)))?;
        self.bounded(self.bucket.presign_get(key, expiry_secs, None)).await
    }
}
