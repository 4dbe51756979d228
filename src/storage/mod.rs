//! Object storage
//!
//! [`ObjectStore`] is the narrow interface the HTTP layer talks to. The
//! production implementation is [`S3Client`]; tests substitute in-memory
//! stores. [`Uploader`] sits on top and turns an inbound file into a stored
//! object with a generated key and a public URL.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod s3_client;
pub mod upload;

pub use s3_client::S3Client;
pub use upload::{StoredUpload, UploadedFile, Uploader};

/// Errors reported by an [`ObjectStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store answered, but rejected the request.
    #[error("object store client error (status {status}): {message}")]
    Client { status: u16, message: String },

    #[error("object store call timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected storage error: {0}")]
    Unexpected(String),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` under `key`, replacing any existing object.
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StoreError>;

    /// Every key under `prefix`, in the order the store returns them.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// A signed GET URL for `key` valid for `ttl`. The object need not exist.
    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String, StoreError>;
}
