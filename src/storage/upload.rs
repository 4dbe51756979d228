//! Upload facade
//!
//! Takes an inbound file, derives a fresh storage key for it, hands the bytes
//! to the [`ObjectStore`] and returns the object's public URL.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::{ObjectStore, StoreError};

/// A file received from a client, consumed by a single [`Uploader::upload`].
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub content_type: String,
    /// Size as declared by the caller. Not checked against `body`.
    pub size: u64,
    pub body: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredUpload {
    pub key: String,
    pub public_url: String,
    pub content_type: String,
    pub size: u64,
}

#[derive(Clone)]
pub struct Uploader {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    folder: String,
}

impl Uploader {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>, folder: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Store `file` under a newly generated key.
    ///
    /// Nothing is retried and nothing needs rolling back: if the store call
    /// fails, no object was written.
    pub async fn upload(&self, file: UploadedFile) -> Result<StoredUpload, StoreError> {
        let key = storage_key(&self.folder, Uuid::new_v4(), file_extension(&file.original_name));
        info!(original_name = %file.original_name, key = %key, "Uploading file");

        self.store.put(&key, file.body, &file.content_type).await?;

        Ok(StoredUpload {
            public_url: public_url(&self.bucket, &key),
            key,
            content_type: file.content_type,
            size: file.size,
        })
    }
}

/// Everything after the last `.` of `name`, or `""` when there is none.
pub fn file_extension(name: &str) -> &str {
    name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("")
}

/// `{folder}/{id}.{extension}`. The separating period is kept even when the
/// extension is empty.
pub fn storage_key(folder: &str, id: Uuid, extension: &str) -> String {
    format!("{}/{}.{}", folder, id, extension)
}

pub fn public_url(bucket: &str, key: &str) -> String {
    format!("https://{}.s3.amazonaws.com/{}", bucket, key)
}
