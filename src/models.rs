use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::db::Database;
use crate::storage::{ObjectStore, StoredUpload, Uploader};

/// Handles shared by every request. Clients are built once in `main` and
/// passed in; nothing here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub database: Arc<dyn Database>,
    pub store: Arc<dyn ObjectStore>,
    pub uploader: Uploader,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, database: Arc<dyn Database>, store: Arc<dyn ObjectStore>) -> Self {
        let uploader = Uploader::new(
            store.clone(),
            config.storage.bucket.clone(),
            config.storage.upload_folder.clone(),
        );

        Self {
            config: Arc::new(config),
            database,
            store,
            uploader,
            started_at: Instant::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub status: String,
    /// Seconds since the process started.
    pub timestamp: f64,
    pub origin: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseTimeResponse {
    #[serde(rename = "Date")]
    pub date: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
}

/// `/api/data` answers 200 either way; failures carry an `error` field.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DataResponse {
    Time(DatabaseTimeResponse),
    Error(ErrorPayload),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    /// Storage key the file was written under.
    pub filename: String,
    pub file_url: String,
    pub content_type: String,
    pub size: u64,
}

impl From<StoredUpload> for UploadResponse {
    fn from(stored: StoredUpload) -> Self {
        Self {
            message: "File uploaded successfully".to_string(),
            filename: stored.key,
            file_url: stored.public_url,
            content_type: stored.content_type,
            size: stored.size,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageListResponse {
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PresignParams {
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresignedUrlResponse {
    pub url: String,
}
