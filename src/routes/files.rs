use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info};

use crate::models::{AppState, ImageListResponse, PresignParams, PresignedUrlResponse, UploadResponse};
use crate::storage::{StoreError, UploadedFile};
use crate::types::{AppError, AppResult};

/// Multipart field carrying the file.
const FILE_FIELD: &str = "file";

pub fn router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.server.max_upload_bytes);

    Router::new()
        .route("/api/upload", post(upload_file).layer(upload_limit))
        .route("/api/list-images", get(list_images))
        .route("/generate-presigned-url", get(presigned_url))
        .with_state(state)
}

async fn upload_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let file = read_file_field(multipart).await?;
    info!(
        original_name = %file.original_name,
        content_type = %file.content_type,
        size = file.size,
        "File upload request received"
    );

    let stored = state.uploader.upload(file).await.map_err(upload_failure)?;
    Ok(Json(stored.into()))
}

async fn read_file_field(mut multipart: Multipart) -> AppResult<UploadedFile> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM.essence_str())
            .to_string();
        let body = field.bytes().await?;

        return Ok(UploadedFile {
            original_name,
            content_type,
            size: body.len() as u64,
            body,
        });
    }

    Err(AppError::InvalidRequest(format!(
        "Missing multipart field '{}'",
        FILE_FIELD
    )))
}

fn upload_failure(err: StoreError) -> AppError {
    match err {
        StoreError::Client { .. } => {
            error!("S3 client error: {}", err);
            AppError::Internal("S3 upload failed")
        }
        _ => {
            error!("Error uploading file: {}", err);
            AppError::Internal("File upload failed")
        }
    }
}

/// Keys under the upload folder only.
async fn list_images(State(state): State<AppState>) -> AppResult<Json<ImageListResponse>> {
    let prefix = format!("{}/", state.uploader.folder());

    let images = state.store.list(&prefix).await.map_err(|e| {
        error!("Error listing images: {}", e);
        AppError::Internal("Listing images failed")
    })?;

    info!(count = images.len(), prefix = %prefix, "Found images in S3 bucket");
    Ok(Json(ImageListResponse { images }))
}

/// Signs a GET for any key; existence is not checked.
async fn presigned_url(
    State(state): State<AppState>,
    Query(params): Query<PresignParams>,
) -> AppResult<Json<PresignedUrlResponse>> {
    let ttl = Duration::from_secs(u64::from(state.config.storage.presign_ttl_secs));

    let url = state
        .store
        .presign_get(&params.filename, ttl)
        .await
        .map_err(|e| {
            error!(key = %params.filename, "Error generating presigned URL: {}", e);
            AppError::Internal("Presigned URL generation failed")
        })?;

    Ok(Json(PresignedUrlResponse { url }))
}
