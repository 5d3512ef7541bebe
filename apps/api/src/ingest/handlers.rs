//! Axum route handlers for document ingestion.

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use crate::errors::AppError;
use crate::ingest::{process_upload, ExtractedDocument};

/// Multipart field carrying the upload.
pub const FILE_FIELD: &str = "file";

/// POST /api/v1/documents/extract
pub async fn handle_extract(
    mut multipart: Multipart,
) -> Result<Json<ExtractedDocument>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("Uploaded file has no filename".to_string()))?;
        let bytes = field.bytes().await.map_err(multipart_error)?;

        let document = tokio::task::spawn_blocking(move || process_upload(&filename, &bytes))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in extraction: {e}")))??;

        info!(
            "Extracted {} chars from {} ({:?})",
            document.char_count, document.filename, document.file_type
        );
        return Ok(Json(document));
    }

    Err(AppError::Validation(format!(
        "Missing multipart field '{FILE_FIELD}'"
    )))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("File size exceeds 10MB limit".to_string())
    } else {
        AppError::Validation(err.body_text())
    }
}
