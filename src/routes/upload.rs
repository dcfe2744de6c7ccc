//! `POST /upload` - accept one file and forward it to the upstream store.

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use tracing::{info, warn};

use crate::locator::{rewrite_upload_response, RequestOrigin};
use crate::models::{AppState, UploadRequest};
use crate::storage::UpstreamError;
use crate::types::{AppError, AppResult};

/// Multipart field carrying the file.
const FILE_FIELD: &str = "file";

pub fn router() -> Router<AppState> {
    // Uploads are deliberately unbounded.
    Router::new().route(
        "/upload",
        post(upload_file).layer(DefaultBodyLimit::disable()),
    )
}

async fn upload_file(
    State(state): State<AppState>,
    origin: RequestOrigin,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<serde_json::Value>> {
    let multipart = multipart.map_err(|rejection| {
        warn!(error = %rejection, "Upload request is not multipart");
        AppError::MissingFilePayload
    })?;

    let upload = read_file_field(multipart)
        .await?
        .ok_or(AppError::MissingFilePayload)?;

    info!(
        filename = %upload.filename,
        content_type = %upload.content_type,
        size = upload.data.len(),
        "File upload request received"
    );

    let mut body = state.upstream.upload(upload).await.map_err(|e| match e {
        UpstreamError::Status(status) => AppError::UpstreamUploadFailed(status),
        other => AppError::Unexpected(other.to_string()),
    })?;

    if rewrite_upload_response(&mut body, &origin) {
        info!(url = %body["url"], "Rewrote upstream file URL");
    }

    Ok(Json(body))
}

/// Buffer the first `file` field that carries a filename. Other fields are skipped.
async fn read_file_field(mut multipart: Multipart) -> AppResult<Option<UploadRequest>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM.as_ref())
            .to_string();
        let data = field.bytes().await?;

        return Ok(Some(UploadRequest {
            data,
            filename,
            content_type,
        }));
    }

    Ok(None)
}
