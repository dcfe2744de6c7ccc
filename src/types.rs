// Error type shared by the relay handlers

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No file provided")]
    MissingFilePayload,

    #[error("Malformed multipart body: {0}")]
    MalformedUpload(#[from] MultipartError),

    #[error("Upload failed with status {}", .0.as_u16())]
    UpstreamUploadFailed(StatusCode),

    #[error("File not found (upstream status {})", .0.as_u16())]
    UpstreamFileNotFound(StatusCode),

    #[error("Retrieval failed: {0}")]
    RetrievalFailed(String),

    #[error("{0}")]
    Unexpected(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::MissingFilePayload => {
                warn!("Upload rejected: no file field in request");
                (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({ "error": "No file provided" })),
                )
                    .into_response()
            }
            AppError::MalformedUpload(e) => {
                warn!(error = %e, "Upload rejected: malformed multipart body");
                (
                    e.status(),
                    Json(serde_json::json!({
                        "error": "Malformed multipart body",
                        "details": e.body_text()
                    })),
                )
                    .into_response()
            }
            AppError::UpstreamFileNotFound(status) => {
                warn!(status = status.as_u16(), "Upstream has no such file");
                (status, "File not found").into_response()
            }
            AppError::RetrievalFailed(message) => {
                error!(error = %message, "File retrieval failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
            err @ (AppError::UpstreamUploadFailed(_) | AppError::Unexpected(_)) => {
                error!(error = %err, "Upload failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({
                        "error": "Internal Server Error",
                        "details": err.to_string()
                    })),
                )
                    .into_response()
            }
        }
    }
}
