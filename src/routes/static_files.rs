//! Static File Serving
//!
//! Serves the upload page and any other assets from the configured static
//! directory. Anything not matched by an API route falls through to here.

use std::path::{Path, PathBuf};

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::models::AppState;

/// Create router for serving static files
pub fn router(static_dir: &str) -> Router<AppState> {
    let static_dir = PathBuf::from(static_dir);
    if static_dir.is_dir() {
        info!(path = %static_dir.display(), "Serving static files");
    } else {
        warn!(path = %static_dir.display(), "Static files directory not found");
    }

    Router::new()
        .route("/", get(serve_index))
        .fallback_service(ServeDir::new(static_dir).append_index_html_on_directories(true))
}

async fn serve_index(State(state): State<AppState>) -> Response {
    let index = Path::new(&state.config.static_files.dir).join("index.html");

    match tokio::fs::read_to_string(&index).await {
        Ok(content) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            content,
        )
            .into_response(),
        Err(_) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            FALLBACK_INDEX,
        )
            .into_response(),
    }
}

const FALLBACK_INDEX: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>File Relay</title>
</head>
<body>
    <h1>File Relay</h1>
    <form action="/upload" method="post" enctype="multipart/form-data">
        <input type="file" name="file">
        <button type="submit">Upload</button>
    </form>
    <p>Uploaded files are served from <code>/f/{fileId}</code>.</p>
</body>
</html>"#;
