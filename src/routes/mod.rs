//! HTTP Routes
//!
//! - `POST /upload` - forward a file to the upstream store
//! - `GET /f/{file_id}` - stream a stored file back through the relay
//! - `/` - Static file serving (upload page)

pub mod files;
pub mod static_files;
pub mod upload;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::apply_cors;
use crate::models::AppState;

/// Create the main application router
///
/// Relay routes take precedence over static files.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let router = Router::new()
        .merge(upload::router())
        .merge(files::router())
        .merge(static_files::router(&state.config.static_files.dir))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    apply_cors(router, &state.config.server.cors_allowed_origins).with_state(state)
}
