// Upstream file store
//
// The relay owns no storage of its own; every upload and download is
// forwarded to a remote file service over HTTP.

use reqwest::StatusCode;

pub mod upstream_client;

pub use upstream_client::*;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream responded with status {}", .0.as_u16())]
    Status(StatusCode),

    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("upstream returned an unreadable body: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("invalid media type: {0}")]
    InvalidMediaType(String),
}
