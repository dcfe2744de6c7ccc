use bytes::Bytes;

use crate::config::Config;
use crate::storage::UpstreamClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(config: Config, client: reqwest::Client) -> Self {
        let upstream = UpstreamClient::new(client, config.upstream.clone());
        Self { config, upstream }
    }
}

/// A single file received from a client, held in memory until forwarded.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub data: Bytes,
    pub filename: String,
    pub content_type: String,
}
