use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

use super::UpstreamError;
use crate::config::UpstreamConfig;
use crate::models::UploadRequest;

/// HTTP client for the remote file service.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    pub fn new(client: reqwest::Client, config: UpstreamConfig) -> Self {
        Self { client, config }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Forward one file as a multipart `file` field and return the JSON reply.
    pub async fn upload(&self, upload: UploadRequest) -> Result<serde_json::Value, UpstreamError> {
        let url = self.config.upload_url();
        let size = upload.data.len();

        // A client-declared type the upstream cannot be sent is replaced, not rejected.
        let content_type = upload
            .content_type
            .parse::<mime::Mime>()
            .unwrap_or_else(|_| {
                warn!(content_type = %upload.content_type, "Unparseable media type, sending as octet-stream");
                mime::APPLICATION_OCTET_STREAM
            });

        let part = Part::stream_with_length(upload.data, size as u64)
            .file_name(upload.filename)
            .mime_str(content_type.as_ref())
            .map_err(|_| UpstreamError::InvalidMediaType(content_type.to_string()))?;
        let form = Form::new().part("file", part);

        debug!(%url, size, "Forwarding upload to upstream");
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(UpstreamError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }

        response.json().await.map_err(UpstreamError::Decode)
    }

    /// Request a stored file. The body of the returned response is left
    /// unread so callers can stream it.
    pub async fn fetch(&self, file_id: &str) -> Result<reqwest::Response, UpstreamError> {
        let url = self.config.file_url(file_id);
        debug!(%url, "Fetching file from upstream");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(UpstreamError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }

        Ok(response)
    }
}
