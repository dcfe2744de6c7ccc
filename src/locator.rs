//! File locators
//!
//! The upstream store hands back URLs of the form `https://store/upload/f/{id}`.
//! Clients only ever see `{scheme}://{our host}/f/{id}`; the identifier itself
//! is passed through untouched in both directions.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, Uri},
};
use serde_json::Value;

use crate::models::AppState;

/// Path segment that precedes a file identifier, both upstream and locally.
pub const FILE_PATH_MARKER: &str = "/f/";

/// Return the identifier following the last `/f/` in `url`.
pub fn extract_file_id(url: &str) -> Option<&str> {
    url.rsplit_once(FILE_PATH_MARKER).map(|(_, id)| id)
}

/// Scheme and host the client used to reach the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin {
    pub scheme: String,
    pub host: String,
}

impl RequestOrigin {
    pub fn from_request(
        headers: &HeaderMap,
        uri: &Uri,
        trust_proxy: bool,
        fallback_host: &str,
    ) -> Self {
        let forwarded = |name: &str| -> Option<String> {
            if !trust_proxy {
                return None;
            }
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let scheme = forwarded("x-forwarded-proto")
            .or_else(|| uri.scheme_str().map(str::to_string))
            .unwrap_or_else(|| "http".to_string());

        let host = forwarded("x-forwarded-host")
            .or_else(|| {
                headers
                    .get(header::HOST)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            })
            .or_else(|| uri.authority().map(|a| a.to_string()))
            .unwrap_or_else(|| fallback_host.to_string());

        Self { scheme, host }
    }

    /// Public URL for a file served through this relay.
    pub fn file_url(&self, file_id: &str) -> String {
        format!("{}://{}{}{}", self.scheme, self.host, FILE_PATH_MARKER, file_id)
    }
}

impl FromRequestParts<AppState> for RequestOrigin {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let server = &state.config.server;
        let fallback_host = format!("{}:{}", server.host, server.port);
        Ok(Self::from_request(
            &parts.headers,
            &parts.uri,
            server.trust_proxy,
            &fallback_host,
        ))
    }
}

/// Point the `url` field of an upstream upload reply at this relay.
///
/// Returns `false` and leaves the body alone when there is no usable `url`.
pub fn rewrite_upload_response(body: &mut Value, origin: &RequestOrigin) -> bool {
    let Some(url) = body.get_mut("url") else {
        return false;
    };
    let Some(file_id) = url
        .as_str()
        .filter(|s| !s.is_empty())
        .and_then(extract_file_id)
        .map(str::to_string)
    else {
        return false;
    };

    *url = Value::String(origin.file_url(&file_id));
    true
}
