use anyhow::{anyhow, Context, Result};
use axum::http::HeaderValue;
use serde::Deserialize;
use std::env;

/// Storage service every upload and download is relayed to.
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://king454534-hf-cdn.hf.space";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub static_files: StaticConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Empty means any origin is allowed.
    pub cors_allowed_origins: Vec<String>,
    /// Honor `X-Forwarded-Proto` / `X-Forwarded-Host` when building public URLs.
    pub trust_proxy: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaticConfig {
    pub dir: String,
}

impl UpstreamConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Endpoint accepting multipart uploads.
    pub fn upload_url(&self) -> String {
        format!("{}/upload", self.base_url)
    }

    /// Endpoint serving a stored file. The identifier is appended verbatim.
    pub fn file_url(&self, file_id: &str) -> String {
        format!("{}/upload/f/{}", self.base_url, file_id)
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("UPSTREAM_BASE_URL")
            .unwrap_or_else(|| DEFAULT_UPSTREAM_BASE_URL.to_string());
        let parsed = reqwest::Url::parse(&base_url)
            .with_context(|| format!("UPSTREAM_BASE_URL is not a valid URL: {}", base_url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!(
                "UPSTREAM_BASE_URL must use http or https, got {}",
                parsed.scheme()
            ));
        }

        Ok(Self {
            server: ServerConfig {
                port: lookup("PORT")
                    .unwrap_or_else(|| "3000".to_string())
                    .parse()
                    .context("PORT must be a valid port number")?,
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                cors_allowed_origins: parse_origins(&lookup("ALLOWED_ORIGINS").unwrap_or_default())?,
                trust_proxy: lookup("TRUST_PROXY")
                    .unwrap_or_else(|| "false".to_string())
                    .parse()
                    .context("TRUST_PROXY must be true or false")?,
            },
            upstream: UpstreamConfig::new(base_url),
            static_files: StaticConfig {
                dir: lookup("STATIC_DIR").unwrap_or_else(|| "public".to_string()),
            },
        })
    }
}

/// Split a comma-separated origin list, rejecting entries that are not valid header values.
fn parse_origins(raw: &str) -> Result<Vec<String>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("ALLOWED_ORIGINS contains an invalid origin: {:?}", origin))?;
            Ok(origin.to_string())
        })
        .collect()
}
