// src/registry/http.rs

//! HTTP registry client
//!
//! Queries a JSON registry endpoint of the form
//! `{base_url}/v1/packages/{name}`. A 404 means the package does not exist;
//! any other non-success status is a lookup failure.

use super::{PackageMetadata, RegistryClient};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

/// Default timeout for a single registry request (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Registry client using reqwest
pub struct HttpRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRegistry {
    /// Create a new HTTP registry client with the default timeout
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create with a custom per-request timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::InitError("Registry URL is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("portcheck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn package_url(&self, name: &str) -> String {
        format!(
            "{}/v1/packages/{}",
            self.base_url,
            urlencoding::encode(name.trim())
        )
    }
}

#[async_trait]
impl RegistryClient for HttpRegistry {
    async fn lookup(&self, name: &str) -> Result<Option<PackageMetadata>> {
        let url = self.package_url(name);
        debug!("Looking up package via HTTP: {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            Error::DownloadError(format!("Failed to fetch metadata for {}: {e}", name))
        })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(Error::DownloadError(format!(
                "Registry returned HTTP {} for {}",
                response.status(),
                name
            )));
        }

        let metadata: PackageMetadata = response.json().await.map_err(|e| {
            Error::ParseError(format!("Failed to parse metadata for {}: {e}", name))
        })?;

        Ok(Some(metadata))
    }

    fn name(&self) -> &str {
        &self.base_url
    }
}
