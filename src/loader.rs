// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Gallery loader: live scanner first, static fallback data second

use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::LoaderConfig;
use crate::manifest::{parse_fallback_script, read_fallback_file, GalleryManifest};
use crate::{Result, VitrineError};

/// Where a loaded manifest came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestSource {
    Scanner,
    Fallback,
    /// Both failed; the manifest is empty
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub manifest: GalleryManifest,
    pub source: ManifestSource,
}

/// Provider of the pre-baked manifest
#[async_trait]
pub trait FallbackSource: Send + Sync {
    /// Human-readable location, for logs
    fn describe(&self) -> String;

    async fn load(&self) -> Result<GalleryManifest>;
}

/// Fallback data file fetched over HTTP, never from a stale cache
pub struct HttpFallback {
    client: Client,
    url: String,
}

impl HttpFallback {
    pub fn new(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }

    /// URL with a `v=<stamp>` query parameter appended
    pub fn cache_busted_url(&self, stamp: i64) -> String {
        let sep = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}v={}", self.url, sep, stamp)
    }
}

#[async_trait]
impl FallbackSource for HttpFallback {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn load(&self) -> Result<GalleryManifest> {
        let url = self.cache_busted_url(chrono::Utc::now().timestamp_millis());
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(VitrineError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        parse_fallback_script(&body)
    }
}

/// Fallback data file read from disk
pub struct FileFallback {
    path: PathBuf,
}

impl FileFallback {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FallbackSource for FileFallback {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<GalleryManifest> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_fallback_file(&path))
            .await
            .map_err(|e| VitrineError::Fallback(format!("fallback read task failed: {}", e)))?
    }
}

/// Obtains the manifest for a page
pub struct GalleryLoader {
    client: Client,
    scanner_url: String,
    fallback: Box<dyn FallbackSource>,
}

impl GalleryLoader {
    pub fn new(client: Client, scanner_url: &str, fallback: Box<dyn FallbackSource>) -> Self {
        Self {
            client,
            scanner_url: scanner_url.to_string(),
            fallback,
        }
    }

    /// Loader with an HTTP fallback, both taken from config
    pub fn from_config(config: &LoaderConfig) -> Result<Self> {
        let client = build_client(config.timeout_secs)?;
        let fallback = Box::new(HttpFallback::new(client.clone(), &config.fallback_url));
        Ok(Self::new(client, &config.scanner_url, fallback))
    }

    /// Fetch from the live scanner only
    pub async fn fetch_scanner(&self) -> Result<GalleryManifest> {
        let response = self.client.get(&self.scanner_url).send().await?;

        if !response.status().is_success() {
            return Err(VitrineError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }

    /// Scanner first; on any failure, the fallback exactly once.
    ///
    /// Never fails: if both sources fail the outcome is an empty manifest.
    pub async fn load(&self) -> LoadOutcome {
        match self.fetch_scanner().await {
            Ok(manifest) => {
                info!("Gallery loaded via scanner at {}", self.scanner_url);
                return LoadOutcome {
                    manifest,
                    source: ManifestSource::Scanner,
                };
            }
            Err(e) => {
                warn!(
                    "Scanner at {} failed ({}), falling back to static data",
                    self.scanner_url, e
                );
            }
        }

        match self.fallback.load().await {
            Ok(manifest) => {
                info!("Gallery loaded from fallback {}", self.fallback.describe());
                LoadOutcome {
                    manifest,
                    source: ManifestSource::Fallback,
                }
            }
            Err(e) => {
                error!("Failed to load fallback {}: {}", self.fallback.describe(), e);
                LoadOutcome {
                    manifest: GalleryManifest::new(),
                    source: ManifestSource::Unavailable,
                }
            }
        }
    }
}

/// HTTP client with a request timeout
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}
