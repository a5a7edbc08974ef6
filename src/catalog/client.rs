//! Catalog transports
//!
//! `BridgeClient` pulls the catalog over HTTP. `FileCatalog` and `StaticCatalog` serve
//! offline runs and tests through the same trait.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;

use crate::domain::SourceCatalog;
use crate::error::{Result, SyncError};

/// Default bridge base URL
pub const DEFAULT_BRIDGE_URL: &str = "http://localhost:3000";

/// Default catalog path on the bridge
pub const DEFAULT_CATALOG_PATH: &str = "/mcp/tools";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Anything that can hand over a source catalog
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the full catalog
    async fn fetch_catalog(&self) -> Result<SourceCatalog>;

    /// Where the catalog comes from, for logs and messages
    fn describe(&self) -> String;
}

/// Join a base URL and a path with exactly one slash between them
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Configuration for the bridge client
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub base_url: String,
    pub catalog_path: String,
    pub timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BRIDGE_URL.to_string(),
            catalog_path: DEFAULT_CATALOG_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl BridgeConfig {
    /// Create a config for a specific bridge
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// HTTP client for the bridge catalog endpoint
pub struct BridgeClient {
    client: Client,
    config: BridgeConfig,
}

impl BridgeClient {
    /// Create a new bridge client
    pub fn new(config: BridgeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SyncError::Fetch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Base URL that generated wrappers should call
    pub fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Full URL of the catalog endpoint
    pub fn catalog_url(&self) -> String {
        join_url(&self.config.base_url, &self.config.catalog_path)
    }
}

#[async_trait]
impl CatalogSource for BridgeClient {
    async fn fetch_catalog(&self) -> Result<SourceCatalog> {
        let url = self.catalog_url();
        debug!("Fetching catalog from {}", url);

        let response = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| SyncError::Fetch(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Fetch(format!("Bridge returned {} for {}", status, url)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SyncError::Fetch(format!("Failed to read response body: {}", e)))?;

        let catalog = SourceCatalog::from_json(&body)?;
        info!("Fetched catalog with {} sources from {}", catalog.len(), url);
        Ok(catalog)
    }

    fn describe(&self) -> String {
        self.catalog_url()
    }
}

impl std::fmt::Debug for BridgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeClient")
            .field("base_url", &self.config.base_url)
            .field("catalog_path", &self.config.catalog_path)
            .finish()
    }
}

/// Catalog read from a JSON file on disk
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalog {
    async fn fetch_catalog(&self) -> Result<SourceCatalog> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            SyncError::Fetch(format!("Failed to read catalog file {}: {}", self.path.display(), e))
        })?;
        SourceCatalog::from_json(&text)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Fixed in-memory catalog
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    catalog: SourceCatalog,
}

impl StaticCatalog {
    pub fn new(catalog: SourceCatalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch_catalog(&self) -> Result<SourceCatalog> {
        Ok(self.catalog.clone())
    }

    fn describe(&self) -> String {
        "static catalog".to_string()
    }
}
