use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use plugsync::catalog::{BridgeConfig, DEFAULT_BRIDGE_URL, DEFAULT_CATALOG_PATH};
use plugsync::storage::PLUGINS_KEY;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub bridge: BridgeSection,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSection {
    pub base_url: String,
    pub catalog_path: String,
    pub timeout_ms: u64,
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BRIDGE_URL.to_string(),
            catalog_path: DEFAULT_CATALOG_PATH.to_string(),
            timeout_ms: 30000,
        }
    }
}

impl BridgeSection {
    pub fn to_client_config(&self) -> BridgeConfig {
        BridgeConfig {
            base_url: self.base_url.clone(),
            catalog_path: self.catalog_path.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: PathBuf,
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("plugsync"),
            key: PLUGINS_KEY.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            bridge: BridgeSection::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_name = env!("CARGO_PKG_NAME");

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bridge.base_url, "http://localhost:3000");
        assert_eq!(config.bridge.catalog_path, "/mcp/tools");
        assert_eq!(config.bridge.timeout_ms, 30000);
        assert_eq!(config.storage.key, "plugins");
        assert!(config.storage.dir.ends_with("plugsync"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml::from_str("bridge:\n  base_url: http://bridge:9000\n").unwrap();
        assert_eq!(config.bridge.base_url, "http://bridge:9000");
        assert_eq!(config.bridge.catalog_path, "/mcp/tools");
        assert_eq!(config.storage.key, "plugins");
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plugsync.yml");
        fs::write(
            &path,
            "log_level: debug\nstorage:\n  dir: /tmp/plugsync-test\n  key: team\nbridge:\n  timeout_ms: 500\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.storage.dir, PathBuf::from("/tmp/plugsync-test"));
        assert_eq!(config.storage.key, "team");
        assert_eq!(config.bridge.to_client_config().timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let path = PathBuf::from("/nonexistent/plugsync.yml");
        assert!(Config::load(Some(&path)).is_err());
    }
}
