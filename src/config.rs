//! Application configuration management.
//!
//! Loading and saving the client configuration: the server base URL, the
//! cache TTL, and where durable storage lives on disk.
//!
//! Configuration is stored at `~/.config/groupcal/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_TTL_MS;

/// Application name used for config/data directory paths
const APP_NAME: &str = "groupcal";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default server API base URL
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000/api";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: i64,
    /// Overrides the platform data directory when set.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_cache_ttl_ms() -> i64 {
    DEFAULT_TTL_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            cache_ttl_ms: default_cache_ttl_ms(),
            data_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory backing the file storage substrate.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config: Config = serde_json::from_str("{}").expect("empty config parses");
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.cache_ttl_ms, DEFAULT_TTL_MS);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn explicit_values_win() {
        let config: Config = serde_json::from_str(
            r#"{"server_url": "https://cal.example.com/api", "cache_ttl_ms": 60000}"#,
        )
        .expect("config parses");
        assert_eq!(config.server_url, "https://cal.example.com/api");
        assert_eq!(config.cache_ttl_ms, 60_000);
    }
}
