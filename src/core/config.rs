use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Client-side configuration. An optional `config.yml` next to the binary
/// overrides the defaults; the `API_BASE_URL` environment variable wins
/// over both.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Downstream generation can take minutes; the ceiling is generous.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Where the durable user settings record lives.
    #[serde(default = "default_settings_path")]
    pub settings_path: String,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_timeout_seconds() -> u64 {
    120
}

fn default_settings_path() -> String {
    "user_settings.json".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            settings_path: default_settings_path(),
        }
    }
}

impl ClientConfig {
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file(Path::new("config.yml"))?;

        if let Ok(base_url) = std::env::var("API_BASE_URL") {
            if !base_url.is_empty() {
                config.base_url = base_url;
            }
        }

        Ok(config)
    }

    fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config.yml")?;
        let config: ClientConfig =
            serde_yaml_ng::from_str(&content).context("Failed to parse config.yml")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000/api/v1");
        assert_eq!(config.timeout_seconds, 120);
        assert_eq!(config.settings_path, "user_settings.json");
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: ClientConfig =
            serde_yaml_ng::from_str("base_url: http://api.example.com/api/v1\n").unwrap();
        assert_eq!(config.base_url, "http://api.example.com/api/v1");
        assert_eq!(config.timeout_seconds, 120);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load_file(&dir.path().join("config.yml")).unwrap();
        assert_eq!(config.base_url, default_base_url());
    }
}
