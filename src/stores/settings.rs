use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::io::Storage;

/// Which backend integration performs extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    System,
    Dify,
}

/// On-disk settings record. One key, JSON-encoded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserSettings {
    #[serde(default)]
    llm_provider: LlmProvider,
}

/// Global user settings. Loaded once at construction; every mutation
/// persists before returning, so a fresh load always observes the last
/// write.
pub struct SettingsStore {
    storage: Arc<dyn Storage>,
    path: String,
    llm_provider: LlmProvider,
}

impl SettingsStore {
    /// Never fails: a missing or corrupt record degrades to defaults.
    pub async fn load(storage: Arc<dyn Storage>, path: &str) -> Self {
        let settings = Self::read_record(storage.as_ref(), path).await;
        Self {
            storage,
            path: path.to_string(),
            llm_provider: settings.llm_provider,
        }
    }

    async fn read_record(storage: &dyn Storage, path: &str) -> UserSettings {
        match storage.exists(path).await {
            Ok(true) => {}
            _ => return UserSettings::default(),
        }

        let bytes = match storage.read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to read settings from {}: {}", path, e);
                return UserSettings::default();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to parse stored settings, using defaults: {}", e);
                UserSettings::default()
            }
        }
    }

    pub fn llm_provider(&self) -> LlmProvider {
        self.llm_provider
    }

    pub async fn set_llm_provider(&mut self, provider: LlmProvider) -> Result<()> {
        self.llm_provider = provider;
        self.persist().await
    }

    pub async fn toggle_llm_provider(&mut self) -> Result<()> {
        let next = match self.llm_provider {
            LlmProvider::System => LlmProvider::Dify,
            LlmProvider::Dify => LlmProvider::System,
        };
        self.set_llm_provider(next).await
    }

    async fn persist(&self) -> Result<()> {
        let record = UserSettings {
            llm_provider: self.llm_provider,
        };
        let content = serde_json::to_string_pretty(&record)?;
        self.storage.write(&self.path, content.as_bytes()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::NativeStorage;

    fn temp_settings_path(dir: &tempfile::TempDir) -> String {
        dir.path().join("user_settings.json").to_string_lossy().to_string()
    }

    #[tokio::test]
    async fn test_roundtrip_through_storage() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = temp_settings_path(&dir);
        let storage: Arc<dyn Storage> = Arc::new(NativeStorage::new());

        let mut store = SettingsStore::load(storage.clone(), &path).await;
        assert_eq!(store.llm_provider(), LlmProvider::System);

        store.set_llm_provider(LlmProvider::Dify).await?;

        // A fresh construction observes the write.
        let reloaded = SettingsStore::load(storage, &path).await;
        assert_eq!(reloaded.llm_provider(), LlmProvider::Dify);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_record_defaults_to_system() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_settings_path(&dir);
        let storage: Arc<dyn Storage> = Arc::new(NativeStorage::new());

        let store = SettingsStore::load(storage, &path).await;
        assert_eq!(store.llm_provider(), LlmProvider::System);
    }

    #[tokio::test]
    async fn test_corrupt_record_defaults_to_system() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = temp_settings_path(&dir);
        let storage: Arc<dyn Storage> = Arc::new(NativeStorage::new());

        storage.write(&path, b"{ not json").await?;
        let store = SettingsStore::load(storage.clone(), &path).await;
        assert_eq!(store.llm_provider(), LlmProvider::System);

        // Unknown enum value is a parse failure, not a crash.
        storage.write(&path, br#"{"llmProvider":"gpt9"}"#).await?;
        let store = SettingsStore::load(storage, &path).await;
        assert_eq!(store.llm_provider(), LlmProvider::System);
        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_flips_and_persists() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = temp_settings_path(&dir);
        let storage: Arc<dyn Storage> = Arc::new(NativeStorage::new());

        let mut store = SettingsStore::load(storage.clone(), &path).await;
        store.toggle_llm_provider().await?;
        assert_eq!(store.llm_provider(), LlmProvider::Dify);
        store.toggle_llm_provider().await?;
        assert_eq!(store.llm_provider(), LlmProvider::System);

        let reloaded = SettingsStore::load(storage, &path).await;
        assert_eq!(reloaded.llm_provider(), LlmProvider::System);
        Ok(())
    }
}
