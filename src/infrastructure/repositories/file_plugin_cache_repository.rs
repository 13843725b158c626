use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::errors::DomainError;
use crate::domain::models::plugin::{PluginCacheEntry, PluginRegistry};
use crate::domain::repositories::plugin_cache_repository::PluginCacheRepository;
use crate::infrastructure::persistence::file_system::{read_json_file_or_default, write_json_file};

type DataCache = BTreeMap<String, PluginRegistry>;

/// Data cache kept in a single JSON file, keyed by cache title
pub struct FilePluginCacheRepository {
    cache_file: PathBuf,
    // Serializes read-modify-write cycles on the file.
    lock: Arc<Mutex<()>>,
}

impl FilePluginCacheRepository {
    pub fn new(cache_file: PathBuf) -> Self {
        Self {
            cache_file,
            lock: Arc::new(Mutex::new(())),
        }
    }

    async fn load(&self) -> Result<DataCache, DomainError> {
        read_json_file_or_default(&self.cache_file).await
    }
}

#[async_trait]
impl PluginCacheRepository for FilePluginCacheRepository {
    async fn read(&self, title: &str) -> Result<PluginRegistry, DomainError> {
        let _guard = self.lock.lock().await;
        let mut cache = self.load().await?;
        Ok(cache.remove(title).unwrap_or_default())
    }

    async fn upsert_entry(
        &self,
        title: &str,
        plugin_id: &str,
        entry: &PluginCacheEntry,
    ) -> Result<(), DomainError> {
        let _guard = self.lock.lock().await;
        let mut cache = self.load().await?;
        cache
            .entry(title.to_string())
            .or_default()
            .insert(plugin_id.to_string(), entry.clone());
        write_json_file(&self.cache_file, &cache).await?;

        tracing::debug!("Stored '{}' in data cache '{}'", plugin_id, title);
        Ok(())
    }

    async fn remove_entry(&self, title: &str, plugin_id: &str) -> Result<(), DomainError> {
        let _guard = self.lock.lock().await;
        let mut cache = self.load().await?;
        let Some(registry) = cache.get_mut(title) else {
            return Ok(());
        };
        if registry.remove(plugin_id).is_none() {
            return Ok(());
        }
        if registry.is_empty() {
            cache.remove(title);
            tracing::debug!("Deleted data cache '{}'", title);
        }

        write_json_file(&self.cache_file, &cache).await
    }

    async fn set_donation(
        &self,
        title: &str,
        plugin_id: &str,
        donation: u8,
    ) -> Result<(), DomainError> {
        let _guard = self.lock.lock().await;
        let mut cache = self.load().await?;
        let entry = cache
            .get_mut(title)
            .and_then(|registry| registry.get_mut(plugin_id))
            .ok_or_else(|| {
                DomainError::NotFound(format!("Plugin '{}' is not in data cache '{}'", plugin_id, title))
            })?;
        entry.donation = donation;

        write_json_file(&self.cache_file, &cache).await
    }
}
