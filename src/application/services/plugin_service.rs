use std::sync::Arc;

use crate::application::errors::ApplicationError;
use crate::domain::errors::DomainError;
use crate::domain::models::plugin::{PLUGIN_AUTHOR, PLUGIN_ID, PluginCacheEntry};
use crate::domain::repositories::plugin_cache_repository::PluginCacheRepository;
use crate::infrastructure::logging::logger;

/// Plugin lifecycle and the settings kept in the host data cache
pub struct PluginService {
    cache_repository: Arc<dyn PluginCacheRepository>,
}

impl PluginService {
    pub fn new(cache_repository: Arc<dyn PluginCacheRepository>) -> Self {
        Self { cache_repository }
    }

    /// Register the plugin in the author's cache title with the donation banner on
    pub async fn install(&self) -> Result<(), ApplicationError> {
        self.cache_repository
            .upsert_entry(PLUGIN_AUTHOR, PLUGIN_ID, &PluginCacheEntry::current())
            .await?;

        logger::info("Plugin installed");
        Ok(())
    }

    pub async fn is_installed(&self) -> Result<bool, ApplicationError> {
        let plugins = self.cache_repository.read(PLUGIN_AUTHOR).await?;
        Ok(plugins.contains_key(PLUGIN_ID))
    }

    /// Remove the plugin entry; the cache title goes away with its last plugin
    pub async fn uninstall(&self) -> Result<(), ApplicationError> {
        self.cache_repository
            .remove_entry(PLUGIN_AUTHOR, PLUGIN_ID)
            .await?;

        logger::info("Plugin uninstalled");
        Ok(())
    }

    pub async fn activate(&self) -> Result<(), ApplicationError> {
        logger::debug("Plugin activated");
        Ok(())
    }

    pub async fn deactivate(&self) -> Result<(), ApplicationError> {
        logger::debug("Plugin deactivated");
        Ok(())
    }

    pub async fn donation_status(&self) -> Result<bool, ApplicationError> {
        let plugins = self.cache_repository.read(PLUGIN_AUTHOR).await?;
        Ok(plugins
            .get(PLUGIN_ID)
            .is_some_and(PluginCacheEntry::donation_enabled))
    }

    pub async fn deactivate_donation(&self) -> Result<(), ApplicationError> {
        self.cache_repository
            .set_donation(PLUGIN_AUTHOR, PLUGIN_ID, 0)
            .await
            .map_err(|error| match error {
                DomainError::NotFound(_) => {
                    ApplicationError::NotFound("Plugin is not installed".to_string())
                }
                other => other.into(),
            })?;

        logger::info("Donation message closed");
        Ok(())
    }
}
