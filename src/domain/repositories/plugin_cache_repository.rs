use async_trait::async_trait;

use crate::domain::errors::DomainError;
use crate::domain::models::plugin::{PluginCacheEntry, PluginRegistry};

/// Host data cache, one registry per cache title
///
/// Each write is a single read-modify-write of the stored cache.
#[async_trait]
pub trait PluginCacheRepository: Send + Sync {
    /// Read a cache title; a missing title reads as an empty registry
    async fn read(&self, title: &str) -> Result<PluginRegistry, DomainError>;

    async fn upsert_entry(
        &self,
        title: &str,
        plugin_id: &str,
        entry: &PluginCacheEntry,
    ) -> Result<(), DomainError>;

    /// Remove one plugin; the title is dropped with its last plugin
    async fn remove_entry(&self, title: &str, plugin_id: &str) -> Result<(), DomainError>;

    /// Fails with `NotFound` when the plugin has no entry
    async fn set_donation(
        &self,
        title: &str,
        plugin_id: &str,
        donation: u8,
    ) -> Result<(), DomainError>;
}
