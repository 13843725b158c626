use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const PLUGIN_ID: &str = "webpp";
pub const PLUGIN_NAME: &str = "WebPP";
pub const PLUGIN_AUTHOR: &str = "tedem";
pub const PLUGIN_VERSION: &str = "1.0.0";
pub const PLUGIN_WEBSITE: &str = "https://tedem.dev";
pub const PLUGIN_COMPATIBILITY: &str = "18*";

/// Entry kept in the host data cache under the author's cache title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginCacheEntry {
    pub name: String,
    pub author: String,
    pub version: String,
    /// `1` while the donation banner is shown
    #[serde(default)]
    pub donation: u8,
}

impl PluginCacheEntry {
    pub fn current() -> Self {
        Self {
            name: PLUGIN_NAME.to_string(),
            author: PLUGIN_AUTHOR.to_string(),
            version: PLUGIN_VERSION.to_string(),
            donation: 1,
        }
    }

    pub fn donation_enabled(&self) -> bool {
        self.donation == 1
    }
}

/// All plugins of one author, keyed by plugin id
pub type PluginRegistry = BTreeMap<String, PluginCacheEntry>;

/// Metadata shown on the host's plugin page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub description: String,
    pub website: String,
    pub author: String,
    pub authorsite: String,
    pub version: String,
    pub codename: String,
    pub compatibility: String,
}

impl PluginInfo {
    pub fn with_description(description: String) -> Self {
        Self {
            name: PLUGIN_NAME.to_string(),
            description,
            website: PLUGIN_WEBSITE.to_string(),
            author: PLUGIN_AUTHOR.to_string(),
            authorsite: PLUGIN_WEBSITE.to_string(),
            version: PLUGIN_VERSION.to_string(),
            codename: format!("{}_{}", PLUGIN_AUTHOR, PLUGIN_ID),
            compatibility: PLUGIN_COMPATIBILITY.to_string(),
        }
    }
}
