use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Directory avatar references are resolved against
    pub forum_root: PathBuf,
    /// Directory holding `users.json` and `datacache.json`
    pub data_directory: PathBuf,
    pub log_directory: PathBuf,
    pub session: SessionSettings,
}

/// The acting forum session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// User whose avatar an upload event refers to
    pub uid: u32,
    /// One-time key admin actions must echo back as `my_post_key`
    pub post_code: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            forum_root: PathBuf::from("."),
            data_directory: PathBuf::from("data"),
            log_directory: PathBuf::from("logs"),
            session: SessionSettings::default(),
        }
    }
}
