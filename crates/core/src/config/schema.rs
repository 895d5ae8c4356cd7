//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Flickr REST endpoint used for photo searches
pub const DEFAULT_FLICKR_URL: &str = "https://api.flickr.com/services/rest";

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub flickr: FlickrConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Photo search provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlickrConfig {
    /// API key; `FLICKR_API_KEY` takes over when this is empty
    #[serde(default)]
    pub api_key: String,

    /// REST endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Results per page; omitted from requests when `None`
    #[serde(default = "default_per_page")]
    pub per_page: Option<u32>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FlickrConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            per_page: default_per_page(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_FLICKR_URL.to_string()
}

#[allow(clippy::unnecessary_wraps)]
fn default_per_page() -> Option<u32> {
    Some(21)
}

fn default_timeout_secs() -> u64 {
    30
}

/// Local pin/photo store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the JSON store file, `~` and `$VARS` are expanded
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from(".local/share"))
        .join("pinpix")
        .join("store.json")
        .to_string_lossy()
        .into_owned()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of compact text
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
