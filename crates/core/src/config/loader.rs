//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<String>,
}

impl Config {
    /// Load configuration from a file path or use defaults
    ///
    /// An explicit path must exist. Without one, the standard locations are
    /// searched and defaults are used when none is present.
    pub fn load(path: Option<&str>) -> Result<Self> {
        if let Some(p) = path {
            if !Path::new(p).exists() {
                return Err(Error::config_not_found(p));
            }
        }

        let config_path = path.map(String::from).or_else(find_config_file);

        let schema = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        let config = Self {
            schema,
            path: config_path,
        };
        config.validate()?;
        Ok(config)
    }

    /// Store file path with `~` and environment variables expanded
    pub fn store_path(&self) -> Result<PathBuf> {
        let raw = &self.schema.store.path;
        let expanded = shellexpand::full(raw)
            .map_err(|e| Error::config(format!("Cannot expand store path {raw}: {e}")))?;
        Ok(PathBuf::from(expanded.as_ref()))
    }

    /// Check values that serde defaults cannot guard
    pub fn validate(&self) -> Result<()> {
        let flickr = &self.schema.flickr;

        if !flickr.base_url.starts_with("http://") && !flickr.base_url.starts_with("https://") {
            return Err(Error::config_invalid(format!(
                "flickr.base_url must start with http:// or https://, got {:?}",
                flickr.base_url
            )));
        }

        if flickr.timeout_secs == 0 {
            return Err(Error::config_invalid("flickr.timeout_secs cannot be zero"));
        }

        if let Some(per_page) = flickr.per_page {
            if per_page == 0 || per_page > 500 {
                return Err(Error::config_invalid(format!(
                    "flickr.per_page must be between 1 and 500, got {per_page}"
                )));
            }
        }

        if self.schema.store.path.trim().is_empty() {
            return Err(Error::config_invalid("store.path cannot be empty"));
        }

        Ok(())
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<String> {
    let candidates = ["pinpix.toml", ".pinpix.toml", ".config/pinpix.toml"];

    candidates
        .into_iter()
        .find(|candidate| Path::new(candidate).exists())
        .map(String::from)
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &str) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::config(format!("Failed to read config file {path}: {e}")))?;

    toml::from_str(&content).map_err(|e| {
        Error::from(e).with_context(format!("While parsing config file {path}"))
    })
}
