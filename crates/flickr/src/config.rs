//! Configuration for the Flickr search client
//!
//! Supports environment-based configuration with sensible defaults.

use crate::error::{SearchError, SearchResult};
use pinpix_core::config::{FlickrConfig, DEFAULT_FLICKR_URL};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::time::Duration;

/// Results per page requested from the provider by default
pub const DEFAULT_PER_PAGE: u32 = 21;

/// Largest page size the provider accepts
pub const MAX_PER_PAGE: u32 = 500;

/// Client configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// REST endpoint of the provider
    pub base_url: String,
    /// Provider API key
    pub api_key: String,
    /// Results per page; `None` leaves the provider default (100)
    pub per_page: Option<u32>,
    /// Request timeout
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
            .field("per_page", &self.per_page)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FLICKR_URL.to_string(),
            api_key: String::new(),
            per_page: Some(DEFAULT_PER_PAGE),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `FLICKR_API_KEY`: API key (required)
    /// - `PINPIX_FLICKR_URL`: REST endpoint override
    /// - `PINPIX_TIMEOUT_SECS`: Request timeout in seconds
    /// - `PINPIX_PER_PAGE`: Results per page, `0` omits the parameter
    pub fn from_env() -> SearchResult<Self> {
        let api_key = env::var("FLICKR_API_KEY")
            .map_err(|_| SearchError::config("Missing environment variable: FLICKR_API_KEY"))?;

        let base_url =
            env::var("PINPIX_FLICKR_URL").unwrap_or_else(|_| DEFAULT_FLICKR_URL.to_string());

        let timeout = env::var("PINPIX_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map_or(Duration::from_secs(30), Duration::from_secs);

        let per_page = match env::var("PINPIX_PER_PAGE").ok().and_then(|s| s.parse::<u32>().ok()) {
            Some(0) => None,
            Some(n) => Some(n),
            None => Some(DEFAULT_PER_PAGE),
        };

        let config = Self {
            base_url,
            api_key,
            per_page,
            timeout,
        };
        config.validate()?;
        Ok(config)
    }

    /// Create configuration from the `[flickr]` section of `pinpix.toml`
    ///
    /// An empty `api_key` falls back to `FLICKR_API_KEY`.
    pub fn from_section(section: &FlickrConfig) -> SearchResult<Self> {
        let api_key = if section.api_key.is_empty() {
            env::var("FLICKR_API_KEY").unwrap_or_default()
        } else {
            section.api_key.clone()
        };

        let config = Self {
            base_url: section.base_url.clone(),
            api_key,
            per_page: section.per_page,
            timeout: Duration::from_secs(section.timeout_secs),
        };
        config.validate()?;
        Ok(config)
    }

    /// Builder-style method to set the endpoint
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder-style method to set the API key
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Builder-style method to set the page size
    #[must_use]
    pub fn with_per_page(mut self, per_page: Option<u32>) -> Self {
        self.per_page = per_page;
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> SearchResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(SearchError::config(
                "api_key cannot be empty (set FLICKR_API_KEY or [flickr].api_key)",
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(SearchError::config("base_url must start with http:// or https://"));
        }

        if self.timeout.is_zero() {
            return Err(SearchError::config("timeout cannot be zero"));
        }

        if let Some(per_page) = self.per_page {
            if per_page == 0 || per_page > MAX_PER_PAGE {
                return Err(SearchError::config(format!(
                    "per_page must be between 1 and {MAX_PER_PAGE}, got {per_page}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://api.flickr.com/services/rest");
        assert_eq!(config.per_page, Some(21));
        assert_eq!(config.timeout, Duration::from_secs(30));
        // No key yet
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ClientConfig::default()
            .with_api_key("k")
            .with_base_url("http://127.0.0.1:8080/rest")
            .with_per_page(None)
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.base_url, "http://127.0.0.1:8080/rest");
        assert_eq!(config.per_page, None);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let base = ClientConfig::default().with_api_key("k");
        assert!(base.clone().with_base_url("api.flickr.com").validate().is_err());
        assert!(base.clone().with_timeout(Duration::ZERO).validate().is_err());
        assert!(base.clone().with_per_page(Some(0)).validate().is_err());
        assert!(base.clone().with_per_page(Some(501)).validate().is_err());
        assert!(base.with_per_page(Some(500)).validate().is_ok());
    }

    #[test]
    fn test_from_section() {
        let section = FlickrConfig {
            api_key: "from-file".to_string(),
            per_page: Some(30),
            timeout_secs: 12,
            ..FlickrConfig::default()
        };

        let config = ClientConfig::from_section(&section).unwrap();
        assert_eq!(config.api_key, "from-file");
        assert_eq!(config.per_page, Some(30));
        assert_eq!(config.timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ClientConfig::default().with_api_key("super-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
