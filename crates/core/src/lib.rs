//! Core utilities for pinpix
//!
//! This crate provides shared functionality used by the search client and the CLI:
//!
//! - **Error handling**: Structured errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based configuration with validation
//!
//! # Example
//!
//! ```rust,no_run
//! use pinpix_core::config::Config;
//!
//! let config = Config::load(None).expect("invalid pinpix.toml");
//! println!("Searching {}", config.schema.flickr.base_url);
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod error;

pub use error::{Error, ErrorCode, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema, FlickrConfig, LoggingConfig, StoreConfig};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result};
}
