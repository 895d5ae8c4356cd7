//! Configuration loading and schema definitions
//!
//! A single `pinpix.toml` covers the search provider, the local store and logging.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
