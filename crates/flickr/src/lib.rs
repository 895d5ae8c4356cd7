//! Flickr geo photo search with per-location paging
//!
//! This crate finds photos taken around a pinned map location and rotates
//! through the provider's result pages on every request.
//!
//! # Features
//!
//! - **Bounding-box search**: `flickr.photos.search` over a ±1° box around a pin
//! - **Tolerant parsing**: incomplete photo records are dropped, the rest kept in order
//! - **Page rotation**: each request fetches the next page, wrapping after the last
//! - **Per-location serialization**: a new request supersedes an older one for the same pin
//! - **Request correlation**: every HTTP request carries a unique `X-Request-ID`
//!
//! # Example
//!
//! ```rust,no_run
//! use pinpix_flickr::{ClientConfig, FlickrClient, MemoryStore, PhotoAlbum};
//! use pinpix_geo::Coordinate;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FlickrClient::with_config(ClientConfig::from_env()?)?;
//!     let album = PhotoAlbum::new(client, Arc::new(MemoryStore::new()));
//!
//!     album.add_pin("sf", Coordinate::new(37.7749, -122.4194))?;
//!     let update = album.request_photos("sf").await?;
//!     println!("page {} of {}: {} photos", update.page, update.state.total_pages, update.photos.len());
//!
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod album;
pub mod client;
pub mod config;
pub mod error;
pub mod paging;
pub mod search;
pub mod store;

pub use album::{AlbumUpdate, PhotoAlbum};
pub use client::{FlickrClient, PhotoSearch};
pub use config::ClientConfig;
pub use error::{ErrorKind, SearchError, SearchResult};
pub use paging::{NextPage, PageState, PageTracker};
pub use search::{parse_search_response, ParsedPhoto, SearchPage, SearchParams};
pub use store::{JsonFileStore, MemoryStore, PhotoStore, PinRecord};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::album::{AlbumUpdate, PhotoAlbum};
    pub use crate::client::{FlickrClient, PhotoSearch};
    pub use crate::config::ClientConfig;
    pub use crate::error::{SearchError, SearchResult};
    pub use crate::store::{JsonFileStore, MemoryStore, PhotoStore};
}
