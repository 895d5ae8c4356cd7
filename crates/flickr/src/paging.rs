//! Per-location page rotation
//!
//! Each pin cycles through the provider's result pages so repeated requests
//! show fresh photos:
//!
//! - no stored state: fetch page 1
//! - otherwise fetch the stored `next_page`
//! - after a successful fetch of page `p` out of `total`, the next page is
//!   `p + 1`, wrapping to 1 once `p` reaches `total`
//!
//! The first successful fetch always points at page 2, even when the provider
//! reports a single page; the following request then wraps back to 1.

use crate::search::ParsedPhoto;
use crate::store::PhotoStore;
use pinpix_core::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Paging position of one pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    /// Total pages reported by the latest successful fetch
    pub total_pages: u32,
    /// Page the next request will fetch
    pub next_page: u32,
}

impl PageState {
    /// State after the first successful fetch
    #[must_use]
    pub fn first(total_pages: u32) -> Self {
        Self {
            total_pages,
            next_page: 2,
        }
    }

    /// State after a successful fetch of `fetched`, adopting the new total
    #[must_use]
    pub fn advance(self, fetched: u32, total_pages: u32) -> Self {
        let next_page = if fetched < total_pages { fetched + 1 } else { 1 };
        Self {
            total_pages,
            next_page,
        }
    }
}

/// Which page to request next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextPage {
    pub page: u32,
    /// No state stored yet for this pin
    pub is_first_fetch: bool,
}

/// Reads and advances page state through a [`PhotoStore`]
pub struct PageTracker<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for PageTracker<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: PhotoStore + ?Sized> PageTracker<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Page the next request for `key` should fetch
    pub fn next_page_for(&self, key: &str) -> Result<NextPage> {
        Ok(match self.store.load_page_state(key)? {
            Some(state) => NextPage {
                page: state.next_page,
                is_first_fetch: false,
            },
            None => NextPage {
                page: 1,
                is_first_fetch: true,
            },
        })
    }

    /// Record a successful fetch of page `fetched`, storing its photos and the
    /// advanced state together
    pub fn record_fetch(
        &self,
        key: &str,
        fetched: u32,
        total_pages: u32,
        photos: &[ParsedPhoto],
    ) -> Result<PageState> {
        let state = match self.store.load_page_state(key)? {
            Some(previous) => previous.advance(fetched, total_pages),
            None => PageState::first(total_pages),
        };

        self.store.commit_page(key, photos, state)?;
        debug!(
            key,
            fetched,
            total_pages,
            next_page = state.next_page,
            "Page state advanced"
        );
        Ok(state)
    }
}
