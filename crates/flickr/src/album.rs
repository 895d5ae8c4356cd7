//! Pinned locations and their rotating photo pages
//!
//! [`PhotoAlbum::request_photos`] runs the full cycle for one pin: pick the
//! next page, search around the pin, then replace the stored photos and
//! advance the page state in a single store write.
//!
//! Requests for the same pin never overlap. Each request takes a per-pin
//! generation number; starting a new request (or calling
//! [`PhotoAlbum::cancel`]) bumps it, and any older request still waiting for
//! the pin or for the provider gives up with [`SearchError::Superseded`]
//! without touching the store. Stored photos are only replaced after a
//! successful search, so a failed request leaves the previous page in place.

use crate::client::PhotoSearch;
use crate::error::{SearchError, SearchResult};
use crate::paging::{PageState, PageTracker};
use crate::search::ParsedPhoto;
use crate::store::PhotoStore;
use pinpix_core::{Error, ErrorCode};
use pinpix_geo::Coordinate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

/// Result of a completed photo request
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumUpdate {
    pub key: String,
    /// Page that was fetched
    pub page: u32,
    /// Photos now stored for the pin
    pub photos: Vec<ParsedPhoto>,
    /// Paging state after this fetch
    pub state: PageState,
}

struct LocationSlot {
    generation: watch::Sender<u64>,
    lock: AsyncMutex<()>,
}

impl LocationSlot {
    fn new() -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            generation,
            lock: AsyncMutex::new(()),
        }
    }

    /// Start a new generation and return its number
    fn bump(&self) -> u64 {
        let mut current = 0;
        self.generation.send_modify(|g| {
            *g = g.wrapping_add(1);
            current = *g;
        });
        current
    }
}

/// Resolves once a newer generation than `mine` has started
async fn superseded(mut generation: watch::Receiver<u64>, mine: u64) {
    if generation.wait_for(|g| *g != mine).await.is_err() {
        // Sender gone: nothing can supersede us any more
        std::future::pending::<()>().await;
    }
}

fn superseded_error(key: &str, generation: u64) -> SearchError {
    debug!(key, generation, "Request superseded");
    SearchError::Superseded(key.to_string())
}

/// Pins, their photos and the searches that refresh them
pub struct PhotoAlbum<C, S: ?Sized> {
    client: C,
    store: Arc<S>,
    tracker: PageTracker<S>,
    slots: Mutex<HashMap<String, Arc<LocationSlot>>>,
}

impl<C: PhotoSearch, S: PhotoStore + ?Sized> PhotoAlbum<C, S> {
    pub fn new(client: C, store: Arc<S>) -> Self {
        Self {
            client,
            tracker: PageTracker::new(Arc::clone(&store)),
            store,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Backing store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Search client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Pin a location. Re-pinning an existing key moves it and resets its photos.
    pub fn add_pin(&self, key: &str, coordinate: Coordinate) -> SearchResult<()> {
        self.cancel(key)?;
        self.store.add_pin(key, coordinate)?;
        info!(key, %coordinate, "Pin added");
        Ok(())
    }

    /// Remove a pin, abandoning any request in flight for it
    pub fn remove_pin(&self, key: &str) -> SearchResult<bool> {
        self.cancel(key)?;
        self.lock_slots()?.remove(key);
        let removed = self.store.remove_pin(key)?;
        if removed {
            info!(key, "Pin removed");
        }
        Ok(removed)
    }

    /// Photos currently stored for a pin
    pub fn photos(&self, key: &str) -> SearchResult<Vec<ParsedPhoto>> {
        Ok(self.store.photos(key)?)
    }

    /// Abandon any request in flight for `key`
    pub fn cancel(&self, key: &str) -> SearchResult<()> {
        let slot = self.lock_slots()?.get(key).cloned();
        if let Some(slot) = slot {
            let generation = slot.bump();
            debug!(key, generation, "Pending requests cancelled");
        }
        Ok(())
    }

    /// Fetch the next page of photos for a pin and store them.
    ///
    /// Fails with [`SearchError::Superseded`] if another request for the same
    /// pin starts (or the pin is cancelled) before this one completes.
    #[instrument(skip(self))]
    pub async fn request_photos(&self, key: &str) -> SearchResult<AlbumUpdate> {
        // Unknown keys never get a slot
        self.store.fetch_coordinate(key)?;
        let slot = self.slot(key)?;
        let mine = slot.bump();
        let superseded = superseded(slot.generation.subscribe(), mine);
        tokio::pin!(superseded);

        let _guard = tokio::select! {
            biased;
            () = &mut superseded => return Err(superseded_error(key, mine)),
            guard = slot.lock.lock() => guard,
        };

        let next = self.tracker.next_page_for(key)?;
        let coordinate = self.store.fetch_coordinate(key)?;
        debug!(page = next.page, first = next.is_first_fetch, "Requesting page");

        let found = tokio::select! {
            biased;
            () = &mut superseded => return Err(superseded_error(key, mine)),
            result = self.client.search(coordinate, next.page) => result?,
        };

        let state = self
            .tracker
            .record_fetch(key, next.page, found.total_pages, &found.photos)?;

        info!(
            page = next.page,
            total_pages = state.total_pages,
            next_page = state.next_page,
            photos = found.photos.len(),
            "Photos updated"
        );

        Ok(AlbumUpdate {
            key: key.to_string(),
            page: next.page,
            photos: found.photos,
            state,
        })
    }

    fn slot(&self, key: &str) -> SearchResult<Arc<LocationSlot>> {
        let mut slots = self.lock_slots()?;
        Ok(Arc::clone(
            slots
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(LocationSlot::new())),
        ))
    }

    fn lock_slots(&self) -> SearchResult<std::sync::MutexGuard<'_, HashMap<String, Arc<LocationSlot>>>> {
        self.slots.lock().map_err(|_| {
            SearchError::Store(Error::new(
                ErrorCode::Internal,
                "Failed to acquire album slot lock",
            ))
        })
    }
}

impl<C, S> PhotoAlbum<C, S>
where
    C: PhotoSearch + 'static,
    S: PhotoStore + ?Sized + 'static,
{
    /// Run [`request_photos`](Self::request_photos) on the runtime
    pub fn spawn_request(self: &Arc<Self>, key: impl Into<String>) -> JoinHandle<SearchResult<AlbumUpdate>> {
        let album = Arc::clone(self);
        let key = key.into();
        tokio::spawn(async move { album.request_photos(&key).await })
    }
}
