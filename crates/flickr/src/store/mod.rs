//! Persistence for pins, their photos and paging state
//!
//! Two implementations ship with the crate:
//!
//! - [`MemoryStore`]: process-local, for tests and one-shot commands
//! - [`JsonFileStore`]: a single JSON document rewritten atomically on change
//!
//! Every operation on a key with no pin fails with
//! [`ErrorCode::LocationNotFound`](pinpix_core::ErrorCode::LocationNotFound).

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::paging::PageState;
use crate::search::ParsedPhoto;
use pinpix_core::{Error, Result};
use pinpix_geo::Coordinate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Storage backend for the photo album
pub trait PhotoStore: Send + Sync {
    /// Store a pin. Re-pinning a key moves it and forgets its photos and paging.
    fn add_pin(&self, key: &str, coordinate: Coordinate) -> Result<()>;

    /// Remove a pin and everything attached to it. Returns false if absent.
    fn remove_pin(&self, key: &str) -> Result<bool>;

    /// All pins, ordered by key
    fn locations(&self) -> Result<Vec<(String, Coordinate)>>;

    /// Coordinate of a stored pin
    fn fetch_coordinate(&self, key: &str) -> Result<Coordinate>;

    /// Replace the photos attached to a pin
    fn store_photos(&self, key: &str, photos: &[ParsedPhoto]) -> Result<()>;

    /// Photos attached to a pin, in provider order
    fn photos(&self, key: &str) -> Result<Vec<ParsedPhoto>>;

    /// Paging state of a pin; `None` until its first successful fetch
    fn load_page_state(&self, key: &str) -> Result<Option<PageState>>;

    /// Overwrite the paging state of a pin
    fn save_page_state(&self, key: &str, state: PageState) -> Result<()>;

    /// Replace the photos of a pin and its paging state in one write.
    /// On error neither has changed.
    fn commit_page(&self, key: &str, photos: &[ParsedPhoto], state: PageState) -> Result<()>;
}

/// Everything stored for one pin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinRecord {
    pub coordinate: Coordinate,
    #[serde(default)]
    pub photos: Vec<ParsedPhoto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<PageState>,
}

impl PinRecord {
    fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            photos: Vec::new(),
            page: None,
        }
    }
}

/// Pin table shared by both store implementations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct PinTable(BTreeMap<String, PinRecord>);

impl PinTable {
    pub(crate) fn add(&mut self, key: &str, coordinate: Coordinate) -> Result<()> {
        if key.trim().is_empty() {
            return Err(Error::validation("Location key cannot be empty"));
        }
        coordinate
            .validate()
            .map_err(|e| Error::validation(e.to_string()))?;

        self.0.insert(key.to_string(), PinRecord::new(coordinate));
        Ok(())
    }

    pub(crate) fn remove(&mut self, key: &str) -> bool {
        self.0.remove(key).is_some()
    }

    pub(crate) fn locations(&self) -> Vec<(String, Coordinate)> {
        self.0
            .iter()
            .map(|(key, record)| (key.clone(), record.coordinate))
            .collect()
    }

    pub(crate) fn get(&self, key: &str) -> Result<&PinRecord> {
        self.0.get(key).ok_or_else(|| Error::location_not_found(key))
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Result<&mut PinRecord> {
        self.0
            .get_mut(key)
            .ok_or_else(|| Error::location_not_found(key))
    }

    pub(crate) fn commit(&mut self, key: &str, photos: &[ParsedPhoto], state: PageState) -> Result<()> {
        let record = self.get_mut(key)?;
        record.photos = photos.to_vec();
        record.page = Some(state);
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
pub(crate) mod contract {
    //! Behaviour every [`PhotoStore`] must share

    use super::*;
    use pinpix_core::ErrorCode;

    pub fn photo(id: &str) -> ParsedPhoto {
        ParsedPhoto {
            id: id.to_string(),
            title: format!("title {id}"),
            remote_url: format!("https://live.staticflickr.com/1/{id}_m.jpg"),
        }
    }

    pub fn run_all<S: PhotoStore>(store: &S) {
        unknown_location(store);
        pin_lifecycle(store);
        photos_are_replaced(store);
        page_state(store);
        commit_page(store);
        rejects_bad_pins(store);
    }

    fn unknown_location<S: PhotoStore>(store: &S) {
        assert_eq!(
            store.fetch_coordinate("nowhere").unwrap_err().code,
            ErrorCode::LocationNotFound
        );
        assert!(store.photos("nowhere").unwrap_err().is_not_found());
        assert!(store.store_photos("nowhere", &[]).unwrap_err().is_not_found());
        assert!(store.load_page_state("nowhere").unwrap_err().is_not_found());
        assert!(store
            .save_page_state("nowhere", PageState::first(3))
            .unwrap_err()
            .is_not_found());
        assert!(store
            .commit_page("nowhere", &[photo("1")], PageState::first(3))
            .unwrap_err()
            .is_not_found());
        assert!(!store.remove_pin("nowhere").unwrap());
    }

    fn pin_lifecycle<S: PhotoStore>(store: &S) {
        let sf = Coordinate::new(37.7749, -122.4194);
        store.add_pin("sf", sf).unwrap();
        store.add_pin("paris", Coordinate::new(48.8566, 2.3522)).unwrap();

        assert_eq!(store.fetch_coordinate("sf").unwrap(), sf);
        let keys: Vec<_> = store.locations().unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["paris", "sf"]);

        assert!(store.remove_pin("paris").unwrap());
        assert!(store.fetch_coordinate("paris").is_err());
        assert!(store.remove_pin("sf").unwrap());
    }

    fn photos_are_replaced<S: PhotoStore>(store: &S) {
        store.add_pin("tokyo", Coordinate::new(35.6762, 139.6503)).unwrap();
        assert!(store.photos("tokyo").unwrap().is_empty());

        store.store_photos("tokyo", &[photo("1"), photo("2")]).unwrap();
        store.store_photos("tokyo", &[photo("3")]).unwrap();
        assert_eq!(store.photos("tokyo").unwrap(), vec![photo("3")]);

        // Re-pinning forgets what was attached
        store.save_page_state("tokyo", PageState::first(4)).unwrap();
        store.add_pin("tokyo", Coordinate::new(35.0, 139.0)).unwrap();
        assert!(store.photos("tokyo").unwrap().is_empty());
        assert_eq!(store.load_page_state("tokyo").unwrap(), None);

        store.remove_pin("tokyo").unwrap();
    }

    fn page_state<S: PhotoStore>(store: &S) {
        store.add_pin("rome", Coordinate::new(41.9028, 12.4964)).unwrap();
        assert_eq!(store.load_page_state("rome").unwrap(), None);

        let state = PageState::first(5);
        store.save_page_state("rome", state).unwrap();
        assert_eq!(store.load_page_state("rome").unwrap(), Some(state));

        let next = state.advance(2, 5);
        store.save_page_state("rome", next).unwrap();
        assert_eq!(store.load_page_state("rome").unwrap(), Some(next));

        store.remove_pin("rome").unwrap();
    }

    fn commit_page<S: PhotoStore>(store: &S) {
        store.add_pin("oslo", Coordinate::new(59.9139, 10.7522)).unwrap();
        store.store_photos("oslo", &[photo("old")]).unwrap();

        let state = PageState::first(7);
        store.commit_page("oslo", &[photo("a"), photo("b")], state).unwrap();
        assert_eq!(store.photos("oslo").unwrap(), vec![photo("a"), photo("b")]);
        assert_eq!(store.load_page_state("oslo").unwrap(), Some(state));

        store.remove_pin("oslo").unwrap();
    }

    fn rejects_bad_pins<S: PhotoStore>(store: &S) {
        assert_eq!(
            store.add_pin("pole", Coordinate::new(90.0, 0.0)).unwrap_err().code,
            ErrorCode::ValidationError
        );
        assert!(store.add_pin("  ", Coordinate::new(1.0, 1.0)).is_err());
        assert!(store.locations().unwrap().is_empty());
    }
}
