//! In-memory store

use super::{PhotoStore, PinTable};
use crate::paging::PageState;
use crate::search::ParsedPhoto;
use pinpix_core::{Error, ErrorCode, Result};
use pinpix_geo::Coordinate;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Process-local store; contents vanish with the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    pins: RwLock<PinTable>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored pins
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    /// Returns true if no pins are stored
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, PinTable>> {
        self.pins
            .read()
            .map_err(|_| Error::new(ErrorCode::Internal, "Failed to acquire store read lock"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, PinTable>> {
        self.pins
            .write()
            .map_err(|_| Error::new(ErrorCode::Internal, "Failed to acquire store write lock"))
    }
}

impl PhotoStore for MemoryStore {
    fn add_pin(&self, key: &str, coordinate: Coordinate) -> Result<()> {
        self.write()?.add(key, coordinate)
    }

    fn remove_pin(&self, key: &str) -> Result<bool> {
        Ok(self.write()?.remove(key))
    }

    fn locations(&self) -> Result<Vec<(String, Coordinate)>> {
        Ok(self.read()?.locations())
    }

    fn fetch_coordinate(&self, key: &str) -> Result<Coordinate> {
        Ok(self.read()?.get(key)?.coordinate)
    }

    fn store_photos(&self, key: &str, photos: &[ParsedPhoto]) -> Result<()> {
        self.write()?.get_mut(key)?.photos = photos.to_vec();
        Ok(())
    }

    fn photos(&self, key: &str) -> Result<Vec<ParsedPhoto>> {
        Ok(self.read()?.get(key)?.photos.clone())
    }

    fn load_page_state(&self, key: &str) -> Result<Option<PageState>> {
        Ok(self.read()?.get(key)?.page)
    }

    fn save_page_state(&self, key: &str, state: PageState) -> Result<()> {
        self.write()?.get_mut(key)?.page = Some(state);
        Ok(())
    }

    fn commit_page(&self, key: &str, photos: &[ParsedPhoto], state: PageState) -> Result<()> {
        self.write()?.commit(key, photos, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;

    #[test]
    fn test_memory_store_contract() {
        let store = MemoryStore::new();
        contract::run_all(&store);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_len() {
        let store = MemoryStore::new();
        store.add_pin("a", Coordinate::new(1.0, 1.0)).unwrap();
        store.add_pin("b", Coordinate::new(2.0, 2.0)).unwrap();
        store.add_pin("a", Coordinate::new(3.0, 3.0)).unwrap();
        assert_eq!(store.len().unwrap(), 2);
    }
}
