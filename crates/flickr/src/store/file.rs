//! JSON file store
//!
//! The whole album lives in one document:
//!
//! ```json
//! { "version": 1, "pins": { "sf": { "coordinate": {...}, "photos": [...], "page": {...} } } }
//! ```
//!
//! The file is read once at open. Every change is written to a temporary file
//! in the same directory and renamed over the existing file, so readers never see
//! a half-written document. A failed write leaves both the file and the
//! in-memory copy untouched.

use super::{PhotoStore, PinTable};
use crate::paging::PageState;
use crate::search::ParsedPhoto;
use pinpix_core::{Error, ErrorCode, Result};
use pinpix_geo::Coordinate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tempfile::NamedTempFile;
use tracing::debug;

/// Document format version written by this build
pub const STORE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Document {
    version: u32,
    #[serde(default)]
    pins: PinTable,
}

/// Store backed by a single JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    pins: RwLock<PinTable>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let pins = if path.exists() {
            load(&path)?
        } else {
            debug!(path = %path.display(), "Store file absent, starting empty");
            PinTable::default()
        };

        Ok(Self {
            path,
            pins: RwLock::new(pins),
        })
    }

    /// Location of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, PinTable>> {
        self.pins
            .read()
            .map_err(|_| Error::new(ErrorCode::Internal, "Failed to acquire store read lock"))
    }

    /// Apply `change` to a copy, persist it, then publish it
    fn mutate<T>(&self, change: impl FnOnce(&mut PinTable) -> Result<T>) -> Result<T> {
        let mut pins: RwLockWriteGuard<'_, PinTable> = self
            .pins
            .write()
            .map_err(|_| Error::new(ErrorCode::Internal, "Failed to acquire store write lock"))?;

        let mut next = pins.clone();
        let out = change(&mut next)?;

        if next != *pins {
            save(&self.path, &next)?;
            *pins = next;
        }
        Ok(out)
    }
}

fn load(path: &Path) -> Result<PinTable> {
    let content = fs::read(path).map_err(|e| {
        Error::io(format!("Failed to read store file {}", path.display())).with_source(e)
    })?;

    let document: Document =
        serde_json::from_slice(&content).map_err(|e| Error::store_corrupted(path).with_source(e))?;

    if document.version != STORE_VERSION {
        return Err(Error::store(format!(
            "Unsupported store version {} in {} (expected {STORE_VERSION})",
            document.version,
            path.display()
        )));
    }

    debug!(path = %path.display(), pins = document.pins.len(), "Store loaded");
    Ok(document.pins)
}

fn save(path: &Path, pins: &PinTable) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| {
        Error::io(format!("Failed to create store directory {}", dir.display())).with_source(e)
    })?;

    let document = Document {
        version: STORE_VERSION,
        pins: pins.clone(),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, &document)
            .map_err(|e| Error::store("Failed to serialize store").with_source(e))?;
        writer.flush()?;
    }

    temp.persist(path).map_err(|e| {
        Error::io(format!("Failed to replace store file {}", path.display())).with_source(e.error)
    })?;

    debug!(path = %path.display(), pins = pins.len(), "Store saved");
    Ok(())
}

impl PhotoStore for JsonFileStore {
    fn add_pin(&self, key: &str, coordinate: Coordinate) -> Result<()> {
        self.mutate(|pins| pins.add(key, coordinate))
    }

    fn remove_pin(&self, key: &str) -> Result<bool> {
        self.mutate(|pins| Ok(pins.remove(key)))
    }

    fn locations(&self) -> Result<Vec<(String, Coordinate)>> {
        Ok(self.read()?.locations())
    }

    fn fetch_coordinate(&self, key: &str) -> Result<Coordinate> {
        Ok(self.read()?.get(key)?.coordinate)
    }

    fn store_photos(&self, key: &str, photos: &[ParsedPhoto]) -> Result<()> {
        self.mutate(|pins| {
            pins.get_mut(key)?.photos = photos.to_vec();
            Ok(())
        })
    }

    fn photos(&self, key: &str) -> Result<Vec<ParsedPhoto>> {
        Ok(self.read()?.get(key)?.photos.clone())
    }

    fn load_page_state(&self, key: &str) -> Result<Option<PageState>> {
        Ok(self.read()?.get(key)?.page)
    }

    fn save_page_state(&self, key: &str, state: PageState) -> Result<()> {
        self.mutate(|pins| {
            pins.get_mut(key)?.page = Some(state);
            Ok(())
        })
    }

    fn commit_page(&self, key: &str, photos: &[ParsedPhoto], state: PageState) -> Result<()> {
        self.mutate(|pins| pins.commit(key, photos, state))
    }
}
