//! Cache store for persisting raw responses to disk
//!
//! Provides a `CacheStore` that reads and writes a single JSON object mapping
//! request keys to response bodies. The whole mapping is rewritten on every
//! save.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default cache file, relative to the working directory
pub const DEFAULT_CACHE_FILE: &str = "nps_cache.json";

/// Flat mapping from cache key to raw response body
pub type CacheMap = HashMap<String, String>;

/// Reads and writes the persisted response cache
///
/// The file is a single JSON object (`{"<url>": "<body>", ...}`). Writes are
/// not atomic; a crash mid-write can leave a truncated file, which `load`
/// then treats as an empty cache.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Location of the cache file
    path: PathBuf,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_FILE)
    }
}

impl CacheStore {
    /// Creates a CacheStore bound to the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the cache file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted mapping
    ///
    /// Never fails: a missing file, unreadable bytes, or invalid JSON all
    /// yield an empty mapping.
    pub fn load(&self) -> CacheMap {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return CacheMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable cache file");
                return CacheMap::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(map) => map,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable cache file");
                CacheMap::new()
            }
        }
    }

    /// Serializes the full mapping and overwrites the cache file
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err` if the parent directory cannot be created or the write fails
    pub fn save(&self, cache: &CacheMap) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string(cache)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        fs::write(&self.path, json)
    }
}
