use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::foundation::raster::Raster;

/// Decoded image rasters keyed by location.
///
/// Entries are immutable once inserted, so concurrent renders may race to fill the same key; the
/// last writer wins and the redundant fetch is harmless. Nothing is ever evicted automatically;
/// call [`AssetCache::flush`] to bound memory.
#[derive(Debug, Default)]
pub struct AssetCache {
    entries: RwLock<HashMap<String, Arc<Raster>>>,
}

impl AssetCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached raster for `location`, if any.
    pub fn get(&self, location: &str) -> Option<Arc<Raster>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(location)
            .cloned()
    }

    /// Store `raster` under `location`, replacing any previous entry.
    pub fn insert(&self, location: impl Into<String>, raster: Arc<Raster>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(location.into(), raster);
    }

    /// `true` when `location` is cached.
    pub fn contains(&self, location: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(location)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    pub fn flush(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(entries = entries.len(), "flushing asset cache");
        entries.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
