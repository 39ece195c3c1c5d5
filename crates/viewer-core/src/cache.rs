//! In-memory cache of rendered page bitmaps.
//!
//! One entry per page; re-inserting replaces. The cache is owned by the
//! session and only touched from the UI thread, so no interior locking.

use paperview_render::PageBitmap;
use std::collections::HashMap;
use std::sync::Arc;

/// Counters for cache effectiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub memory_used: usize,
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
}

/// Keyed by page number. Bitmaps are shared out as `Arc` so the grid can
/// hold a reference while the cache stays the owner of record.
#[derive(Debug, Default)]
pub struct PageImageCache {
    entries: HashMap<u32, Arc<PageBitmap>>,
    memory_used: usize,
    hits: u64,
    misses: u64,
    invalidations: u64,
}

impl PageImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a bitmap for a page, replacing any previous entry.
    pub fn insert(&mut self, page_number: u32, bitmap: Arc<PageBitmap>) {
        self.memory_used += bitmap.memory_size();
        if let Some(old) = self.entries.insert(page_number, bitmap) {
            self.memory_used -= old.memory_size();
        }
    }

    pub fn get(&mut self, page_number: u32) -> Option<Arc<PageBitmap>> {
        match self.entries.get(&page_number) {
            Some(bitmap) => {
                self.hits += 1;
                Some(Arc::clone(bitmap))
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Presence check that does not touch the hit/miss counters.
    pub fn contains(&self, page_number: u32) -> bool {
        self.entries.contains_key(&page_number)
    }

    pub fn remove(&mut self, page_number: u32) -> Option<Arc<PageBitmap>> {
        let removed = self.entries.remove(&page_number);
        if let Some(bitmap) = &removed {
            self.memory_used -= bitmap.memory_size();
            self.invalidations += 1;
        }
        removed
    }

    pub fn clear(&mut self) {
        self.invalidations += self.entries.len() as u64;
        self.entries.clear();
        self.memory_used = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn memory_used(&self) -> usize {
        self.memory_used
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            memory_used: self.memory_used,
            hits: self.hits,
            misses: self.misses,
            invalidations: self.invalidations,
        }
    }
}
