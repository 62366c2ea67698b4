use image::RgbaImage;
use lru::LruCache;
use std::{num::NonZeroUsize, sync::Arc};

use crate::{
    core::geo::TileAddress,
    tiles::source::{TileImage, TileProvider},
};

/// Default capacity in tiles
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Cache statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            self.hits as f64 / (self.hits + self.misses) as f64
        }
    }
}

/// In-memory tile cache using LRU eviction.
///
/// Works as a [`TileProvider`] on its own (hosts push decoded tiles with
/// [`MemoryTileCache::insert`]) or as a decorator in front of another
/// provider, in which case ready tiles returned by the source are kept.
/// Missing tiles are never cached.
pub struct MemoryTileCache {
    cache: LruCache<TileAddress, Arc<RgbaImage>>,
    source: Option<Box<dyn TileProvider>>,
    stats: CacheStats,
}

impl MemoryTileCache {
    /// Create a new tile cache with the given capacity (at least one tile)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            source: None,
            stats: CacheStats::default(),
        }
    }

    pub fn with_source(capacity: usize, source: impl TileProvider + 'static) -> Self {
        let mut cache = Self::new(capacity);
        cache.source = Some(Box::new(source));
        cache
    }

    pub fn insert(&mut self, address: TileAddress, image: Arc<RgbaImage>) {
        self.cache.put(address, image);
    }

    pub fn contains(&self, address: &TileAddress) -> bool {
        self.cache.contains(address)
    }

    pub fn remove(&mut self, address: &TileAddress) -> Option<Arc<RgbaImage>> {
        self.cache.pop(address)
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

impl Default for MemoryTileCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl TileProvider for MemoryTileCache {
    fn tile(&mut self, address: TileAddress) -> TileImage {
        if let Some(image) = self.cache.get(&address) {
            self.stats.hits += 1;
            return TileImage::Ready(Arc::clone(image));
        }
        self.stats.misses += 1;

        let Some(source) = self.source.as_mut() else {
            return TileImage::Missing;
        };
        let result = source.tile(address);
        if let TileImage::Ready(image) = &result {
            self.cache.put(address, Arc::clone(image));
        } else {
            log::trace!("tile {}/{}/{} not available", address.zoom, address.x, address.y);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::Cell, rc::Rc};

    fn tile() -> Arc<RgbaImage> {
        Arc::new(RgbaImage::new(2, 2))
    }

    #[test]
    fn test_tile_cache_basic_operations() {
        let mut cache = MemoryTileCache::new(2);
        let a = TileAddress::new(3, 1, 2);

        assert!(cache.is_empty());
        assert_eq!(cache.tile(a), TileImage::Missing);

        cache.insert(a, tile());
        assert!(cache.contains(&a));
        assert!(cache.tile(a).is_ready());
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_tile_cache_lru_eviction() {
        let mut cache = MemoryTileCache::new(2);
        let a = TileAddress::new(1, 0, 0);
        let b = TileAddress::new(1, 1, 0);
        let c = TileAddress::new(1, 0, 1);

        cache.insert(a, tile());
        cache.insert(b, tile());
        cache.insert(c, tile());

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&a));
        assert!(cache.contains(&b));
        assert!(cache.contains(&c));
    }

    #[test]
    fn test_source_is_consulted_once_per_ready_tile() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut cache = MemoryTileCache::with_source(8, move |address: TileAddress| {
            counter.set(counter.get() + 1);
            if address.x == 0 {
                TileImage::Ready(tile())
            } else {
                TileImage::Missing
            }
        });

        let ready = TileAddress::new(2, 0, 1);
        let missing = TileAddress::new(2, 1, 1);
        for _ in 0..3 {
            assert!(cache.tile(ready).is_ready());
            assert_eq!(cache.tile(missing), TileImage::Missing);
        }
        // one call for the ready tile, three for the missing one
        assert_eq!(calls.get(), 4);
        assert_eq!(cache.capacity(), 8);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        assert_eq!(MemoryTileCache::new(0).capacity(), 1);
    }
}
