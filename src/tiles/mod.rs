pub mod cache;
pub mod source;

// Re-exports for convenience
pub use cache::{CacheStats, MemoryTileCache};
pub use source::{TileImage, TileProvider};
