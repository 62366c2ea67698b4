use image::RgbaImage;
use std::sync::Arc;

use crate::core::geo::TileAddress;

/// Result of asking a provider for a tile.
#[derive(Debug, Clone, PartialEq)]
pub enum TileImage {
    Ready(Arc<RgbaImage>),
    /// Not available (yet). Drawn as a placeholder; the provider is asked again
    /// on the next redraw.
    Missing,
}

impl TileImage {
    pub fn is_ready(&self) -> bool {
        matches!(self, TileImage::Ready(_))
    }
}

/// Supplies decoded tile images to the render pipeline.
///
/// Implementations must answer immediately. A provider that downloads tiles
/// in the background returns [`TileImage::Missing`] until the data arrives
/// and then asks the widget for a redraw.
pub trait TileProvider {
    fn tile(&mut self, address: TileAddress) -> TileImage;
}

impl<F> TileProvider for F
where
    F: FnMut(TileAddress) -> TileImage,
{
    fn tile(&mut self, address: TileAddress) -> TileImage {
        self(address)
    }
}
