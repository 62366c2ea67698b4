use image::RgbaImage;
use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
    sync::Arc,
};

use crate::{
    core::{
        geo::{GeoPoint, Point, ScreenRect},
        viewport::Viewport,
    },
    rendering::scheduler::RedrawScheduler,
};

/// Shared handle to an image registered on the map.
pub type ImageHandle = Rc<OverlayImage>;

/// A bitmap pinned to a geographic point.
///
/// Handles are shared between the registry and the application. Changing
/// the point, alignment or rotation through a handle asks the owning map
/// for a redraw; once the image is removed from the map the setters only
/// update the values.
#[derive(Debug)]
pub struct OverlayImage {
    point: Cell<GeoPoint>,
    image: Arc<RgbaImage>,
    /// Fraction of the bitmap size placed on the point, 0..1 on each axis
    alignment: Cell<(f64, f64)>,
    rotation: Cell<f64>,
    z_order: i32,
    notifier: RefCell<Weak<RedrawScheduler>>,
}

impl OverlayImage {
    /// Creates an image centered on `point` with z-order 0.
    pub fn new(point: GeoPoint, image: Arc<RgbaImage>) -> Self {
        Self::with_alignment_z(point, image, 0.5, 0.5, 0)
    }

    pub fn with_alignment_z(
        point: GeoPoint,
        image: Arc<RgbaImage>,
        xalign: f64,
        yalign: f64,
        z_order: i32,
    ) -> Self {
        Self {
            point: Cell::new(point),
            image,
            alignment: Cell::new(clamp_alignment(xalign, yalign)),
            rotation: Cell::new(0.0),
            z_order,
            notifier: RefCell::new(Weak::new()),
        }
    }

    pub fn point(&self) -> GeoPoint {
        self.point.get()
    }

    pub fn set_point(&self, point: GeoPoint) {
        self.point.set(point);
        self.notify();
    }

    pub fn image(&self) -> &Arc<RgbaImage> {
        &self.image
    }

    pub fn alignment(&self) -> (f64, f64) {
        self.alignment.get()
    }

    /// Alignment values outside 0..1 are clamped.
    pub fn set_alignment(&self, xalign: f64, yalign: f64) {
        self.alignment.set(clamp_alignment(xalign, yalign));
        self.notify();
    }

    /// Rotation in radians, applied around the alignment point.
    pub fn rotation(&self) -> f64 {
        self.rotation.get()
    }

    pub fn set_rotation(&self, rotation: f64) {
        self.rotation.set(if rotation.is_finite() { rotation } else { 0.0 });
        self.notify();
    }

    pub fn z_order(&self) -> i32 {
        self.z_order
    }

    /// Bitmap size in pixels
    pub fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Screen rectangle covered by the (unrotated) bitmap.
    pub fn screen_rect(&self, viewport: &Viewport) -> ScreenRect {
        let anchor = viewport.geographic_to_screen(&self.point.get());
        let (width, height) = self.size();
        let (xalign, yalign) = self.alignment.get();
        ScreenRect::new(
            anchor.x - xalign * width as f64,
            anchor.y - yalign * height as f64,
            width as f64,
            height as f64,
        )
    }

    pub(crate) fn attach(&self, scheduler: &Rc<RedrawScheduler>) {
        *self.notifier.borrow_mut() = Rc::downgrade(scheduler);
    }

    pub(crate) fn detach(&self) {
        *self.notifier.borrow_mut() = Weak::new();
    }

    fn notify(&self) {
        if let Some(scheduler) = self.notifier.borrow().upgrade() {
            scheduler.request_redraw();
        }
    }
}

fn clamp_alignment(xalign: f64, yalign: f64) -> (f64, f64) {
    let clamp = |v: f64| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.5 };
    (clamp(xalign), clamp(yalign))
}

/// Images ordered by ascending z-order. Equal z-orders keep insertion order.
#[derive(Debug, Default)]
pub struct ImageRegistry {
    images: Vec<ImageHandle>,
}

impl ImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts after every image whose z-order is lower or equal.
    pub fn insert(&mut self, image: ImageHandle) {
        let z_order = image.z_order();
        let position = self
            .images
            .iter()
            .position(|existing| existing.z_order() > z_order)
            .unwrap_or(self.images.len());
        self.images.insert(position, image);
    }

    /// Removes `image`. Returns `false` when it is not registered.
    pub fn remove(&mut self, image: &ImageHandle) -> bool {
        match self.images.iter().position(|existing| Rc::ptr_eq(existing, image)) {
            Some(index) => {
                self.images.remove(index).detach();
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        for image in self.images.drain(..) {
            image.detach();
        }
    }

    pub fn contains(&self, image: &ImageHandle) -> bool {
        self.images.iter().any(|existing| Rc::ptr_eq(existing, image))
    }

    /// Iterates in drawing order (lowest z-order first).
    pub fn iter(&self) -> impl Iterator<Item = &ImageHandle> {
        self.images.iter()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Topmost image whose bitmap covers `screen`.
    pub fn hit_test(&self, viewport: &Viewport, screen: Point) -> Option<ImageHandle> {
        self.images
            .iter()
            .rev()
            .find(|image| image.screen_rect(viewport).contains(&screen))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::HostWindow;

    fn image(z_order: i32) -> ImageHandle {
        Rc::new(OverlayImage::with_alignment_z(
            GeoPoint::default(),
            Arc::new(RgbaImage::new(8, 4)),
            0.5,
            0.5,
            z_order,
        ))
    }

    #[test]
    fn test_insert_is_stable_by_z_order() {
        let mut registry = ImageRegistry::new();
        let (a, b, c, d) = (image(5), image(1), image(3), image(3));
        for img in [&a, &b, &c, &d] {
            registry.insert(img.clone());
        }

        let order: Vec<_> = registry.iter().cloned().collect();
        assert!(Rc::ptr_eq(&order[0], &b));
        assert!(Rc::ptr_eq(&order[1], &c));
        assert!(Rc::ptr_eq(&order[2], &d));
        assert!(Rc::ptr_eq(&order[3], &a));
    }

    #[test]
    fn test_double_remove() {
        let mut registry = ImageRegistry::new();
        let img = image(0);
        registry.insert(img.clone());
        assert!(registry.remove(&img));
        assert!(!registry.remove(&img));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_alignment_is_clamped() {
        let img = image(0);
        img.set_alignment(-1.0, 7.0);
        assert_eq!(img.alignment(), (0.0, 1.0));
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let viewport = Viewport::new(GeoPoint::default(), 4, 1, 18, 200, 200);
        let mut registry = ImageRegistry::new();
        let low = image(1);
        let high = image(2);
        registry.insert(high.clone());
        registry.insert(low.clone());

        let hit = registry.hit_test(&viewport, Point::new(101.0, 100.0)).unwrap();
        assert!(Rc::ptr_eq(&hit, &high));
        assert!(registry.hit_test(&viewport, Point::new(150.0, 100.0)).is_none());
    }

    #[test]
    fn test_setters_request_redraw_while_attached() {
        struct Host(Cell<usize>);
        impl HostWindow for Host {
            fn schedule_idle(&self) {
                self.0.set(self.0.get() + 1);
            }
            fn queue_draw(&self) {}
        }

        let host = Rc::new(Host(Cell::new(0)));
        let scheduler = RedrawScheduler::new(host.clone());
        let mut registry = ImageRegistry::new();
        let img = image(0);
        img.attach(&scheduler);
        registry.insert(img.clone());

        img.set_rotation(1.0);
        assert!(scheduler.take_redraw());
        assert_eq!(host.0.get(), 1);

        registry.remove(&img);
        img.set_rotation(2.0);
        assert!(!scheduler.is_pending());
        assert_eq!(img.rotation(), 2.0);
    }
}
