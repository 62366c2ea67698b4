use serde::{Deserialize, Serialize};

use crate::{
    core::geo::{GeoPoint, Point},
    layers::base::{Layer, MapView},
    rendering::context::{Color, LineRenderStyle, RenderContext},
    Result,
};

/// A polyline of geographic points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub points: Vec<GeoPoint>,
    pub color: Color,
    pub line_width: f32,
    pub visible: bool,
}

impl Track {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self {
            points,
            color: Color::rgba(153, 0, 0, 153),
            line_width: 4.0,
            visible: true,
        }
    }

    fn style(&self) -> LineRenderStyle {
        LineRenderStyle {
            color: self.color,
            width: self.line_width,
            dash_pattern: Vec::new(),
        }
    }
}

/// Overlay drawing any number of tracks.
///
/// Points are projected to world pixels once per zoom level during
/// `render`; `draw` only translates them, so tracks follow the map while it
/// is being dragged.
#[derive(Debug, Default)]
pub struct TrackLayer {
    tracks: Vec<Track>,
    projected: Vec<Vec<Point>>,
    projected_zoom: Option<i32>,
}

impl TrackLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of the new track.
    pub fn add_track(&mut self, track: Track) -> usize {
        self.tracks.push(track);
        self.projected_zoom = None;
        self.tracks.len() - 1
    }

    pub fn remove_track(&mut self, index: usize) -> Option<Track> {
        if index >= self.tracks.len() {
            return None;
        }
        self.projected_zoom = None;
        Some(self.tracks.remove(index))
    }

    /// Appends a point to an existing track. Returns `false` for an unknown index.
    pub fn add_point(&mut self, index: usize, point: GeoPoint) -> bool {
        match self.tracks.get_mut(index) {
            Some(track) => {
                track.points.push(point);
                self.projected_zoom = None;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.projected.clear();
        self.projected_zoom = None;
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.projected_zoom = None;
        self.tracks.get_mut(index)
    }

    fn project(&mut self, view: &MapView<'_>) {
        let zoom = view.viewport.zoom();
        if self.projected_zoom == Some(zoom) {
            return;
        }
        self.projected = self
            .tracks
            .iter()
            .map(|track| {
                track
                    .points
                    .iter()
                    .map(|point| view.viewport.world_pixel(point))
                    .collect()
            })
            .collect();
        self.projected_zoom = Some(zoom);
    }
}

impl Layer for TrackLayer {
    fn name(&self) -> &str {
        "tracks"
    }

    fn render(&mut self, view: &MapView<'_>) -> Result<()> {
        self.project(view);
        Ok(())
    }

    fn draw(&mut self, view: &MapView<'_>, frame: &mut RenderContext) -> Result<()> {
        self.project(view);
        let shift = view.drag_offset.subtract(&view.viewport.map_offset());
        for (track, world) in self.tracks.iter().zip(&self.projected) {
            if !track.visible {
                continue;
            }
            let screen: Vec<Point> = world.iter().map(|p| p.add(&shift)).collect();
            frame.render_line(&screen, &track.style());
        }
        Ok(())
    }

    crate::impl_layer_any!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{gps::GpsState, viewport::Viewport},
        rendering::context::DrawCommand,
    };

    fn line_points(frame: &RenderContext) -> Vec<Vec<Point>> {
        frame
            .get_drawing_queue()
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Line { points, .. } => Some(points.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_tracks_follow_drag_offset() {
        let viewport = Viewport::new(GeoPoint::default(), 5, 1, 18, 400, 400);
        let gps = GpsState::new();
        let mut layer = TrackLayer::new();
        layer.add_track(Track::new(vec![
            viewport.screen_to_geographic(Point::new(100.0, 100.0)),
            viewport.screen_to_geographic(Point::new(300.0, 200.0)),
        ]));

        let mut view = MapView {
            viewport: &viewport,
            gps: &gps,
            redraw_cycle: 1,
            drag_offset: Point::default(),
        };
        let mut frame = RenderContext::new(400, 400);
        layer.draw(&view, &mut frame).unwrap();
        let still = line_points(&frame);

        view.drag_offset = Point::new(15.0, -5.0);
        let mut frame = RenderContext::new(400, 400);
        layer.draw(&view, &mut frame).unwrap();
        let dragged = line_points(&frame);

        assert!((still[0][0].x - 100.0).abs() < 1e-6);
        assert!((dragged[0][0].x - 115.0).abs() < 1e-6);
        assert!((dragged[0][1].y - 195.0).abs() < 1e-6);
    }

    #[test]
    fn test_hidden_and_short_tracks_are_skipped() {
        let viewport = Viewport::default();
        let gps = GpsState::new();
        let view = MapView {
            viewport: &viewport,
            gps: &gps,
            redraw_cycle: 0,
            drag_offset: Point::default(),
        };
        let mut layer = TrackLayer::new();
        let hidden = layer.add_track(Track::new(vec![
            GeoPoint::default(),
            GeoPoint::from_degrees(1.0, 1.0),
        ]));
        layer.track_mut(hidden).unwrap().visible = false;
        let short = layer.add_track(Track::new(vec![]));
        assert!(layer.add_point(short, GeoPoint::default()));
        assert!(!layer.add_point(9, GeoPoint::default()));

        let mut frame = RenderContext::new(10, 10);
        layer.render(&view).unwrap();
        layer.draw(&view, &mut frame).unwrap();
        assert!(frame.is_empty());
        assert!(layer.remove_track(hidden).is_some());
        assert_eq!(layer.tracks().len(), 1);
    }
}
