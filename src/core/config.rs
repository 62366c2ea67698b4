//! Configuration for the map widget
//!
//! Mirrors the recognized widget options (auto-center, trip history, zoom
//! bounds, drag limit, GPS point radii ...) as a typed struct. Values out of
//! range are clamped by [`MapConfig::sanitized`], never rejected.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{
    core::constants::{
        DEFAULT_AUTO_CENTER_THRESHOLD, DEFAULT_DRAG_LIMIT, DEFAULT_GPS_POINT_INNER_RADIUS,
        DEFAULT_GPS_POINT_OUTER_RADIUS, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, DEFAULT_ZOOM,
        MAX_ZOOM, MIN_ZOOM,
    },
    rendering::context::Color,
    Result,
};

/// Ready-made configurations for the common ways the widget is embedded.
#[derive(Debug, Clone, PartialEq)]
pub enum MapPreset {
    /// Plain map browsing: no GPS follow, no trip recording.
    Browsing,
    /// Vehicle/hiking display: follow the GPS point and record the trip.
    Tracking,
    Custom(MapConfig),
}

impl MapPreset {
    pub fn resolve(&self) -> MapConfig {
        match self {
            Self::Browsing => MapConfig {
                auto_center: false,
                record_trip_history: false,
                show_trip_history: false,
                show_gps_point: false,
                ..MapConfig::default()
            },
            Self::Tracking => MapConfig {
                auto_center: true,
                record_trip_history: true,
                show_trip_history: true,
                show_gps_point: true,
                zoom: 15,
                ..MapConfig::default()
            },
            Self::Custom(config) => config.clone(),
        }
    }
}

impl Default for MapPreset {
    fn default() -> Self {
        Self::Custom(MapConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Recenter on the GPS point when it leaves the central region
    pub auto_center: bool,
    /// Size of the central region as a fraction of the viewport (0..1)
    pub auto_center_threshold: f64,
    pub record_trip_history: bool,
    pub show_trip_history: bool,
    pub show_gps_point: bool,
    pub zoom: i32,
    pub min_zoom: i32,
    pub max_zoom: i32,
    /// Initial center as `(lat, lon)` in degrees
    pub initial_center: (f64, f64),
    /// Pixels the pointer must move before a press turns into a drag
    pub drag_limit: u32,
    pub gps_point_inner_radius: u32,
    pub gps_point_outer_radius: u32,
    /// Tiles are fetched this many levels above the map zoom and upscaled
    pub tile_zoom_offset: i32,
    /// Extra pixels rendered around the visible area on the backing surface
    pub extra_border: u32,
    pub background: Color,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            auto_center: true,
            auto_center_threshold: DEFAULT_AUTO_CENTER_THRESHOLD,
            record_trip_history: true,
            show_trip_history: true,
            show_gps_point: true,
            zoom: DEFAULT_ZOOM,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            initial_center: (0.0, 0.0),
            drag_limit: DEFAULT_DRAG_LIMIT,
            gps_point_inner_radius: DEFAULT_GPS_POINT_INNER_RADIUS,
            gps_point_outer_radius: DEFAULT_GPS_POINT_OUTER_RADIUS,
            tile_zoom_offset: 0,
            extra_border: 0,
            background: Color::WHITE,
        }
    }
}

impl MapConfig {
    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: MapConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Clamps every value into its legal range.
    pub fn sanitized(mut self) -> Self {
        self.min_zoom = self.min_zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.max_zoom = self.max_zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if self.min_zoom > self.max_zoom {
            log::warn!(
                "min_zoom {} above max_zoom {}, swapping",
                self.min_zoom,
                self.max_zoom
            );
            std::mem::swap(&mut self.min_zoom, &mut self.max_zoom);
        }
        self.zoom = self.zoom.clamp(self.min_zoom, self.max_zoom);
        self.auto_center_threshold = if self.auto_center_threshold.is_finite() {
            self.auto_center_threshold.clamp(0.0, 1.0)
        } else {
            DEFAULT_AUTO_CENTER_THRESHOLD
        };
        self.tile_zoom_offset = self.tile_zoom_offset.clamp(0, MAX_ZOOM);
        let (lat, lon) = self.initial_center;
        self.initial_center = (
            if lat.is_finite() { lat.clamp(-90.0, 90.0) } else { 0.0 },
            if lon.is_finite() { lon } else { 0.0 },
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_widget_options() {
        let config = MapConfig::default();
        assert!(config.auto_center);
        assert_eq!(config.auto_center_threshold, 0.25);
        assert_eq!(config.drag_limit, 10);
        assert_eq!(config.zoom, 3);
        assert_eq!((config.min_zoom, config.max_zoom), (1, 18));
    }

    #[test]
    fn test_presets() {
        let browsing = MapPreset::Browsing.resolve();
        let tracking = MapPreset::Tracking.resolve();

        assert!(!browsing.auto_center);
        assert!(!browsing.record_trip_history);
        assert!(tracking.auto_center);
        assert!(tracking.record_trip_history);
        assert_eq!(MapPreset::default().resolve(), MapConfig::default());
    }

    #[test]
    fn test_sanitize_clamps_out_of_range_values() {
        let config = MapConfig {
            zoom: 40,
            min_zoom: 12,
            max_zoom: 4,
            auto_center_threshold: 3.0,
            initial_center: (123.0, f64::NAN),
            ..MapConfig::default()
        }
        .sanitized();

        assert_eq!((config.min_zoom, config.max_zoom), (4, 12));
        assert_eq!(config.zoom, 12);
        assert_eq!(config.auto_center_threshold, 1.0);
        assert_eq!(config.initial_center, (90.0, 0.0));
    }

    #[test]
    fn test_json_partial_document() {
        let config = MapConfig::from_json_str(r#"{ "zoom": 12, "drag_limit": 4 }"#).unwrap();
        assert_eq!(config.zoom, 12);
        assert_eq!(config.drag_limit, 4);
        assert!(config.show_gps_point);
    }

    #[test]
    fn test_json_round_trip() {
        let config = MapPreset::Tracking.resolve();
        let json = config.to_json_string().unwrap();
        assert_eq!(MapConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(MapConfig::from_json_str("{ zoom: }").is_err());
    }

    #[test]
    fn test_bad_background_color_is_an_error() {
        let err = MapConfig::from_json_str(r#"{ "background": "red" }"#).unwrap_err();
        assert!(matches!(err, crate::MapError::Serialization(_)));

        let config = MapConfig::from_json_str(r##"{ "background": "#102030" }"##).unwrap();
        assert_eq!(config.background, Color::rgba(16, 32, 48, 255));
    }
}
