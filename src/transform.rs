//! World-to-surface coordinate transform.
//!
//! Maps world coordinates (meters, origin-relative, Y up) onto the fixed-size
//! drawing surface (pixels, Y down), preserving aspect ratio with a uniform
//! scale. Unused surface area is left as margin rather than distorting.

use crate::constants::DEFAULT_MAP_SIDE_M;
use crate::types::{MapSnapshot, WorldPoint};

/// World extent of the mapped zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapExtent {
    /// Zone width in meters.
    pub width_m: f64,
    /// Zone height in meters.
    pub height_m: f64,
    /// World origin mapped to the surface's bottom-left corner.
    pub origin: WorldPoint,
}

impl Default for MapExtent {
    fn default() -> Self {
        Self {
            width_m: DEFAULT_MAP_SIDE_M,
            height_m: DEFAULT_MAP_SIDE_M,
            origin: WorldPoint::default(),
        }
    }
}

impl MapExtent {
    /// Builds the extent from a map snapshot, falling back to the default
    /// side length for absent or degenerate dimensions.
    pub fn from_snapshot(snapshot: &MapSnapshot) -> Self {
        Self {
            width_m: sane_dimension(snapshot.width_m),
            height_m: sane_dimension(snapshot.height_m),
            origin: snapshot.origin.unwrap_or_default(),
        }
    }
}

fn sane_dimension(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => DEFAULT_MAP_SIDE_M,
    }
}

/// Pixel size of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    /// Surface width in pixels.
    pub width_px: f32,
    /// Surface height in pixels.
    pub height_px: f32,
}

/// A point on the drawing surface, in pixels with Y increasing downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    /// Horizontal pixel coordinate.
    pub x: f32,
    /// Vertical pixel coordinate (0 at the top).
    pub y: f32,
}

/// Maps a world point onto the surface.
///
/// Scale is `min(surface_w / width_m, surface_h / height_m)` so the whole
/// extent fits. World Y increases upward, surface Y downward, so the Y axis
/// is flipped. Deterministic and side-effect-free; a `None` extent uses
/// [`MapExtent::default`].
///
/// # Arguments
///
/// * `point` - world-space point in meters
/// * `extent` - world extent of the zone, or `None` for the default
/// * `surface` - pixel size of the drawing surface
pub fn world_to_surface(
    point: WorldPoint,
    extent: Option<&MapExtent>,
    surface: SurfaceSize,
) -> SurfacePoint {
    let default_extent = MapExtent::default();
    let extent = extent.unwrap_or(&default_extent);

    let scale_x = surface.width_px as f64 / extent.width_m;
    let scale_y = surface.height_px as f64 / extent.height_m;
    let s = scale_x.min(scale_y);

    SurfacePoint {
        x: ((point.x - extent.origin.x) * s) as f32,
        y: (surface.height_px as f64 - (point.y - extent.origin.y) * s) as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SURFACE: SurfaceSize = SurfaceSize {
        width_px: 400.0,
        height_px: 400.0,
    };

    #[test]
    fn origin_maps_to_bottom_left() {
        let extent = MapExtent {
            width_m: 20.0,
            height_m: 10.0,
            origin: WorldPoint { x: 0.0, y: 0.0 },
        };
        let p = world_to_surface(WorldPoint { x: 0.0, y: 0.0 }, Some(&extent), SURFACE);
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, 400.0);
    }

    #[test]
    fn uniform_scale_uses_smaller_axis() {
        // scale = min(400/20, 400/10) = 20 px/m
        let extent = MapExtent {
            width_m: 20.0,
            height_m: 10.0,
            origin: WorldPoint { x: 0.0, y: 0.0 },
        };
        let p = world_to_surface(WorldPoint { x: 5.0, y: 2.0 }, Some(&extent), SURFACE);
        assert_eq!(p.x, 100.0);
        assert_eq!(p.y, 400.0 - 40.0);
    }

    #[test]
    fn origin_offset_is_subtracted() {
        let extent = MapExtent {
            width_m: 10.0,
            height_m: 10.0,
            origin: WorldPoint { x: -5.0, y: -5.0 },
        };
        let p = world_to_surface(WorldPoint { x: 0.0, y: 0.0 }, Some(&extent), SURFACE);
        assert_eq!(p.x, 200.0);
        assert_eq!(p.y, 200.0);
    }

    #[test]
    fn missing_extent_defaults_to_ten_meters() {
        let p = world_to_surface(WorldPoint { x: 10.0, y: 0.0 }, None, SURFACE);
        assert_eq!(p.x, 400.0);
        assert_eq!(p.y, 400.0);
    }

    #[test]
    fn degenerate_snapshot_dimensions_fall_back() {
        let snapshot = MapSnapshot {
            width_m: Some(0.0),
            height_m: Some(f64::NAN),
            ..Default::default()
        };
        let extent = MapExtent::from_snapshot(&snapshot);
        assert_eq!(extent.width_m, DEFAULT_MAP_SIDE_M);
        assert_eq!(extent.height_m, DEFAULT_MAP_SIDE_M);
    }

    #[test]
    fn transform_is_deterministic() {
        let extent = MapExtent {
            width_m: 17.0,
            height_m: 9.0,
            origin: WorldPoint { x: 1.5, y: -2.5 },
        };
        let point = WorldPoint { x: 3.25, y: 4.75 };
        let a = world_to_surface(point, Some(&extent), SURFACE);
        let b = world_to_surface(point, Some(&extent), SURFACE);
        assert_eq!(a, b);
    }
}
