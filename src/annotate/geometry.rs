//! Coordinate conversions between normalized shape space and the live surface.
//!
//! Shapes are stored in a 0..1 unit square so one annotation renders correctly
//! at any canvas size. The conversions are pure and stateless: callers pass
//! the live surface on every call, so resizing the window never requires
//! touching stored geometry.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::constants::SURFACE_ASPECT_RATIO;

use super::shape::Point;

/// Convert a normalized value to absolute pixels along one axis
pub fn to_absolute(normalized: f32, axis_extent: f32) -> f32 {
    normalized * axis_extent
}

/// Convert an absolute pixel value to normalized along one axis
pub fn to_normalized(pixels: f32, axis_extent: f32) -> f32 {
    pixels / axis_extent
}

/// Convert a flat normalized point sequence (even = x, odd = y) to pixels
pub fn points_to_absolute(points: &[f32], width: f32, height: f32) -> Vec<f32> {
    points
        .iter()
        .enumerate()
        .map(|(i, v)| {
            if i % 2 == 0 {
                to_absolute(*v, width)
            } else {
                to_absolute(*v, height)
            }
        })
        .collect()
}

/// Convert a flat pixel point sequence (even = x, odd = y) to normalized
pub fn points_to_normalized(points: &[f32], width: f32, height: f32) -> Vec<f32> {
    points
        .iter()
        .enumerate()
        .map(|(i, v)| {
            if i % 2 == 0 {
                to_normalized(*v, width)
            } else {
                to_normalized(*v, height)
            }
        })
        .collect()
}

/// The world-space rectangle of the displayed media frame.
///
/// Recomputed from the window every frame; stored shapes never depend on it.
/// Normalized space is y-down (image convention), world space is y-up.
#[derive(Resource, Debug, Clone, Copy)]
pub struct CanvasSurface {
    /// Bottom-left corner in world coordinates
    pub min: Vec2,
    /// Width/height in world units (1 world unit = 1 px at default zoom)
    pub size: Vec2,
}

impl Default for CanvasSurface {
    fn default() -> Self {
        Self {
            min: Vec2::new(-480.0, -270.0),
            size: Vec2::new(960.0, 540.0),
        }
    }
}

impl CanvasSurface {
    /// Normalized point to world coordinates (flips y)
    pub fn norm_to_world(&self, p: Point) -> Vec2 {
        Vec2::new(
            self.min.x + to_absolute(p.x, self.size.x),
            self.min.y + to_absolute(1.0 - p.y, self.size.y),
        )
    }

    /// World coordinates to a normalized point, clamped to the unit square
    pub fn world_to_norm(&self, world: Vec2) -> Point {
        Point::new(
            to_normalized(world.x - self.min.x, self.size.x).clamp(0.0, 1.0),
            (1.0 - to_normalized(world.y - self.min.y, self.size.y)).clamp(0.0, 1.0),
        )
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size / 2.0
    }

    /// Normalized distance corresponding to a pixel distance on the x axis
    pub fn px_to_norm_x(&self, px: f32) -> f32 {
        to_normalized(px, self.size.x)
    }

    /// Normalized distance corresponding to a pixel distance on the y axis
    pub fn px_to_norm_y(&self, px: f32) -> f32 {
        to_normalized(px, self.size.y)
    }
}

/// Margin between the window edges and the surface, in pixels
const SURFACE_MARGIN: f32 = 48.0;

/// Recompute the surface rect from the window size (letterboxed aspect fit).
/// Runs every frame; resize never blocks or re-enters any mutation path.
pub fn update_surface(
    mut surface: ResMut<CanvasSurface>,
    window_query: Query<&Window, With<PrimaryWindow>>,
) {
    let Ok(window) = window_query.single() else {
        return;
    };

    let avail_w = (window.width() - 2.0 * SURFACE_MARGIN).max(1.0);
    let avail_h = (window.height() - 2.0 * SURFACE_MARGIN).max(1.0);

    let (w, h) = if avail_w / avail_h > SURFACE_ASPECT_RATIO {
        (avail_h * SURFACE_ASPECT_RATIO, avail_h)
    } else {
        (avail_w, avail_w / SURFACE_ASPECT_RATIO)
    };

    surface.size = Vec2::new(w, h);
    surface.min = Vec2::new(-w / 2.0, -h / 2.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_conversion_inverts() {
        for v in [0.0_f32, 0.25, 0.5, 0.999, 1.0] {
            for extent in [1.0_f32, 640.0, 1921.0] {
                let back = to_normalized(to_absolute(v, extent), extent);
                assert!((back - v).abs() < 1e-6, "v={} extent={}", v, extent);
            }
        }
    }

    #[test]
    fn test_point_sequence_axes() {
        let abs = points_to_absolute(&[0.5, 0.5], 200.0, 100.0);
        assert_eq!(abs, vec![100.0, 50.0]);

        let norm = points_to_normalized(&abs, 200.0, 100.0);
        assert_eq!(norm, vec![0.5, 0.5]);
    }

    #[test]
    fn test_surface_round_trip() {
        let surface = CanvasSurface {
            min: Vec2::new(-320.0, -180.0),
            size: Vec2::new(640.0, 360.0),
        };
        let p = Point::new(0.3, 0.7);
        let back = surface.world_to_norm(surface.norm_to_world(p));
        assert!((back.x - p.x).abs() < 1e-5);
        assert!((back.y - p.y).abs() < 1e-5);
    }

    #[test]
    fn test_surface_y_is_image_convention() {
        let surface = CanvasSurface {
            min: Vec2::new(-100.0, -100.0),
            size: Vec2::new(200.0, 200.0),
        };
        // Normalized origin is the top-left corner
        let top_left = surface.norm_to_world(Point::new(0.0, 0.0));
        assert_eq!(top_left, Vec2::new(-100.0, 100.0));
        let bottom_right = surface.norm_to_world(Point::new(1.0, 1.0));
        assert_eq!(bottom_right, Vec2::new(100.0, -100.0));
    }

    #[test]
    fn test_world_to_norm_clamps_outside_surface() {
        let surface = CanvasSurface {
            min: Vec2::new(-100.0, -100.0),
            size: Vec2::new(200.0, 200.0),
        };
        let p = surface.world_to_norm(Vec2::new(500.0, -500.0));
        assert_eq!((p.x, p.y), (1.0, 1.0));
    }

    #[test]
    fn test_same_normalized_point_scales_with_surface() {
        let small = CanvasSurface {
            min: Vec2::new(-50.0, -50.0),
            size: Vec2::new(100.0, 100.0),
        };
        let large = CanvasSurface {
            min: Vec2::new(-200.0, -200.0),
            size: Vec2::new(400.0, 400.0),
        };
        let p = Point::new(0.25, 0.25);
        // Same relative position on both surfaces
        assert_eq!(small.norm_to_world(p), Vec2::new(-25.0, 25.0));
        assert_eq!(large.norm_to_world(p), Vec2::new(-100.0, 100.0));
    }
}
