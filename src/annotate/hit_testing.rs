//! Hit testing for detecting pointer presses on shapes.
//!
//! Shapes store normalized geometry, so every test first projects through the
//! live surface into world space and works in pixels there.

use bevy::prelude::*;

use super::geometry::CanvasSurface;
use super::shape::{Point, Shape, ShapeKind, ShapeTransform};

/// Check if a point is within a given distance of a line segment
pub fn point_near_segment(point: Vec2, seg_start: Vec2, seg_end: Vec2, threshold: f32) -> bool {
    let line_vec = seg_end - seg_start;
    let line_len_sq = line_vec.length_squared();

    if line_len_sq < 0.0001 {
        // Segment is essentially a point
        return point.distance(seg_start) <= threshold;
    }

    // Project point onto line, clamped to segment
    let t = ((point - seg_start).dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    let projection = seg_start + line_vec * t;

    point.distance(projection) <= threshold
}

fn hit_threshold(stroke_width: f32) -> f32 {
    // Hit area is at least 8px
    (stroke_width * 2.0).max(8.0)
}

/// World-space points of a pen stroke
pub fn stroke_world_points(shape: &Shape, surface: &CanvasSurface) -> Vec<Vec2> {
    shape
        .pen_points()
        .map(|points| points.iter().map(|p| surface.norm_to_world(*p)).collect())
        .unwrap_or_default()
}

fn apply_transform(point: Vec2, center: Vec2, transform: &ShapeTransform) -> Vec2 {
    let scaled = Vec2::new(
        (point.x - center.x) * transform.scale_x.unwrap_or(1.0),
        (point.y - center.y) * transform.scale_y.unwrap_or(1.0),
    );
    let angle = -transform.rotation.unwrap_or(0.0).to_radians();
    let (sin_a, cos_a) = angle.sin_cos();
    center
        + Vec2::new(
            scaled.x * cos_a - scaled.y * sin_a,
            scaled.x * sin_a + scaled.y * cos_a,
        )
}

/// World-space corners of a rect shape, transform applied, winding
/// top-left, top-right, bottom-right, bottom-left
pub fn rect_world_corners(shape: &Shape, surface: &CanvasSurface) -> Option<[Vec2; 4]> {
    let ShapeKind::Rect { x, y, w, h, transform } = &shape.kind else {
        return None;
    };

    let corners = [
        surface.norm_to_world(Point::new(*x, *y)),
        surface.norm_to_world(Point::new(x + w, *y)),
        surface.norm_to_world(Point::new(x + w, y + h)),
        surface.norm_to_world(Point::new(*x, y + h)),
    ];
    let center = (corners[0] + corners[2]) / 2.0;
    Some(corners.map(|c| apply_transform(c, center, transform)))
}

/// World-space endpoints of an arrow shape, transform applied
pub fn arrow_world_endpoints(shape: &Shape, surface: &CanvasSurface) -> Option<(Vec2, Vec2)> {
    let ShapeKind::Arrow { start_point, end_point, transform } = &shape.kind else {
        return None;
    };

    let start = surface.norm_to_world(*start_point);
    let end = surface.norm_to_world(*end_point);
    let center = (start + end) / 2.0;
    Some((
        apply_transform(start, center, transform),
        apply_transform(end, center, transform),
    ))
}

/// Check if a world-space point hits a shape
pub fn hit_shape(shape: &Shape, surface: &CanvasSurface, point: Vec2) -> bool {
    let threshold = hit_threshold(shape.stroke_width);

    match &shape.kind {
        ShapeKind::Pen { .. } => {
            let points = stroke_world_points(shape, surface);
            if points.len() == 1 {
                return point.distance(points[0]) <= threshold;
            }
            points
                .windows(2)
                .any(|w| point_near_segment(point, w[0], w[1], threshold))
        }
        ShapeKind::Rect { .. } => {
            let Some(corners) = rect_world_corners(shape, surface) else {
                return false;
            };
            // Near any edge, or inside the (possibly rotated) quad
            let on_edge = (0..4).any(|i| {
                point_near_segment(point, corners[i], corners[(i + 1) % 4], threshold)
            });
            on_edge || point_in_quad(point, &corners)
        }
        ShapeKind::Arrow { .. } => {
            let Some((start, end)) = arrow_world_endpoints(shape, surface) else {
                return false;
            };
            point_near_segment(point, start, end, threshold)
        }
        ShapeKind::Text => false,
    }
}

/// Topmost shape under the pointer, honoring z-order (later = on top)
pub fn shape_at<'a>(
    shapes: &'a [Shape],
    surface: &CanvasSurface,
    point: Vec2,
) -> Option<&'a Shape> {
    shapes.iter().rev().find(|s| hit_shape(s, surface, point))
}

fn point_in_quad(point: Vec2, corners: &[Vec2; 4]) -> bool {
    // Same-side test against each edge of the convex quad
    let mut sign = 0.0_f32;
    for i in 0..4 {
        let edge = corners[(i + 1) % 4] - corners[i];
        let to_point = point - corners[i];
        let cross = edge.x * to_point.y - edge.y * to_point.x;
        if cross.abs() < f32::EPSILON {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::shape::Shape;

    fn test_surface() -> CanvasSurface {
        CanvasSurface {
            min: Vec2::new(-100.0, -100.0),
            size: Vec2::new(200.0, 200.0),
        }
    }

    #[test]
    fn test_point_near_segment() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert!(point_near_segment(Vec2::new(5.0, 2.0), a, b, 3.0));
        assert!(!point_near_segment(Vec2::new(5.0, 5.0), a, b, 3.0));
        // Beyond the segment end, distance is measured to the endpoint
        assert!(!point_near_segment(Vec2::new(15.0, 0.0), a, b, 3.0));
    }

    #[test]
    fn test_hit_pen_stroke() {
        let surface = test_surface();
        let mut shape = Shape::new_pen("#ff0000", 3.0, Point::new(0.0, 0.5));
        if let ShapeKind::Pen { points } = &mut shape.kind {
            points.extend([1.0, 0.5]);
        }
        // Horizontal stroke across the middle of the surface
        assert!(hit_shape(&shape, &surface, Vec2::new(0.0, 0.0)));
        assert!(!hit_shape(&shape, &surface, Vec2::new(0.0, 50.0)));
    }

    #[test]
    fn test_hit_rect_interior_and_miss() {
        let surface = test_surface();
        let mut shape = Shape::new_rect("#ff0000", 3.0, Point::new(0.25, 0.25));
        if let ShapeKind::Rect { w, h, .. } = &mut shape.kind {
            *w = 0.5;
            *h = 0.5;
        }
        assert!(hit_shape(&shape, &surface, Vec2::new(0.0, 0.0)));
        assert!(!hit_shape(&shape, &surface, Vec2::new(90.0, 90.0)));
    }

    #[test]
    fn test_hit_arrow() {
        let surface = test_surface();
        let mut shape = Shape::new_arrow("#ff0000", 3.0, Point::new(0.0, 0.0));
        if let ShapeKind::Arrow { end_point, .. } = &mut shape.kind {
            *end_point = Point::new(1.0, 1.0);
        }
        // Diagonal from top-left to bottom-right passes through the origin
        assert!(hit_shape(&shape, &surface, Vec2::new(0.0, 0.0)));
        assert!(!hit_shape(&shape, &surface, Vec2::new(-90.0, -90.0)));
    }

    #[test]
    fn test_shape_at_prefers_topmost() {
        let surface = test_surface();
        let mut bottom = Shape::new_rect("#ff0000", 3.0, Point::new(0.1, 0.1));
        if let ShapeKind::Rect { w, h, .. } = &mut bottom.kind {
            *w = 0.8;
            *h = 0.8;
        }
        let mut top = Shape::new_rect("#0000ff", 3.0, Point::new(0.4, 0.4));
        if let ShapeKind::Rect { w, h, .. } = &mut top.kind {
            *w = 0.2;
            *h = 0.2;
        }
        let top_id = top.id;
        let shapes = vec![bottom, top];

        let hit = shape_at(&shapes, &surface, Vec2::new(0.0, 0.0)).unwrap();
        assert_eq!(hit.id, top_id);
    }

    #[test]
    fn test_rotated_rect_hit() {
        let surface = test_surface();
        let mut shape = Shape::new_rect("#ff0000", 3.0, Point::new(0.4, 0.45));
        if let ShapeKind::Rect { w, h, transform, .. } = &mut shape.kind {
            *w = 0.2;
            *h = 0.1;
            transform.rotation = Some(90.0);
        }
        // After rotating the wide-flat rect by 90 degrees, a point above the
        // center (inside the rotated extent, outside the unrotated one) hits.
        assert!(hit_shape(&shape, &surface, Vec2::new(0.0, 15.0)));
    }
}
