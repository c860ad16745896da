//! Shape model: the annotation primitives and their persisted layout.
//!
//! All geometry is stored normalized to the 0..1 unit square of the authoring
//! surface; nothing in here knows about pixels. The serde layout below is the
//! wire format handed to the comment store, so field names are frozen.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A normalized 2D point (0..1 on both axes)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Optional transform applied to rect/arrow shapes by selection edits
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeTransform {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f32>,
}

impl ShapeTransform {
    pub fn is_identity(&self) -> bool {
        self.rotation.is_none() && self.scale_x.is_none() && self.scale_y.is_none()
    }
}

/// Kind-specific geometry of a shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ShapeKind {
    /// Freehand stroke: flat point sequence, even indices x, odd indices y
    Pen { points: Vec<f32> },
    /// Axis-aligned rectangle, stored with non-negative width/height
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        #[serde(flatten)]
        transform: ShapeTransform,
    },
    Arrow {
        start_point: Point,
        end_point: Point,
        #[serde(flatten)]
        transform: ShapeTransform,
    },
    /// Reserved; not produced by any tool
    Text,
}

/// One annotation primitive.
///
/// Visual attributes are fixed at creation from the session tool settings;
/// only geometry mutates during authoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub id: Uuid,
    pub color: String,
    pub stroke_width: f32,
    #[serde(flatten)]
    pub kind: ShapeKind,
}

impl Shape {
    pub fn new_pen(color: &str, stroke_width: f32, start: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            color: color.to_string(),
            stroke_width,
            kind: ShapeKind::Pen {
                points: vec![start.x, start.y],
            },
        }
    }

    pub fn new_rect(color: &str, stroke_width: f32, origin: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            color: color.to_string(),
            stroke_width,
            kind: ShapeKind::Rect {
                x: origin.x,
                y: origin.y,
                w: 0.0,
                h: 0.0,
                transform: ShapeTransform::default(),
            },
        }
    }

    pub fn new_arrow(color: &str, stroke_width: f32, start: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            color: color.to_string(),
            stroke_width,
            kind: ShapeKind::Arrow {
                start_point: start,
                end_point: start,
                transform: ShapeTransform::default(),
            },
        }
    }

    /// Normalized points of a pen stroke as coordinate pairs
    pub fn pen_points(&self) -> Option<Vec<Point>> {
        match &self.kind {
            ShapeKind::Pen { points } => Some(
                points
                    .chunks_exact(2)
                    .map(|c| Point::new(c[0], c[1]))
                    .collect(),
            ),
            _ => None,
        }
    }
}

/// The ordered shape collection of one session: insertion order is z-order
/// (later shapes render on top). Unit of undo/redo and persistence.
pub type ShapeSet = Vec<Shape>;

/// Parse a `#rrggbb` color string; unknown formats fall back to red
pub fn hex_to_color(hex: &str) -> Color {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return Color::srgb(1.0, 0.0, 0.0);
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map(|v| v as f32 / 255.0)
            .unwrap_or(0.0)
    };
    Color::srgb(channel(0..2), channel(2..4), channel(4..6))
}

/// Format a color as `#rrggbb`
pub fn color_to_hex(color: Color) -> String {
    let srgba = color.to_srgba();
    format!(
        "#{:02x}{:02x}{:02x}",
        (srgba.red * 255.0).round() as u8,
        (srgba.green * 255.0).round() as u8,
        (srgba.blue * 255.0).round() as u8
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pen_serializes_to_wire_format() {
        let shape = Shape::new_pen("#ff0000", 3.0, Point::new(0.25, 0.5));
        let json = serde_json::to_value(&shape).unwrap();

        assert_eq!(json["type"], "pen");
        assert_eq!(json["color"], "#ff0000");
        assert_eq!(json["strokeWidth"], 3.0);
        assert_eq!(json["points"][0], 0.25);
        assert_eq!(json["points"][1], 0.5);
        // Identity transform must not leak into the payload
        assert!(json.get("rotation").is_none());
    }

    #[test]
    fn test_rect_serializes_with_transform() {
        let mut shape = Shape::new_rect("#0000ff", 2.0, Point::new(0.1, 0.2));
        if let ShapeKind::Rect { w, h, transform, .. } = &mut shape.kind {
            *w = 0.3;
            *h = 0.4;
            transform.rotation = Some(90.0);
            transform.scale_x = Some(1.5);
        }

        let json = serde_json::to_value(&shape).unwrap();
        assert_eq!(json["type"], "rect");
        assert_eq!(json["x"], 0.1);
        assert_eq!(json["w"], 0.3);
        assert_eq!(json["rotation"], 90.0);
        assert_eq!(json["scaleX"], 1.5);
        assert!(json.get("scaleY").is_none());
    }

    #[test]
    fn test_arrow_round_trips() {
        let mut shape = Shape::new_arrow("#00cc00", 4.0, Point::new(0.0, 0.0));
        if let ShapeKind::Arrow { end_point, .. } = &mut shape.kind {
            *end_point = Point::new(0.9, 0.8);
        }

        let json = serde_json::to_string(&shape).unwrap();
        assert!(json.contains("\"startPoint\""));
        assert!(json.contains("\"endPoint\""));

        let parsed: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, shape);
    }

    #[test]
    fn test_pen_points_pairs_up_flat_sequence() {
        let mut shape = Shape::new_pen("#ff0000", 3.0, Point::new(0.1, 0.2));
        if let ShapeKind::Pen { points } = &mut shape.kind {
            points.extend([0.3, 0.4]);
        }
        let pairs = shape.pen_points().unwrap();
        assert_eq!(pairs, vec![Point::new(0.1, 0.2), Point::new(0.3, 0.4)]);
    }

    #[test]
    fn test_hex_color_round_trip() {
        let color = hex_to_color("#3fa7c8");
        assert_eq!(color_to_hex(color), "#3fa7c8");
    }

    #[test]
    fn test_bad_hex_falls_back_to_red() {
        assert_eq!(color_to_hex(hex_to_color("not-a-color")), "#ff0000");
    }
}
