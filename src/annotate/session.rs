//! The edit session: one owning state machine for authoring annotations.
//!
//! The session holds the live shape set, the in-progress gesture state, and
//! the authoring mode. Tool systems translate pointer/keyboard input into the
//! operations below; everything here is synchronous and UI-framework free so
//! gestures can be unit tested directly.

use bevy::prelude::*;
use uuid::Uuid;

use crate::constants::MIN_PEN_POINT_SPACING;

use super::eraser::{erase_stroke, EraseOutcome};
use super::geometry::CanvasSurface;
use super::hit_testing::{hit_shape, shape_at};
use super::shape::{Point, Shape, ShapeKind, ShapeSet};
use super::tools::AnnotationTool;

/// Gesture state of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    /// A draw tool is mid-gesture on the shape with this id
    Drawing(Uuid),
    /// The eraser is held down; `changed` tracks whether anything was removed
    Erasing { changed: bool },
    /// A shape is selected with the select tool
    Selected(Uuid),
}

/// What the displayed shape set currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnotationMode {
    /// Nothing displayed
    #[default]
    Idle,
    /// A draft being authored; playback matching is suspended
    Edit,
    /// A stored annotation displayed because playback matched its record
    Read { record: Uuid },
}

/// Session-level tool settings; new shapes copy these at creation
#[derive(Resource)]
pub struct ToolSettings {
    pub color: String,
    pub stroke_width: f32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            color: "#ff3333".to_string(),
            stroke_width: 3.0,
        }
    }
}

#[derive(Resource, Default)]
pub struct EditSession {
    pub shapes: ShapeSet,
    pub state: SessionState,
    pub mode: AnnotationMode,
}

impl EditSession {
    /// Switch into edit mode for an authoring gesture. A read-mode display is
    /// discarded first (stored annotations are immutable; drawing starts a
    /// fresh draft). Returns true when a read display was discarded, so the
    /// caller can reset undo history.
    pub fn enter_edit(&mut self) -> bool {
        let was_read = matches!(self.mode, AnnotationMode::Read { .. });
        if was_read {
            self.shapes.clear();
        }
        self.mode = AnnotationMode::Edit;
        was_read
    }

    /// Start a new shape at a normalized point. The session remembers it as
    /// the active draw target until `finish_shape`.
    pub fn begin_shape(&mut self, tool: AnnotationTool, settings: &ToolSettings, start: Point) {
        let shape = match tool {
            AnnotationTool::Pen => Shape::new_pen(&settings.color, settings.stroke_width, start),
            AnnotationTool::Rect => Shape::new_rect(&settings.color, settings.stroke_width, start),
            AnnotationTool::Arrow => {
                Shape::new_arrow(&settings.color, settings.stroke_width, start)
            }
            _ => return,
        };
        self.state = SessionState::Drawing(shape.id);
        self.shapes.push(shape);
    }

    /// Extend the active shape toward the pointer.
    pub fn update_shape(&mut self, surface: &CanvasSurface, world: Vec2) {
        let SessionState::Drawing(id) = self.state else {
            return;
        };
        let norm = surface.world_to_norm(world);
        let Some(shape) = self.shapes.iter_mut().find(|s| s.id == id) else {
            return;
        };

        match &mut shape.kind {
            ShapeKind::Pen { points } => {
                // Skip points closer than the spacing threshold to the last
                // one (reduces point count)
                if let [.., lx, ly] = points.as_slice() {
                    let last = surface.norm_to_world(Point::new(*lx, *ly));
                    if last.distance(world) <= MIN_PEN_POINT_SPACING {
                        return;
                    }
                }
                points.extend([norm.x, norm.y]);
            }
            ShapeKind::Rect { x, y, w, h, .. } => {
                // Origin stays fixed; width/height may be negative until
                // finalize
                *w = norm.x - *x;
                *h = norm.y - *y;
            }
            ShapeKind::Arrow { end_point, .. } => {
                *end_point = norm;
            }
            ShapeKind::Text => {}
        }
    }

    /// Finalize the active shape. Degenerate shapes (a pen click, a rect or
    /// arrow that was never dragged) are discarded rather than committed.
    /// Returns true when a shape was committed.
    pub fn finish_shape(&mut self) -> bool {
        let SessionState::Drawing(id) = self.state else {
            return false;
        };
        self.state = SessionState::Idle;

        let Some(index) = self.shapes.iter().position(|s| s.id == id) else {
            return false;
        };

        let valid = match &mut self.shapes[index].kind {
            ShapeKind::Pen { points } => points.len() >= 4,
            ShapeKind::Rect { x, y, w, h, .. } => {
                // Dragging up-left past the origin stores a flipped origin and
                // non-negative extent
                if *w < 0.0 {
                    *x += *w;
                    *w = -*w;
                }
                if *h < 0.0 {
                    *y += *h;
                    *h = -*h;
                }
                *w > 0.0 && *h > 0.0
            }
            ShapeKind::Arrow { start_point, end_point, .. } => {
                start_point.x != end_point.x || start_point.y != end_point.y
            }
            ShapeKind::Text => false,
        };

        if !valid {
            self.shapes.remove(index);
        }
        valid
    }

    /// Select the topmost shape under the pointer, or clear the selection on
    /// empty canvas. Returns true when something is now selected.
    pub fn select_at(&mut self, surface: &CanvasSurface, world: Vec2) -> bool {
        match shape_at(&self.shapes, surface, world) {
            Some(shape) => {
                self.state = SessionState::Selected(shape.id);
                true
            }
            None => {
                self.clear_selection();
                false
            }
        }
    }

    pub fn clear_selection(&mut self) {
        if matches!(self.state, SessionState::Selected(_)) {
            self.state = SessionState::Idle;
        }
    }

    pub fn selected_shape(&self) -> Option<&Shape> {
        let SessionState::Selected(id) = self.state else {
            return None;
        };
        self.shapes.iter().find(|s| s.id == id)
    }

    /// Remove the selected shape. Returns true when one was removed.
    pub fn delete_selected(&mut self) -> bool {
        let SessionState::Selected(id) = self.state else {
            return false;
        };
        self.state = SessionState::Idle;
        let before = self.shapes.len();
        self.shapes.retain(|s| s.id != id);
        self.shapes.len() != before
    }

    /// Translate the selected shape by a normalized delta, clamped so its
    /// bounding box stays inside the unit square.
    pub fn move_selected(&mut self, dx: f32, dy: f32) -> bool {
        let SessionState::Selected(id) = self.state else {
            return false;
        };
        let Some(shape) = self.shapes.iter_mut().find(|s| s.id == id) else {
            return false;
        };

        let Some((min_x, min_y, max_x, max_y)) = norm_bounds(shape) else {
            return false;
        };
        let dx = dx.clamp(-min_x, 1.0 - max_x);
        let dy = dy.clamp(-min_y, 1.0 - max_y);

        match &mut shape.kind {
            ShapeKind::Pen { points } => {
                for pair in points.chunks_exact_mut(2) {
                    pair[0] += dx;
                    pair[1] += dy;
                }
            }
            ShapeKind::Rect { x, y, .. } => {
                *x += dx;
                *y += dy;
            }
            ShapeKind::Arrow { start_point, end_point, .. } => {
                start_point.x += dx;
                start_point.y += dy;
                end_point.x += dx;
                end_point.y += dy;
            }
            ShapeKind::Text => return false,
        }
        true
    }

    /// Add to the rotation of the selected rect/arrow, in degrees.
    pub fn rotate_selected(&mut self, degrees: f32) -> bool {
        self.with_selected_transform(|t| {
            t.rotation = Some((t.rotation.unwrap_or(0.0) + degrees).rem_euclid(360.0));
        })
    }

    /// Multiply the scale of the selected rect/arrow on both axes.
    pub fn scale_selected(&mut self, factor: f32) -> bool {
        self.with_selected_transform(|t| {
            t.scale_x = Some(t.scale_x.unwrap_or(1.0) * factor);
            t.scale_y = Some(t.scale_y.unwrap_or(1.0) * factor);
        })
    }

    fn with_selected_transform(
        &mut self,
        f: impl FnOnce(&mut super::shape::ShapeTransform),
    ) -> bool {
        let SessionState::Selected(id) = self.state else {
            return false;
        };
        let Some(shape) = self.shapes.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        match &mut shape.kind {
            ShapeKind::Rect { transform, .. } | ShapeKind::Arrow { transform, .. } => {
                f(transform);
                true
            }
            _ => false,
        }
    }

    /// One eraser touch: trim the topmost hit pen stroke, or delete any other
    /// hit shape wholesale. Returns true when the shape set changed.
    pub fn erase_at(&mut self, surface: &CanvasSurface, world: Vec2, radius: f32) -> bool {
        // Topmost touched shape wins; pens keep their trim outcome so it is
        // not recomputed after the scan
        let hit = self
            .shapes
            .iter()
            .enumerate()
            .rev()
            .find_map(|(index, shape)| match shape.kind {
                ShapeKind::Pen { .. } => match erase_stroke(shape, surface, world, radius) {
                    EraseOutcome::Unchanged => None,
                    outcome => Some((index, outcome)),
                },
                // Non-pen shapes are deleted wholesale
                _ => hit_shape(shape, surface, world).then_some((index, EraseOutcome::Deleted)),
            });

        let Some((index, outcome)) = hit else {
            return false;
        };

        match outcome {
            EraseOutcome::Trimmed(survivors) => {
                if let ShapeKind::Pen { points } = &mut self.shapes[index].kind {
                    *points = survivors;
                }
            }
            _ => {
                self.shapes.remove(index);
            }
        }
        true
    }

    /// Display a stored annotation read-only for a matched record.
    pub fn show_read_only(&mut self, shapes: ShapeSet, record: Uuid) {
        self.shapes = shapes;
        self.state = SessionState::Idle;
        self.mode = AnnotationMode::Read { record };
    }

    /// Close out an erase gesture. Returns true when the gesture changed the
    /// shape set (the caller owes a history push).
    pub fn finish_erase(&mut self) -> bool {
        let SessionState::Erasing { changed } = self.state else {
            return false;
        };
        self.state = SessionState::Idle;
        changed
    }

    /// Drop whatever is displayed and return to idle.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.state = SessionState::Idle;
        self.mode = AnnotationMode::Idle;
    }
}

/// Normalized bounding box of a shape's stored geometry (ignores transform)
fn norm_bounds(shape: &Shape) -> Option<(f32, f32, f32, f32)> {
    match &shape.kind {
        ShapeKind::Pen { points } => {
            if points.len() < 2 {
                return None;
            }
            let mut bounds = (f32::MAX, f32::MAX, f32::MIN, f32::MIN);
            for pair in points.chunks_exact(2) {
                bounds.0 = bounds.0.min(pair[0]);
                bounds.1 = bounds.1.min(pair[1]);
                bounds.2 = bounds.2.max(pair[0]);
                bounds.3 = bounds.3.max(pair[1]);
            }
            Some(bounds)
        }
        ShapeKind::Rect { x, y, w, h, .. } => Some((*x, *y, x + w, y + h)),
        ShapeKind::Arrow { start_point, end_point, .. } => Some((
            start_point.x.min(end_point.x),
            start_point.y.min(end_point.y),
            start_point.x.max(end_point.x),
            start_point.y.max(end_point.y),
        )),
        ShapeKind::Text => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_surface() -> CanvasSurface {
        CanvasSurface {
            min: Vec2::new(0.0, 0.0),
            size: Vec2::new(100.0, 100.0),
        }
    }

    fn settings() -> ToolSettings {
        ToolSettings::default()
    }

    /// World point for a normalized coordinate on the test surface
    fn world(surface: &CanvasSurface, x: f32, y: f32) -> Vec2 {
        surface.norm_to_world(Point::new(x, y))
    }

    #[test]
    fn test_pen_gesture_commits() {
        let surface = test_surface();
        let mut session = EditSession::default();

        session.enter_edit();
        session.begin_shape(AnnotationTool::Pen, &settings(), Point::new(0.1, 0.1));
        session.update_shape(&surface, world(&surface, 0.5, 0.5));
        session.update_shape(&surface, world(&surface, 0.9, 0.1));
        assert!(session.finish_shape());

        assert_eq!(session.shapes.len(), 1);
        assert_eq!(session.state, SessionState::Idle);
        let points = session.shapes[0].pen_points().unwrap();
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn test_degenerate_pen_click_is_discarded() {
        let mut session = EditSession::default();
        session.enter_edit();
        session.begin_shape(AnnotationTool::Pen, &settings(), Point::new(0.5, 0.5));
        // Pointer never moved: a single coordinate pair
        assert!(!session.finish_shape());
        assert!(session.shapes.is_empty());
    }

    #[test]
    fn test_rect_dragged_past_origin_flips() {
        let surface = test_surface();
        let mut session = EditSession::default();

        session.enter_edit();
        session.begin_shape(AnnotationTool::Rect, &settings(), Point::new(0.2, 0.2));
        session.update_shape(&surface, world(&surface, 0.1, 0.1));
        assert!(session.finish_shape());

        let ShapeKind::Rect { x, y, w, h, .. } = &session.shapes[0].kind else {
            panic!("expected a rect");
        };
        assert!((x - 0.1).abs() < 1e-5);
        assert!((y - 0.1).abs() < 1e-5);
        assert!((w - 0.1).abs() < 1e-5);
        assert!((h - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_zero_area_rect_is_discarded() {
        let mut session = EditSession::default();
        session.enter_edit();
        session.begin_shape(AnnotationTool::Rect, &settings(), Point::new(0.3, 0.3));
        assert!(!session.finish_shape());
        assert!(session.shapes.is_empty());
    }

    #[test]
    fn test_select_delete_round_trip() {
        let surface = test_surface();
        let mut session = EditSession::default();

        session.enter_edit();
        session.begin_shape(AnnotationTool::Rect, &settings(), Point::new(0.2, 0.2));
        session.update_shape(&surface, world(&surface, 0.8, 0.8));
        session.finish_shape();

        assert!(session.select_at(&surface, world(&surface, 0.5, 0.5)));
        assert!(matches!(session.state, SessionState::Selected(_)));

        assert!(session.delete_selected());
        assert!(session.shapes.is_empty());
        assert_eq!(session.state, SessionState::Idle);
    }

    #[test]
    fn test_select_empty_canvas_clears_selection() {
        let surface = test_surface();
        let mut session = EditSession::default();

        session.enter_edit();
        session.begin_shape(AnnotationTool::Rect, &settings(), Point::new(0.1, 0.1));
        session.update_shape(&surface, world(&surface, 0.3, 0.3));
        session.finish_shape();
        session.select_at(&surface, world(&surface, 0.2, 0.2));

        assert!(!session.select_at(&surface, world(&surface, 0.9, 0.9)));
        assert_eq!(session.state, SessionState::Idle);
    }

    #[test]
    fn test_move_selected_clamps_to_unit_square() {
        let surface = test_surface();
        let mut session = EditSession::default();

        session.enter_edit();
        session.begin_shape(AnnotationTool::Rect, &settings(), Point::new(0.7, 0.7));
        session.update_shape(&surface, world(&surface, 0.9, 0.9));
        session.finish_shape();
        session.select_at(&surface, world(&surface, 0.8, 0.8));

        // Try to push far past the right/bottom edge
        assert!(session.move_selected(0.5, 0.5));
        let ShapeKind::Rect { x, y, w, h, .. } = &session.shapes[0].kind else {
            panic!("expected a rect");
        };
        assert!((x + w - 1.0).abs() < 1e-5);
        assert!((y + h - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_rotate_and_scale_selected() {
        let surface = test_surface();
        let mut session = EditSession::default();

        session.enter_edit();
        session.begin_shape(AnnotationTool::Arrow, &settings(), Point::new(0.2, 0.2));
        session.update_shape(&surface, world(&surface, 0.8, 0.8));
        session.finish_shape();
        session.select_at(&surface, world(&surface, 0.5, 0.5));

        assert!(session.rotate_selected(90.0));
        assert!(session.rotate_selected(-180.0));
        assert!(session.scale_selected(2.0));

        let ShapeKind::Arrow { transform, .. } = &session.shapes[0].kind else {
            panic!("expected an arrow");
        };
        assert_eq!(transform.rotation, Some(270.0));
        assert_eq!(transform.scale_x, Some(2.0));
    }

    #[test]
    fn test_drawing_over_read_display_starts_fresh_draft() {
        let mut session = EditSession::default();
        let record = Uuid::new_v4();
        session.show_read_only(
            vec![Shape::new_pen("#00ff00", 2.0, Point::new(0.5, 0.5))],
            record,
        );

        assert!(session.enter_edit());
        assert!(session.shapes.is_empty());
        assert_eq!(session.mode, AnnotationMode::Edit);
    }

    #[test]
    fn test_erase_at_deletes_rect_wholesale() {
        let surface = test_surface();
        let mut session = EditSession::default();

        session.enter_edit();
        session.begin_shape(AnnotationTool::Rect, &settings(), Point::new(0.2, 0.2));
        session.update_shape(&surface, world(&surface, 0.8, 0.8));
        session.finish_shape();

        assert!(session.erase_at(&surface, world(&surface, 0.5, 0.5), 20.0));
        assert!(session.shapes.is_empty());
    }

    #[test]
    fn test_erase_trims_topmost_pen_and_spares_shape_below() {
        let surface = test_surface();
        let mut session = EditSession::default();

        session.enter_edit();
        session.begin_shape(AnnotationTool::Rect, &settings(), Point::new(0.2, 0.2));
        session.update_shape(&surface, world(&surface, 0.8, 0.8));
        session.finish_shape();
        session.begin_shape(AnnotationTool::Pen, &settings(), Point::new(0.2, 0.5));
        session.update_shape(&surface, world(&surface, 0.5, 0.5));
        session.update_shape(&surface, world(&surface, 0.8, 0.5));
        session.finish_shape();

        // Touch the pen's middle point: the stroke is trimmed, the rect under
        // it is untouched
        assert!(session.erase_at(&surface, world(&surface, 0.5, 0.5), 20.0));
        assert_eq!(session.shapes.len(), 2);
        let points = session.shapes[1].pen_points().unwrap();
        assert_eq!(points.len(), 2);
        assert!(matches!(session.shapes[0].kind, ShapeKind::Rect { .. }));
    }

    #[test]
    fn test_erase_miss_is_noop() {
        let surface = test_surface();
        let mut session = EditSession::default();

        session.enter_edit();
        session.begin_shape(AnnotationTool::Pen, &settings(), Point::new(0.1, 0.1));
        session.update_shape(&surface, world(&surface, 0.2, 0.1));
        session.finish_shape();

        assert!(!session.erase_at(&surface, world(&surface, 0.9, 0.9), 20.0));
        assert_eq!(session.shapes.len(), 1);
    }
}
