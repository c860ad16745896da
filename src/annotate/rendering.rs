//! Gizmo rendering of the live shape set, previews, and selection feedback.

use bevy::gizmos::config::{GizmoConfigGroup, GizmoConfigStore};
use bevy::gizmos::prelude::*;
use bevy::prelude::*;

use crate::config::AppConfig;

use super::geometry::CanvasSurface;
use super::hit_testing::{arrow_world_endpoints, rect_world_corners, stroke_world_points};
use super::params::PointerParams;
use super::session::{EditSession, SessionState};
use super::shape::{hex_to_color, Shape, ShapeKind};
use super::tools::{AnnotationTool, CurrentTool};

/// Gizmo group for the annotation overlay
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct OverlayGizmoGroup;

pub fn configure_overlay_gizmos(mut config_store: ResMut<GizmoConfigStore>) {
    let (config, _) = config_store.config_mut::<OverlayGizmoGroup>();
    config.line.width = 3.0;
}

const SURFACE_FRAME_COLOR: Color = Color::srgb(0.35, 0.35, 0.4);
const SELECTION_COLOR: Color = Color::srgb(0.3, 0.7, 1.0);
const ERASER_PREVIEW_COLOR: Color = Color::srgba(1.0, 1.0, 1.0, 0.6);

/// Outline the media surface so the drawable area is visible
pub fn render_surface_frame(
    mut gizmos: Gizmos<OverlayGizmoGroup>,
    surface: Res<CanvasSurface>,
) {
    gizmos.rect_2d(
        Isometry2d::from_translation(surface.center()),
        surface.size,
        SURFACE_FRAME_COLOR,
    );
}

pub fn render_shapes(
    mut gizmos: Gizmos<OverlayGizmoGroup>,
    session: Res<EditSession>,
    surface: Res<CanvasSurface>,
) {
    for shape in &session.shapes {
        draw_shape(&mut gizmos, shape, &surface);
    }
}

fn draw_shape(gizmos: &mut Gizmos<OverlayGizmoGroup>, shape: &Shape, surface: &CanvasSurface) {
    let color = hex_to_color(&shape.color);

    match &shape.kind {
        ShapeKind::Pen { .. } => {
            let points = stroke_world_points(shape, surface);
            for window in points.windows(2) {
                gizmos.line_2d(window[0], window[1], color);
            }
        }
        ShapeKind::Rect { .. } => {
            let Some(corners) = rect_world_corners(shape, surface) else {
                return;
            };
            for i in 0..4 {
                gizmos.line_2d(corners[i], corners[(i + 1) % 4], color);
            }
        }
        ShapeKind::Arrow { .. } => {
            let Some((start, end)) = arrow_world_endpoints(shape, surface) else {
                return;
            };
            gizmos.line_2d(start, end, color);
            draw_arrow_head(gizmos, start, end, color);
        }
        ShapeKind::Text => {}
    }
}

fn draw_arrow_head(
    gizmos: &mut Gizmos<OverlayGizmoGroup>,
    start: Vec2,
    end: Vec2,
    color: Color,
) {
    let dir = end - start;
    if dir.length_squared() < 0.0001 {
        return;
    }
    let head_len = 14.0_f32.min(dir.length() * 0.4);
    let dir = dir.normalize();
    let left = Vec2::from_angle(150.0_f32.to_radians()).rotate(dir) * head_len;
    let right = Vec2::from_angle(-150.0_f32.to_radians()).rotate(dir) * head_len;
    gizmos.line_2d(end, end + left, color);
    gizmos.line_2d(end, end + right, color);
}

/// Highlight the selected shape with markers on its key points
pub fn render_selection(
    mut gizmos: Gizmos<OverlayGizmoGroup>,
    session: Res<EditSession>,
    surface: Res<CanvasSurface>,
) {
    let Some(shape) = session.selected_shape() else {
        return;
    };

    match &shape.kind {
        ShapeKind::Pen { .. } => {
            let points = stroke_world_points(shape, &surface);
            let (Some(first), Some(last)) = (points.first(), points.last()) else {
                return;
            };
            gizmos.circle_2d(Isometry2d::from_translation(*first), 5.0, SELECTION_COLOR);
            gizmos.circle_2d(Isometry2d::from_translation(*last), 5.0, SELECTION_COLOR);
        }
        ShapeKind::Rect { .. } => {
            let Some(corners) = rect_world_corners(shape, &surface) else {
                return;
            };
            for corner in corners {
                gizmos.circle_2d(Isometry2d::from_translation(corner), 5.0, SELECTION_COLOR);
            }
        }
        ShapeKind::Arrow { .. } => {
            let Some((start, end)) = arrow_world_endpoints(shape, &surface) else {
                return;
            };
            gizmos.circle_2d(Isometry2d::from_translation(start), 5.0, SELECTION_COLOR);
            gizmos.circle_2d(Isometry2d::from_translation(end), 5.0, SELECTION_COLOR);
        }
        ShapeKind::Text => {}
    }
}

/// Show the eraser reach as a circle under the cursor
pub fn render_eraser_preview(
    mut gizmos: Gizmos<OverlayGizmoGroup>,
    current_tool: Res<CurrentTool>,
    config: Res<AppConfig>,
    pointer: PointerParams,
) {
    if current_tool.tool != AnnotationTool::Eraser {
        return;
    }
    let Some(world_pos) = pointer.cursor_world_pos() else {
        return;
    };
    gizmos.circle_2d(
        Isometry2d::from_translation(world_pos),
        config.data.eraser_radius,
        ERASER_PREVIEW_COLOR,
    );
}

/// Small dot under the cursor while a draw gesture is in flight
pub fn render_drawing_cursor_hint(
    mut gizmos: Gizmos<OverlayGizmoGroup>,
    session: Res<EditSession>,
    pointer: PointerParams,
) {
    if !matches!(session.state, SessionState::Drawing(_)) {
        return;
    }
    let Some(world_pos) = pointer.cursor_world_pos() else {
        return;
    };
    gizmos.circle_2d(Isometry2d::from_translation(world_pos), 2.0, Color::WHITE);
}
