//! Eraser: proximity-based partial deletion of pen-stroke points.
//!
//! Only pen strokes are erased point-by-point; every other kind is deleted
//! wholesale on a single hit. History gets one entry per erase gesture
//! (pointer-up), not per removed point.

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::config::AppConfig;

use super::geometry::CanvasSurface;
use super::hit_testing::stroke_world_points;
use super::params::{is_cursor_over_ui, PointerParams};
use super::session::{AnnotationMode, EditSession, SessionState};
use super::shape::{Shape, ShapeKind};
use super::tools::{AnnotationTool, CurrentTool};
use crate::annotate::history::SnapshotHistory;

/// Result of applying the eraser to a single pen stroke
#[derive(Debug, Clone, PartialEq)]
pub enum EraseOutcome {
    /// Pointer was not within the radius of any point
    Unchanged,
    /// Some points removed; the surviving flat point sequence
    Trimmed(Vec<f32>),
    /// Too few points survive, the shape goes away entirely
    Deleted,
}

/// Apply one eraser touch to a pen stroke.
///
/// Distances are measured in surface pixels against the live surface, so the
/// effective reach of the eraser is resolution-independent.
pub fn erase_stroke(
    shape: &Shape,
    surface: &CanvasSurface,
    pointer: Vec2,
    radius: f32,
) -> EraseOutcome {
    let ShapeKind::Pen { points } = &shape.kind else {
        return EraseOutcome::Unchanged;
    };

    let world_points = stroke_world_points(shape, surface);
    let min_dist = world_points
        .iter()
        .map(|p| p.distance(pointer))
        .fold(f32::INFINITY, f32::min);

    if min_dist > radius {
        return EraseOutcome::Unchanged;
    }

    // Keep points outside the radius, preserving order. A split gesture
    // renders as a shorter connected path, not two shapes.
    let survivors: Vec<f32> = world_points
        .iter()
        .zip(points.chunks_exact(2))
        .filter(|(world, _)| world.distance(pointer) > radius)
        .flat_map(|(_, pair)| pair.iter().copied())
        .collect();

    if survivors.len() < 4 {
        EraseOutcome::Deleted
    } else {
        EraseOutcome::Trimmed(survivors)
    }
}

/// Pointer system for the eraser tool.
pub fn handle_erase(
    mouse_button: Res<ButtonInput<MouseButton>>,
    current_tool: Res<CurrentTool>,
    mut session: ResMut<EditSession>,
    mut history: ResMut<SnapshotHistory>,
    surface: Res<CanvasSurface>,
    config: Res<AppConfig>,
    pointer: PointerParams,
    mut contexts: EguiContexts,
) {
    if current_tool.tool != AnnotationTool::Eraser {
        // Tool switched away mid-gesture: close out the erase
        if session.finish_erase() {
            history.push(session.shapes.clone());
        }
        return;
    }

    // Stored annotations shown in read mode are immutable
    if matches!(session.mode, AnnotationMode::Read { .. }) {
        return;
    }

    if mouse_button.just_released(MouseButton::Left) {
        if session.finish_erase() {
            history.push(session.shapes.clone());
        }
        return;
    }

    if is_cursor_over_ui(&mut contexts) {
        return;
    }

    let Some(world_pos) = pointer.cursor_world_pos() else {
        return;
    };

    if mouse_button.just_pressed(MouseButton::Left) {
        session.state = SessionState::Erasing { changed: false };
    }

    if mouse_button.pressed(MouseButton::Left)
        && matches!(session.state, SessionState::Erasing { .. })
        && session.erase_at(&surface, world_pos, config.data.eraser_radius)
    {
        session.state = SessionState::Erasing { changed: true };
    }
}
