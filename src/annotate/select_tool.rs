//! Pointer and keyboard handling for the select tool: pick, drag, rotate,
//! scale, and delete.

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use super::geometry::CanvasSurface;
use super::history::SnapshotHistory;
use super::params::{is_cursor_over_ui, ui_wants_keyboard, PointerParams};
use super::session::{AnnotationMode, EditSession, SessionState};
use super::tools::{AnnotationTool, CurrentTool};

/// Drag state between frames of a move gesture
#[derive(Resource, Default)]
pub struct DragState {
    last_world: Option<Vec2>,
    moved: bool,
}

pub fn handle_select(
    mouse_button: Res<ButtonInput<MouseButton>>,
    current_tool: Res<CurrentTool>,
    mut session: ResMut<EditSession>,
    mut history: ResMut<SnapshotHistory>,
    mut drag: ResMut<DragState>,
    surface: Res<CanvasSurface>,
    pointer: PointerParams,
    mut contexts: EguiContexts,
) {
    if current_tool.tool != AnnotationTool::Select {
        return;
    }

    // Stored annotations shown in read mode cannot be picked up
    if matches!(session.mode, AnnotationMode::Read { .. }) {
        return;
    }

    if mouse_button.just_released(MouseButton::Left) {
        if drag.moved {
            history.push(session.shapes.clone());
        }
        drag.last_world = None;
        drag.moved = false;
        return;
    }

    if mouse_button.just_pressed(MouseButton::Left) {
        if is_cursor_over_ui(&mut contexts) {
            return;
        }
        let Some(world_pos) = pointer.cursor_world_pos() else {
            return;
        };
        if session.select_at(&surface, world_pos) {
            drag.last_world = Some(world_pos);
            drag.moved = false;
        }
        return;
    }

    if mouse_button.pressed(MouseButton::Left)
        && matches!(session.state, SessionState::Selected(_))
    {
        let Some(world_pos) = pointer.cursor_world_pos() else {
            return;
        };
        let Some(last) = drag.last_world else {
            return;
        };
        let delta = world_pos - last;
        if delta == Vec2::ZERO {
            return;
        }
        // World delta to normalized delta; y flips between conventions
        let dx = delta.x / surface.size.x;
        let dy = -delta.y / surface.size.y;
        if session.move_selected(dx, dy) {
            drag.moved = true;
        }
        drag.last_world = Some(world_pos);
    }
}

pub fn handle_selection_keys(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut session: ResMut<EditSession>,
    mut history: ResMut<SnapshotHistory>,
    mut contexts: EguiContexts,
) {
    if ui_wants_keyboard(&mut contexts) {
        return;
    }
    if !matches!(session.state, SessionState::Selected(_)) {
        return;
    }

    if keyboard.just_pressed(KeyCode::Escape) {
        session.clear_selection();
        return;
    }

    if keyboard.just_pressed(KeyCode::Delete) || keyboard.just_pressed(KeyCode::Backspace) {
        if session.delete_selected() {
            history.push(session.shapes.clone());
        }
        return;
    }

    let mut changed = false;

    if keyboard.just_pressed(KeyCode::KeyR) {
        changed |= session.rotate_selected(90.0);
    }
    if keyboard.just_pressed(KeyCode::BracketLeft) {
        changed |= session.scale_selected(0.9);
    }
    if keyboard.just_pressed(KeyCode::BracketRight) {
        changed |= session.scale_selected(1.1);
    }

    if changed {
        history.push(session.shapes.clone());
    }
}
