//! Pointer handling for the pen, rect, and arrow tools.

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use super::geometry::CanvasSurface;
use super::history::SnapshotHistory;
use super::params::{is_cursor_over_ui, PointerParams};
use super::session::{EditSession, SessionState, ToolSettings};
use super::tools::CurrentTool;

pub fn handle_draw(
    mouse_button: Res<ButtonInput<MouseButton>>,
    current_tool: Res<CurrentTool>,
    settings: Res<ToolSettings>,
    mut session: ResMut<EditSession>,
    mut history: ResMut<SnapshotHistory>,
    surface: Res<CanvasSurface>,
    pointer: PointerParams,
    mut contexts: EguiContexts,
) {
    if !current_tool.tool.is_draw_tool() {
        // Tool switched away mid-gesture: commit what we have
        if matches!(session.state, SessionState::Drawing(_)) && session.finish_shape() {
            history.push(session.shapes.clone());
        }
        return;
    }

    if mouse_button.just_released(MouseButton::Left) {
        if session.finish_shape() {
            history.push(session.shapes.clone());
        }
        return;
    }

    if mouse_button.just_pressed(MouseButton::Left) {
        if is_cursor_over_ui(&mut contexts) {
            return;
        }
        let Some(world_pos) = pointer.cursor_world_pos() else {
            return;
        };
        // Drawing over a read-only display discards it and starts a draft
        if session.enter_edit() {
            history.reset();
        }
        let start = surface.world_to_norm(world_pos);
        session.begin_shape(current_tool.tool, &settings, start);
        return;
    }

    if mouse_button.pressed(MouseButton::Left)
        && matches!(session.state, SessionState::Drawing(_))
    {
        let Some(world_pos) = pointer.cursor_world_pos() else {
            return;
        };
        session.update_shape(&surface, world_pos);
    }
}
