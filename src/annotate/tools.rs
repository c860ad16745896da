use bevy::prelude::*;
use bevy::window::{CursorIcon, PrimaryWindow, SystemCursorIcon};
use bevy_egui::EguiContexts;

use super::session::{EditSession, SessionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnotationTool {
    #[default]
    Select,
    Pen,
    Rect,
    Arrow,
    Eraser,
}

impl AnnotationTool {
    pub fn display_name(&self) -> &'static str {
        match self {
            AnnotationTool::Select => "Select (V)",
            AnnotationTool::Pen => "Pen (P)",
            AnnotationTool::Rect => "Rectangle (R)",
            AnnotationTool::Arrow => "Arrow (A)",
            AnnotationTool::Eraser => "Eraser (E)",
        }
    }

    pub fn cursor_icon(&self) -> CursorIcon {
        match self {
            AnnotationTool::Select => CursorIcon::System(SystemCursorIcon::Default),
            AnnotationTool::Pen => CursorIcon::System(SystemCursorIcon::Crosshair),
            AnnotationTool::Rect => CursorIcon::System(SystemCursorIcon::Crosshair),
            AnnotationTool::Arrow => CursorIcon::System(SystemCursorIcon::Crosshair),
            AnnotationTool::Eraser => CursorIcon::System(SystemCursorIcon::Cell),
        }
    }

    pub fn all() -> &'static [AnnotationTool] {
        &[
            AnnotationTool::Select,
            AnnotationTool::Pen,
            AnnotationTool::Rect,
            AnnotationTool::Arrow,
            AnnotationTool::Eraser,
        ]
    }

    /// Tools that create a new shape on pointer-down
    pub fn is_draw_tool(&self) -> bool {
        matches!(
            self,
            AnnotationTool::Pen | AnnotationTool::Rect | AnnotationTool::Arrow
        )
    }
}

#[derive(Resource, Default)]
pub struct CurrentTool {
    pub tool: AnnotationTool,
}

pub fn handle_tool_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut current_tool: ResMut<CurrentTool>,
    mut session: ResMut<EditSession>,
    mut contexts: EguiContexts,
) {
    // Don't change tools if typing in a text field
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.wants_keyboard_input()
    {
        return;
    }

    // R rotates the selection while one exists; it only picks the Rect tool
    // on an empty selection
    let shift = keyboard.pressed(KeyCode::ShiftLeft) || keyboard.pressed(KeyCode::ShiftRight);
    let has_selection = matches!(session.state, SessionState::Selected(_));

    let new_tool = if keyboard.just_pressed(KeyCode::KeyV) || keyboard.just_pressed(KeyCode::KeyS) {
        Some(AnnotationTool::Select)
    } else if keyboard.just_pressed(KeyCode::KeyP) {
        Some(AnnotationTool::Pen)
    } else if keyboard.just_pressed(KeyCode::KeyR) && !shift && !has_selection {
        Some(AnnotationTool::Rect)
    } else if keyboard.just_pressed(KeyCode::KeyA) {
        Some(AnnotationTool::Arrow)
    } else if keyboard.just_pressed(KeyCode::KeyE) {
        Some(AnnotationTool::Eraser)
    } else {
        None
    };

    if let Some(tool) = new_tool {
        // Clear selection when switching tools
        if tool != current_tool.tool {
            session.clear_selection();
        }
        current_tool.tool = tool;
    }
}

pub fn update_cursor_icon(
    current_tool: Res<CurrentTool>,
    mut window_query: Query<Entity, With<PrimaryWindow>>,
    mut commands: Commands,
    mut contexts: EguiContexts,
) {
    let Ok(entity) = window_query.single_mut() else {
        return;
    };

    // Use default cursor over UI, tool cursor over the surface
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.is_pointer_over_area()
    {
        commands
            .entity(entity)
            .insert(CursorIcon::System(SystemCursorIcon::Default));
        return;
    }

    commands.entity(entity).insert(current_tool.tool.cursor_icon());
}
