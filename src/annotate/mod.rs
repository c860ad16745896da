//! Annotation authoring: tools, gesture state, geometry, and rendering.

pub mod draw_tool;
pub mod eraser;
pub mod geometry;
pub mod history;
pub mod hit_testing;
pub mod params;
pub mod rendering;
pub mod select_tool;
pub mod session;
pub mod shape;
pub mod tools;

pub use geometry::CanvasSurface;
pub use history::{HistoryStepRequest, SnapshotHistory};
pub use session::{AnnotationMode, EditSession, SessionState, ToolSettings};
pub use shape::{Point, Shape, ShapeKind, ShapeSet};
pub use tools::{AnnotationTool, CurrentTool};

use bevy::prelude::*;

pub struct AnnotatePlugin;

impl Plugin for AnnotatePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CurrentTool>()
            .init_resource::<EditSession>()
            .init_resource::<SnapshotHistory>()
            .init_resource::<ToolSettings>()
            .init_resource::<CanvasSurface>()
            .init_resource::<select_tool::DragState>()
            .init_gizmo_group::<rendering::OverlayGizmoGroup>()
            .add_message::<HistoryStepRequest>()
            .add_systems(
                Startup,
                (params::spawn_camera, rendering::configure_overlay_gizmos),
            )
            .add_systems(
                Update,
                (
                    geometry::update_surface,
                    tools::handle_tool_shortcuts,
                    tools::update_cursor_icon,
                    draw_tool::handle_draw,
                    select_tool::handle_select,
                    select_tool::handle_selection_keys,
                    eraser::handle_erase,
                    history::handle_history_shortcuts,
                    history::apply_history_steps,
                ),
            )
            .add_systems(
                Update,
                (
                    rendering::render_surface_frame,
                    rendering::render_shapes,
                    rendering::render_selection,
                    rendering::render_eraser_preview,
                    rendering::render_drawing_cursor_hint,
                ),
            );
    }
}
