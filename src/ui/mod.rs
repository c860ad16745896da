mod records_panel;
mod toolbar;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        // Side panel renders first so the top and bottom bars fit beside it
        app.add_systems(
            EguiPrimaryContextPass,
            (
                records_panel::records_panel_ui,
                toolbar::toolbar_ui,
                records_panel::transport_ui,
            )
                .chain(),
        );
    }
}
