use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::annotate::{
    AnnotationMode, AnnotationTool, CurrentTool, EditSession, HistoryStepRequest,
    SnapshotHistory, ToolSettings,
};
use crate::playback::SubmitAnnotationRequest;

fn tool_button_label(tool: &AnnotationTool) -> &'static str {
    match tool {
        AnnotationTool::Select => "Select",
        AnnotationTool::Pen => "Pen",
        AnnotationTool::Rect => "Rect",
        AnnotationTool::Arrow => "Arrow",
        AnnotationTool::Eraser => "Eraser",
    }
}

/// Palette of (hex value, display name, swatch color)
const PALETTE: [(&str, &str, egui::Color32); 8] = [
    ("#ff3333", "Red", egui::Color32::from_rgb(255, 51, 51)),
    ("#3333ff", "Blue", egui::Color32::from_rgb(51, 51, 255)),
    ("#00cc00", "Green", egui::Color32::from_rgb(0, 204, 0)),
    ("#ffff00", "Yellow", egui::Color32::YELLOW),
    ("#000000", "Black", egui::Color32::BLACK),
    ("#ffffff", "White", egui::Color32::WHITE),
    ("#ff8000", "Orange", egui::Color32::from_rgb(255, 128, 0)),
    ("#800080", "Purple", egui::Color32::from_rgb(128, 0, 128)),
];

/// Main toolbar: tools, stroke settings, history, and the Done hand-off
#[allow(clippy::too_many_arguments)]
pub fn toolbar_ui(
    mut contexts: EguiContexts,
    mut current_tool: ResMut<CurrentTool>,
    mut settings: ResMut<ToolSettings>,
    mut session: ResMut<EditSession>,
    mut history: ResMut<SnapshotHistory>,
    mut history_steps: MessageWriter<HistoryStepRequest>,
    mut submissions: MessageWriter<SubmitAnnotationRequest>,
) -> Result {
    egui::TopBottomPanel::top("main_toolbar")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 8)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 4.0;

                for tool in AnnotationTool::all() {
                    let selected = current_tool.tool == *tool;
                    let button = egui::Button::new(
                        egui::RichText::new(tool_button_label(tool)).size(14.0).strong(),
                    )
                    .min_size(egui::vec2(0.0, 28.0))
                    .selected(selected);

                    let response = ui.add(button);
                    if response.clicked() && current_tool.tool != *tool {
                        session.clear_selection();
                        current_tool.tool = *tool;
                    }
                    response.on_hover_text(tool.display_name());
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                for (hex, name, swatch) in PALETTE {
                    let is_selected = settings.color.eq_ignore_ascii_case(hex);
                    let button = egui::Button::new("")
                        .fill(swatch)
                        .min_size(egui::vec2(18.0, 18.0))
                        .stroke(if is_selected {
                            egui::Stroke::new(2.0, egui::Color32::WHITE)
                        } else {
                            egui::Stroke::new(1.0, egui::Color32::DARK_GRAY)
                        });

                    let response = ui.add(button);
                    if response.clicked() {
                        settings.color = hex.to_string();
                    }
                    response.on_hover_text(name);
                }

                ui.add_space(8.0);
                ui.label("Width:");
                ui.add(
                    egui::DragValue::new(&mut settings.stroke_width)
                        .range(1.0..=20.0)
                        .speed(0.5)
                        .suffix(" px"),
                );

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                if ui
                    .add_enabled(history.can_undo(), egui::Button::new("Undo"))
                    .clicked()
                {
                    history_steps.write(HistoryStepRequest::Undo);
                }
                if ui
                    .add_enabled(history.can_redo(), egui::Button::new("Redo"))
                    .clicked()
                {
                    history_steps.write(HistoryStepRequest::Redo);
                }

                // Right-aligned session controls
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let editing = session.mode == AnnotationMode::Edit;
                    if ui
                        .add_enabled(
                            editing && !session.shapes.is_empty(),
                            egui::Button::new("Done").min_size(egui::vec2(0.0, 24.0)),
                        )
                        .clicked()
                    {
                        submissions.write(SubmitAnnotationRequest);
                    }
                    if ui
                        .add_enabled(editing && !session.shapes.is_empty(), egui::Button::new("Clear"))
                        .clicked()
                    {
                        session.shapes.clear();
                        session.clear_selection();
                        history.push(Vec::new());
                    }
                });
            });
        });
    Ok(())
}
