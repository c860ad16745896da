use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::config::AppConfig;
use crate::playback::{
    JumpToRecordRequest, LoadRecordsRequest, MediaKind, PlaybackPosition, PlaybackState,
    RecordStore,
};

fn format_position(position: f64, kind: MediaKind) -> String {
    match kind {
        MediaKind::Continuous { .. } => {
            let minutes = (position / 60.0) as u64;
            let seconds = position % 60.0;
            format!("{}:{:05.2}", minutes, seconds)
        }
        MediaKind::Discrete => format!("#{}", position.round() as i64),
    }
}

/// Side panel listing the loaded review records
pub fn records_panel_ui(
    mut contexts: EguiContexts,
    store: Res<RecordStore>,
    config: Res<AppConfig>,
    media: Res<crate::playback::MediaDescriptor>,
    mut loads: MessageWriter<LoadRecordsRequest>,
    mut jumps: MessageWriter<JumpToRecordRequest>,
) -> Result {
    egui::SidePanel::right("records_panel")
        .default_width(220.0)
        .show(contexts.ctx_mut()?, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.heading("Records");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Open…").clicked() {
                        let mut dialog =
                            rfd::FileDialog::new().add_filter("Review records", &["json"]);
                        if let Some(dir) = config
                            .data
                            .last_records_path
                            .as_deref()
                            .and_then(|p| p.parent())
                        {
                            dialog = dialog.set_directory(dir);
                        }
                        if let Some(path) = dialog.pick_file() {
                            loads.write(LoadRecordsRequest { path });
                        }
                    }
                });
            });
            ui.separator();

            if store.records.is_empty() {
                ui.label(
                    egui::RichText::new("No records loaded").color(egui::Color32::GRAY),
                );
                return;
            }

            egui::ScrollArea::vertical().show(ui, |ui| {
                for record in &store.records {
                    let label = match record.timestamp {
                        Some(ts) => format_position(ts, media.kind),
                        None => "(no position)".to_string(),
                    };
                    let marker = if record.has_drawing() { "✏ " } else { "" };
                    let response =
                        ui.selectable_label(false, format!("{}{}", marker, label));
                    if response.clicked() && record.timestamp.is_some() {
                        jumps.write(JumpToRecordRequest { record: record.id });
                    }
                }
            });
        });
    Ok(())
}

/// Bottom transport bar: play/pause and a scrub slider
pub fn transport_ui(
    mut contexts: EguiContexts,
    mut playback: ResMut<PlaybackState>,
    mut position: ResMut<PlaybackPosition>,
    media: Res<crate::playback::MediaDescriptor>,
) -> Result {
    egui::TopBottomPanel::bottom("transport").show(contexts.ctx_mut()?, |ui| {
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            let label = if playback.playing { "Pause" } else { "Play" };
            if ui.add(egui::Button::new(label).min_size(egui::vec2(56.0, 24.0))).clicked() {
                playback.playing = !playback.playing;
            }

            ui.label(format_position(position.position, media.kind));

            let max = media.duration.max(0.0);
            let slider = egui::Slider::new(&mut position.position, 0.0..=max)
                .show_value(false);
            let response = ui.add(slider);
            if response.dragged() {
                // Scrubbing pauses; correlation picks the new position up on
                // its next evaluation
                playback.playing = false;
            }
        });
        ui.add_space(4.0);
    });
    Ok(())
}
