//! Zoning side panel. Shown while the host's active tool builds roads.
//!
//! Reads [`ZoningUiState`] and writes [`ZoningUiCommand`]s; save and load go
//! through the save crate's events.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use save::{LoadZoningEvent, SaveStatus, SaveZoningEvent};
use zoning::config::ZoningSettings;
use zoning::preference::ZoningPreference;
use zoning::ui_bridge::{ZoningUiCommand, ZoningUiState};

use crate::theme::{mode_accent, ERROR_COLOR, HINT_COLOR, OK_COLOR};

/// What a mode does to a road's two sides.
pub fn mode_hint(mode: ZoningPreference) -> &'static str {
    match mode {
        ZoningPreference::Left => "Zone the left side only",
        ZoningPreference::Right => "Zone the right side only",
        ZoningPreference::Default => "Zone both sides",
        ZoningPreference::None => "No zoning on either side",
    }
}

pub fn zoning_panel_ui(
    mut contexts: EguiContexts,
    ui_state: Res<ZoningUiState>,
    status: Res<SaveStatus>,
    mut settings: ResMut<ZoningSettings>,
    mut commands: EventWriter<ZoningUiCommand>,
    mut save_events: EventWriter<SaveZoningEvent>,
    mut load_events: EventWriter<LoadZoningEvent>,
) {
    if !ui_state.visible {
        return;
    }

    egui::Window::new("Zoning")
        .default_width(220.0)
        .resizable(false)
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-8.0, 40.0))
        .show(contexts.ctx_mut(), |ui| {
            let mut enabled = ui_state.tool_enabled;
            if ui.checkbox(&mut enabled, "Selection tool").changed() {
                commands.send(ZoningUiCommand::SetToolEnabled(enabled));
            }
            ui.separator();

            let mut mode = ui_state.mode;
            for option in ZoningPreference::ALL {
                let label = egui::RichText::new(option.as_str()).color(mode_accent(option));
                ui.radio_value(&mut mode, option, label)
                    .on_hover_text(mode_hint(option));
            }
            if mode != ui_state.mode {
                commands.send(ZoningUiCommand::SetMode(mode));
            }
            ui.label(
                egui::RichText::new(mode_hint(ui_state.mode))
                    .color(HINT_COLOR)
                    .size(11.0),
            );

            ui.separator();
            // Only touch the settings on an actual edit, so change detection
            // stays quiet.
            let mut upgrade = settings.upgrade_enabled;
            if ui
                .checkbox(&mut upgrade, "Resize occupied blocks on upgrade")
                .changed()
            {
                settings.upgrade_enabled = upgrade;
            }

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Save (F5)").clicked() {
                    save_events.send(SaveZoningEvent);
                }
                if ui.button("Load (F9)").clicked() {
                    load_events.send(LoadZoningEvent);
                }
            });
            if let Some(message) = &status.message {
                let color = if status.failed { ERROR_COLOR } else { OK_COLOR };
                ui.label(egui::RichText::new(message).color(color).size(11.0));
            }
        });
}
