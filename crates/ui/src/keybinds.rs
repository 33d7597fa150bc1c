use bevy::prelude::*;
use bevy_egui::EguiContexts;

use save::{LoadZoningEvent, SaveZoningEvent};
use zoning::preference::ZoningPreference;
use zoning::ui_bridge::{ZoningUiCommand, ZoningUiState};

/// Digit keys pick a mode while the panel is visible.
pub fn mode_for_key(key: KeyCode) -> Option<ZoningPreference> {
    match key {
        KeyCode::Digit1 => Some(ZoningPreference::Left),
        KeyCode::Digit2 => Some(ZoningPreference::Right),
        KeyCode::Digit3 => Some(ZoningPreference::Default),
        KeyCode::Digit4 => Some(ZoningPreference::None),
        _ => None,
    }
}

/// F5 saves, F9 loads, Z toggles the tool, 1-4 pick the mode.
pub fn zoning_keybinds(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut contexts: EguiContexts,
    ui_state: Res<ZoningUiState>,
    mut commands: EventWriter<ZoningUiCommand>,
    mut save_events: EventWriter<SaveZoningEvent>,
    mut load_events: EventWriter<LoadZoningEvent>,
) {
    if contexts.ctx_mut().wants_keyboard_input() {
        return;
    }

    if keyboard.just_pressed(KeyCode::F5) {
        save_events.send(SaveZoningEvent);
    }
    if keyboard.just_pressed(KeyCode::F9) {
        load_events.send(LoadZoningEvent);
    }

    if !ui_state.visible {
        return;
    }
    if keyboard.just_pressed(KeyCode::KeyZ) {
        commands.send(ZoningUiCommand::SetToolEnabled(!ui_state.tool_enabled));
    }
    if let Some(mode) = keyboard.get_just_pressed().find_map(|k| mode_for_key(*k)) {
        commands.send(ZoningUiCommand::SetMode(mode));
    }
}
