//! Channels between the toolkit and a UI panel.
//!
//! The panel reads [`ZoningUiState`] and writes [`ZoningUiCommand`] events. It
//! never touches the tool or the preference store directly.

use bevy::prelude::*;

use crate::commands::ZoningCommandBuffer;
use crate::config::ZoningSettings;
use crate::host::HostToolChanged;
use crate::preference::ZoningPreference;
use crate::tool::{disable_tool, enable_tool, ToolStateMachine, ToolWorkingState};

/// Read channel: what the panel should show.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoningUiState {
    /// The active host tool builds roads that get zoning blocks.
    pub visible: bool,
    pub mode: ZoningPreference,
    pub tool_enabled: bool,
}

impl FromWorld for ZoningUiState {
    fn from_world(world: &mut World) -> Self {
        let mode = world
            .get_resource::<ZoningSettings>()
            .map(|s| s.initial_mode)
            .unwrap_or_default();
        Self {
            visible: false,
            mode,
            tool_enabled: false,
        }
    }
}

/// Write channel: requests from the panel.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub enum ZoningUiCommand {
    SetMode(ZoningPreference),
    /// Mode sent as text by a scripted or web panel. Unknown names select
    /// `Default`.
    SetModeByName(String),
    SetToolEnabled(bool),
}

/// Panel visibility follows the host's active tool.
pub fn track_host_tool(mut events: EventReader<HostToolChanged>, mut ui: ResMut<ZoningUiState>) {
    if let Some(last) = events.read().last() {
        if ui.visible != last.zoning_capable {
            ui.visible = last.zoning_capable;
            debug!("Zoning panel visible: {}", ui.visible);
        }
    }
}

/// Apply the panel's requests. Enable/disable requests within one frame
/// collapse to the last one, applied after the mode changes.
pub fn process_ui_commands(
    mut commands: Commands,
    mut events: EventReader<ZoningUiCommand>,
    mut ui: ResMut<ZoningUiState>,
    mut machine: ResMut<ToolStateMachine>,
    mut working: Option<ResMut<ToolWorkingState>>,
    mut buffer: ResMut<ZoningCommandBuffer>,
) {
    let mut requested_enabled = None;
    for event in events.read() {
        match event {
            ZoningUiCommand::SetMode(mode) => set_mode(&mut ui, working.as_deref_mut(), *mode),
            ZoningUiCommand::SetModeByName(name) => {
                let mode = name.parse().unwrap_or_else(|err| {
                    warn!("{}, using Default", err);
                    ZoningPreference::Default
                });
                set_mode(&mut ui, working.as_deref_mut(), mode);
            }
            ZoningUiCommand::SetToolEnabled(enabled) => requested_enabled = Some(*enabled),
        }
    }

    match requested_enabled {
        Some(true) if !ui.tool_enabled => {
            enable_tool(&mut commands, &mut machine, ui.mode);
            ui.tool_enabled = true;
        }
        Some(false) if ui.tool_enabled => {
            if let Some(state) = working.as_deref() {
                disable_tool(&mut commands, &mut machine, state, &mut buffer);
            }
            ui.tool_enabled = false;
        }
        _ => {}
    }
}

fn set_mode(ui: &mut ZoningUiState, working: Option<&mut ToolWorkingState>, mode: ZoningPreference) {
    if ui.mode != mode {
        info!("Zoning mode set to {}", mode);
    }
    ui.mode = mode;
    if let Some(working) = working {
        working.mode = mode;
    }
}
