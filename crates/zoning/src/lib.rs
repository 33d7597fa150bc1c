use bevy::prelude::*;

pub mod blocks;
pub mod commands;
pub mod config;
pub mod geometry;
pub mod host;
pub mod orchestrator;
pub mod preference;
pub mod reconciliation;
pub mod saved_resources;
pub mod simulation_sets;
pub mod sizing;
pub mod tool;
pub mod ui_bridge;

#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use saved_resources::{SavedResource, SavedResources};
pub use simulation_sets::{HostEndOfTick, ZoningSet, ZoningUpdateSet};

use commands::{apply_zoning_commands, ZoningCommandBuffer};
use config::ZoningSettings;
use orchestrator::{
    build_endpoint_index, discard_endpoint_index, resolve_segment_preferences,
    size_requested_blocks, size_updated_blocks, sync_upgrade_mode, zoning_work_pending,
    ResolvedPreferences,
};
use reconciliation::{EndpointIndex, UpgradeMode};
use tool::{run_selection_tool, tool_enabled, ToolInput, ToolStateMachine};
use ui_bridge::{process_ui_commands, track_host_tool, ZoningUiCommand, ZoningUiState};

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Registers the zoning resources, events and systems.
///
/// The host side (lifecycle cleanup, picking, input) is not included; add
/// [`host::HostLifecyclePlugin`] or provide the equivalent.
pub struct ZoningPlugin;

impl Plugin for ZoningPlugin {
    fn build(&self, app: &mut App) {
        simulation_sets::configure(app);

        app.init_resource::<ZoningSettings>()
            .init_resource::<ZoningCommandBuffer>()
            .init_resource::<EndpointIndex>()
            .init_resource::<ResolvedPreferences>()
            .init_resource::<UpgradeMode>()
            .init_resource::<ToolInput>()
            .init_resource::<ToolStateMachine>()
            .init_resource::<host::CursorHit>()
            .init_resource::<ZoningUiState>()
            .add_event::<ZoningUiCommand>()
            .add_event::<host::HostToolChanged>();

        app.add_systems(
            FixedUpdate,
            (
                (sync_upgrade_mode, build_endpoint_index)
                    .chain()
                    .in_set(ZoningSet::Collect),
                resolve_segment_preferences.in_set(ZoningSet::Resolve),
                (size_updated_blocks, size_requested_blocks)
                    .chain()
                    .in_set(ZoningSet::Size),
            )
                .run_if(zoning_work_pending),
        )
        .add_systems(
            FixedUpdate,
            (
                apply_zoning_commands.in_set(ZoningSet::Apply),
                discard_endpoint_index.in_set(ZoningSet::Cleanup),
            ),
        )
        .add_systems(
            Update,
            (
                (track_host_tool, process_ui_commands)
                    .chain()
                    .in_set(ZoningUpdateSet::Input),
                run_selection_tool
                    .run_if(tool_enabled)
                    .in_set(ZoningUpdateSet::Tool),
                apply_zoning_commands.in_set(ZoningUpdateSet::Apply),
            ),
        );

        app.init_resource::<SavedResources>();
        app.world_mut()
            .resource_mut::<SavedResources>()
            .register::<ZoningSettings>();
    }
}

#[cfg(test)]
mod plugin_tests {
    use super::*;

    #[test]
    fn test_plugin_saves_settings() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins).add_plugins(ZoningPlugin);
        let registry = app.world().resource::<SavedResources>();
        assert!(registry.keys().any(|key| key == ZoningSettings::SAVE_KEY));
    }
}
