use std::path::Path;

use bevy::prelude::*;
use bevy::window::PresentMode;
use bevy::winit::{UpdateMode, WinitSettings};

use rendering::camera::{CameraBounds, OrbitCamera};
use zoning::host::HostLifecyclePlugin;
use zoning::{HostEndOfTick, ZoningPlugin, ZoningUpdateSet};

mod agent_mode;
mod agent_protocol;
mod demo_town;
mod host_edits;
mod host_keys;
mod settings_file;

use host_edits::{clear_upgrade_target, SegmentKeyAllocator};
use host_keys::{HostEdit, HostRoadTool};
use settings_file::{load_settings_or_default, SETTINGS_FILE};

fn main() {
    if std::env::args().any(|a| a == "--agent") {
        agent_mode::run_agent_mode();
        return;
    }

    let roads = demo_town::town_layout();
    let (min, max) = demo_town::layout_bounds(&roads);

    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Zoning Toolkit".to_string(),
            resolution: (1280.0, 720.0).into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }))
    .insert_resource(WinitSettings {
        focused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(16)),
        unfocused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(100)),
    })
    // Settings must be in place before ZoningPlugin derives the UI state.
    .insert_resource(load_settings_or_default(Path::new(SETTINGS_FILE)))
    .insert_resource(OrbitCamera::looking_at((min + max) * 0.5))
    .insert_resource(CameraBounds { min, max })
    .init_resource::<SegmentKeyAllocator>()
    .init_resource::<HostRoadTool>()
    .add_event::<HostEdit>()
    .add_plugins((
        ZoningPlugin,
        HostLifecyclePlugin,
        save::SavePlugin,
        rendering::RenderingPlugin,
        ui::UiPlugin,
    ))
    .add_systems(Startup, demo_town::spawn_demo_town)
    .add_systems(
        Update,
        (
            host_keys::toggle_host_road_tool,
            host_keys::read_host_edit_keys,
            host_keys::apply_host_edits,
        )
            .chain()
            .after(ZoningUpdateSet::Apply),
    )
    .add_systems(FixedUpdate, clear_upgrade_target.after(HostEndOfTick));

    app.run();
}
