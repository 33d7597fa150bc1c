//! Keyboard road edits on the hovered segment, played by the demo host.

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use rendering::picking::CursorGroundPos;
use zoning::host::{CursorHit, HostToolChanged, RoadCurve};

use crate::host_edits::{bulldoze_road, rebuild_road, split_road};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEditKind {
    /// Split at the curve parameter nearest the cursor.
    Split { t: f32 },
    Rebuild,
    Bulldoze,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HostEdit {
    pub road: Entity,
    pub kind: HostEditKind,
}

/// Whether the host's active tool is its road tool. Tab toggles it.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostRoadTool(pub bool);

impl Default for HostRoadTool {
    fn default() -> Self {
        Self(true)
    }
}

/// X splits, U rebuilds, Delete bulldozes the hovered road.
pub fn read_host_edit_keys(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut contexts: EguiContexts,
    hit: Res<CursorHit>,
    cursor: Res<CursorGroundPos>,
    roads: Query<&RoadCurve>,
    mut edits: EventWriter<HostEdit>,
) {
    if contexts.ctx_mut().wants_keyboard_input() {
        return;
    }
    let Some(road) = hit.0 else {
        return;
    };

    let kind = if keyboard.just_pressed(KeyCode::KeyX) {
        let t = match (roads.get(road), cursor.0) {
            (Ok(curve), Some(point)) => curve.ground().closest_t(point),
            _ => 0.5,
        };
        HostEditKind::Split { t }
    } else if keyboard.just_pressed(KeyCode::KeyU) {
        HostEditKind::Rebuild
    } else if keyboard.just_pressed(KeyCode::Delete) {
        HostEditKind::Bulldoze
    } else {
        return;
    };
    edits.send(HostEdit { road, kind });
}

pub fn apply_host_edits(world: &mut World) {
    let edits: Vec<HostEdit> = world.resource_mut::<Events<HostEdit>>().drain().collect();
    for edit in edits {
        match edit.kind {
            HostEditKind::Split { t } => {
                split_road(world, edit.road, t);
            }
            HostEditKind::Rebuild => {
                rebuild_road(world, edit.road);
            }
            HostEditKind::Bulldoze => {
                bulldoze_road(world, edit.road);
            }
        }
    }
}

pub fn toggle_host_road_tool(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut tool: ResMut<HostRoadTool>,
    mut changed: EventWriter<HostToolChanged>,
) {
    if keyboard.just_pressed(KeyCode::Tab) {
        tool.0 = !tool.0;
        info!(
            "Demo host: road tool {}",
            if tool.0 { "active" } else { "inactive" }
        );
        changed.send(HostToolChanged {
            zoning_capable: tool.0,
        });
    }
}
