use std::path::PathBuf;

use bevy::prelude::*;

use crate::atomic_write::atomic_write;
use crate::save_data::SaveData;
use crate::save_error::SaveError;
use crate::snapshot::{collect_save_data, restore_save_data, RestoreReport};

// ---------------------------------------------------------------------------
// State, resources and events
// ---------------------------------------------------------------------------

/// Save/load runs as exclusive systems on entering these states.
#[derive(States, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SaveLoadState {
    #[default]
    Idle,
    Saving,
    Loading,
}

/// Where quick save and quick load read and write.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct SaveFilePath(pub PathBuf);

impl Default for SaveFilePath {
    fn default() -> Self {
        Self(PathBuf::from("zoning_save.bin"))
    }
}

/// Outcome of the last save or load, for the UI to show.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveStatus {
    pub message: Option<String>,
    pub failed: bool,
}

impl SaveStatus {
    fn ok(&mut self, message: String) {
        info!("{message}");
        self.message = Some(message);
        self.failed = false;
    }

    fn err(&mut self, message: String) {
        error!("{message}");
        self.message = Some(message);
        self.failed = true;
    }
}

/// Bytes read from disk, waiting for the exclusive load system.
#[derive(Resource, Default)]
pub(crate) struct PendingLoadBytes(pub(crate) Option<Vec<u8>>);

#[derive(Event)]
pub struct SaveZoningEvent;

#[derive(Event)]
pub struct LoadZoningEvent;

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Quick save / quick load of per-segment zoning preferences.
///
/// Requires Bevy's `StatesPlugin` (part of `DefaultPlugins`).
pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<SaveLoadState>()
            .add_event::<SaveZoningEvent>()
            .add_event::<LoadZoningEvent>()
            .init_resource::<SaveFilePath>()
            .init_resource::<SaveStatus>()
            .init_resource::<PendingLoadBytes>();

        app.add_systems(Update, (detect_save_event, detect_load_event));

        app.add_systems(OnEnter(SaveLoadState::Saving), exclusive_save);
        app.add_systems(OnEnter(SaveLoadState::Loading), exclusive_load);
    }
}

// ---------------------------------------------------------------------------
// Event detection (lightweight, runs in Update)
// ---------------------------------------------------------------------------

fn detect_save_event(
    mut events: EventReader<SaveZoningEvent>,
    mut next_state: ResMut<NextState<SaveLoadState>>,
) {
    if events.read().next().is_some() {
        // Only one save per frame.
        events.read().for_each(drop);
        next_state.set(SaveLoadState::Saving);
    }
}

fn detect_load_event(
    mut events: EventReader<LoadZoningEvent>,
    mut next_state: ResMut<NextState<SaveLoadState>>,
    mut pending: ResMut<PendingLoadBytes>,
    mut status: ResMut<SaveStatus>,
    path: Res<SaveFilePath>,
) {
    if events.read().next().is_none() {
        return;
    }
    events.read().for_each(drop);
    match std::fs::read(&path.0) {
        Ok(bytes) => {
            pending.0 = Some(bytes);
            next_state.set(SaveLoadState::Loading);
        }
        Err(e) => status.err(format!("Load failed: {}", SaveError::from(e))),
    }
}

// ---------------------------------------------------------------------------
// Exclusive save / load
// ---------------------------------------------------------------------------

/// Write the current world to `path`.
pub fn save_to_path(world: &mut World, path: &std::path::Path) -> Result<usize, SaveError> {
    let save = collect_save_data(world);
    let bytes = save.to_file_bytes();
    atomic_write(path, &bytes)?;
    Ok(save.preferences.len())
}

/// Decode a save file and apply it to the world.
pub fn load_from_bytes(world: &mut World, bytes: &[u8]) -> Result<RestoreReport, SaveError> {
    let save = SaveData::from_file_bytes(bytes)?;
    restore_save_data(world, &save)
}

fn exclusive_save(world: &mut World) {
    let path = world.resource::<SaveFilePath>().0.clone();
    let result = save_to_path(world, &path);
    let mut status = world.resource_mut::<SaveStatus>();
    match result {
        Ok(count) => status.ok(format!(
            "Saved {} segment preferences to {}",
            count,
            path.display()
        )),
        Err(e) => status.err(format!("Save failed: {e}")),
    }

    world
        .resource_mut::<NextState<SaveLoadState>>()
        .set(SaveLoadState::Idle);
}

fn exclusive_load(world: &mut World) {
    let pending = world.resource_mut::<PendingLoadBytes>().0.take();
    let result = match pending {
        Some(bytes) => load_from_bytes(world, &bytes),
        None => Err(SaveError::NoData),
    };

    let mut status = world.resource_mut::<SaveStatus>();
    match result {
        Ok(report) => {
            if report.orphaned > 0 {
                warn!(
                    "Load: {} saved preferences match no segment in this town",
                    report.orphaned
                );
            }
            status.ok(format!(
                "Loaded {} segment preferences ({} defaulted, {} blocks queued)",
                report.restored, report.defaulted, report.flagged_blocks
            ));
        }
        Err(e) => status.err(format!("Load failed: {e}")),
    }

    // Always transition back to Idle, even on error.
    world
        .resource_mut::<NextState<SaveLoadState>>()
        .set(SaveLoadState::Idle);
}
