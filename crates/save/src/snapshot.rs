//! Moving zoning state between the ECS world and a [`SaveData`].

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;
use zoning::blocks::{Owner, ZoneBlock};
use zoning::commands::{apply_zoning_commands, ZoningCommand, ZoningCommandBuffer};
use zoning::host::{Deleted, RoadCurve, SegmentKey};
use zoning::preference::ZoningPreference;
use zoning::SavedResources;

use crate::save_data::{SaveData, CURRENT_SAVE_VERSION};
use crate::save_error::SaveError;

/// What a load changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Segments whose preference came from the save.
    pub restored: usize,
    /// Segments absent from the save, reset to `Default`.
    pub defaulted: usize,
    /// Saved keys with no matching segment in the world.
    pub orphaned: usize,
    /// Blocks flagged for a direct-lookup sizing pass.
    pub flagged_blocks: usize,
}

/// Snapshot every live segment's preference and the registered saved resources.
pub fn collect_save_data(world: &mut World) -> SaveData {
    let mut q = world.query_filtered::<
        (&SegmentKey, Option<&ZoningPreference>),
        (With<RoadCurve>, Without<Deleted>),
    >();
    let mut preferences: Vec<(u64, u32)> = q
        .iter(world)
        .map(|(key, pref)| (key.0, pref.copied().unwrap_or_default().ordinal()))
        .collect();
    preferences.sort_unstable_by_key(|&(key, _)| key);

    let world: &World = world;
    let extensions = world
        .get_resource::<SavedResources>()
        .map(|registry| registry.encode_all(world))
        .unwrap_or_default();

    SaveData {
        version: CURRENT_SAVE_VERSION,
        preferences,
        extensions,
    }
}

/// Apply a decoded save to the world.
///
/// Extensions load first so restored settings govern the sizing pass.
/// Preferences are matched to segments by [`SegmentKey`] and written through
/// the zoning command buffer, together with a resolution request for every
/// block they own, so the next fixed tick resizes those blocks.
pub fn restore_save_data(world: &mut World, save: &SaveData) -> Result<RestoreReport, SaveError> {
    let registry = world
        .remove_resource::<SavedResources>()
        .ok_or(SaveError::MissingResource("SavedResources"))?;
    let extensions = registry.decode_all(world, &save.extensions);
    debug!("Load: restored {} saved resources", extensions);
    world.insert_resource(registry);

    if !world.contains_resource::<ZoningCommandBuffer>() {
        return Err(SaveError::MissingResource("ZoningCommandBuffer"));
    }

    let saved: HashMap<u64, u32> = save.preferences.iter().copied().collect();
    let segments: Vec<(Entity, u64)> = world
        .query_filtered::<(Entity, &SegmentKey), With<RoadCurve>>()
        .iter(world)
        .map(|(e, key)| (e, key.0))
        .collect();

    let mut report = RestoreReport::default();
    let mut staged = Vec::with_capacity(segments.len());
    let mut matched_keys = HashSet::new();
    for &(segment, key) in &segments {
        let preference = match saved.get(&key) {
            Some(&ordinal) => {
                report.restored += 1;
                matched_keys.insert(key);
                ZoningPreference::from_ordinal(ordinal)
            }
            None => {
                report.defaulted += 1;
                ZoningPreference::Default
            }
        };
        staged.push(ZoningCommand::SetPreference {
            segment,
            preference,
        });
    }
    report.orphaned = saved.keys().filter(|k| !matched_keys.contains(k)).count();

    let owners: HashSet<Entity> = segments.iter().map(|&(e, _)| e).collect();
    let blocks: Vec<Entity> = world
        .query_filtered::<(Entity, &Owner), With<ZoneBlock>>()
        .iter(world)
        .filter(|(_, owner)| owners.contains(&owner.0))
        .map(|(e, _)| e)
        .collect();
    report.flagged_blocks = blocks.len();
    staged.extend(blocks.into_iter().map(ZoningCommand::RequestResolution));

    world.resource_mut::<ZoningCommandBuffer>().extend(staged);
    apply_zoning_commands(world);

    Ok(report)
}
