//! Road edits played by the demo host: spawn, split, rebuild in place and
//! bulldoze. Shared by the interactive keys and the headless agent mode.

use bevy::prelude::*;

use zoning::config::ZoningSettings;
use zoning::host::{delete_segment, spawn_segment, Deleted, RoadCurve, SegmentKey};
use zoning::reconciliation::UpgradeMode;

/// Split parameters closer to an end than this are pulled inward so neither
/// half degenerates.
const MIN_SPLIT_T: f32 = 0.05;

/// Hands out segment keys. Keys are never reused within a session.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentKeyAllocator {
    next: u64,
}

impl Default for SegmentKeyAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl SegmentKeyAllocator {
    pub fn allocate(&mut self) -> SegmentKey {
        let key = SegmentKey(self.next);
        self.next += 1;
        key
    }

    /// Continue after the largest key present, e.g. after a load.
    pub fn bump_past(&mut self, key: SegmentKey) {
        self.next = self.next.max(key.0 + 1);
    }
}

fn block_depth(world: &World) -> i32 {
    world
        .get_resource::<ZoningSettings>()
        .map(ZoningSettings::effective_depth)
        .unwrap_or_default()
}

fn next_key(world: &mut World) -> SegmentKey {
    world
        .get_resource_or_insert_with(SegmentKeyAllocator::default)
        .allocate()
}

/// Spawn a road. `applied` marks it as a committed edit.
pub fn spawn_road(world: &mut World, curve: RoadCurve, applied: bool) -> (Entity, SegmentKey) {
    let key = next_key(world);
    let depth = block_depth(world);
    (spawn_segment(world, curve, key, applied, depth), key)
}

/// Live segment carrying `key`.
pub fn find_segment(world: &mut World, key: SegmentKey) -> Option<Entity> {
    let mut q = world.query_filtered::<(Entity, &SegmentKey), (With<RoadCurve>, Without<Deleted>)>();
    q.iter(world).find(|(_, k)| **k == key).map(|(e, _)| e)
}

/// Replace `road` with two applied halves split at `t`.
pub fn split_road(world: &mut World, road: Entity, t: f32) -> Option<(Entity, Entity)> {
    let curve = *world.get::<RoadCurve>(road)?;
    let t = t.clamp(MIN_SPLIT_T, 1.0 - MIN_SPLIT_T);
    let (first, second) = curve.bezier.split(t);

    delete_segment(world, road);
    let (a, _) = spawn_road(world, RoadCurve::new(first), true);
    let (b, _) = spawn_road(world, RoadCurve::new(second), true);
    info!("Demo host: split {:?} at t={:.2} into {:?} and {:?}", road, t, a, b);
    Some((a, b))
}

/// Rebuild `road` with the same geometry through the upgrade path. The new
/// segment becomes the upgrade target until the end of the next tick.
pub fn rebuild_road(world: &mut World, road: Entity) -> Option<Entity> {
    let curve = *world.get::<RoadCurve>(road)?;
    delete_segment(world, road);
    let (rebuilt, _) = spawn_road(world, curve, true);
    if let Some(mut upgrade) = world.get_resource_mut::<UpgradeMode>() {
        upgrade.target = Some(rebuilt);
    }
    info!("Demo host: rebuilt {:?} as {:?}", road, rebuilt);
    Some(rebuilt)
}

pub fn bulldoze_road(world: &mut World, road: Entity) -> bool {
    if world.get::<RoadCurve>(road).is_none() {
        return false;
    }
    delete_segment(world, road);
    info!("Demo host: bulldozed {:?}", road);
    true
}

/// The upgrade target only lives for the tick that processes it.
pub fn clear_upgrade_target(mut upgrade: ResMut<UpgradeMode>) {
    if upgrade.target.is_some() {
        upgrade.target = None;
    }
}
