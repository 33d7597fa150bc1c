//! The host simulation's side of the contract.
//!
//! Road segments, zoning blocks, lifecycle markers and cursor picking belong to
//! the host. They are modelled here as plain components and resources so the
//! toolkit can run headless in tests and inside the demo app.

use bevy::prelude::*;

use crate::blocks::{Owner, ValidArea, ZoneBlock, ZoneCells};
use crate::config::CELL_SIZE;
use crate::geometry::{Bezier2, Bezier3};
use crate::simulation_sets::HostEndOfTick;

/// Road segment geometry.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct RoadCurve {
    pub bezier: Bezier3,
    pub length: f32,
}

impl RoadCurve {
    pub fn new(bezier: Bezier3) -> Self {
        Self {
            length: bezier.xz().arc_length(),
            bezier,
        }
    }

    pub fn straight(from: Vec2, to: Vec2) -> Self {
        Self::new(Bezier3::from_xz(Bezier2::straight(from, to)))
    }

    pub fn ground(&self) -> Bezier2 {
        self.bezier.xz()
    }

    pub fn start(&self) -> Vec2 {
        self.ground().a
    }

    pub fn end(&self) -> Vec2 {
        self.ground().d
    }
}

/// Stable identity of a segment across save/load. Entities are reallocated on
/// load, keys are not.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentKey(pub u64);

/// Spawned this tick.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Created;

/// Changed this tick.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Updated;

/// Product of a committed road edit this tick.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Applied;

/// Removed at the end of this tick.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Deleted;

/// Render hint: draw the entity highlighted.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Highlighted;

/// Entity under the cursor, written by the host's picking each frame.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorHit(pub Option<Entity>);

/// Sent by the host when the active tool changes.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostToolChanged {
    /// The new tool places roads that get zoning blocks.
    pub zoning_capable: bool,
}

/// Cells along the road covered by one generated block.
pub const BLOCK_CELLS_ALONG: i32 = 4;

/// Gap between the road centerline and the near edge of its blocks.
pub const ROAD_HALF_WIDTH: f32 = 4.0;

/// Blocks along both sides of `curve`, each `depth` cells deep.
///
/// Block positions sit at the block center, offset from the curve along its
/// perpendicular. Directions point away from the road, so the `(tangent.y,
/// -tangent.x)` side gets the positive perpendicular.
pub fn block_rows_along(curve: &Bezier2, depth: i32) -> Vec<(ZoneBlock, ValidArea, ZoneCells)> {
    let block_len = BLOCK_CELLS_ALONG as f32 * CELL_SIZE;
    let count = (curve.arc_length() / block_len).floor().max(1.0) as usize;
    let offset = ROAD_HALF_WIDTH + depth.max(1) as f32 * CELL_SIZE * 0.5;

    let mut blocks = Vec::with_capacity(count * 2);
    for i in 0..count {
        let t = (i as f32 + 0.5) / count as f32;
        let point = curve.evaluate(t);
        let tangent = curve.tangent(t);
        let perpendicular = Vec2::new(tangent.y, -tangent.x).normalize_or_zero();
        if perpendicular == Vec2::ZERO {
            continue;
        }
        for direction in [perpendicular, -perpendicular] {
            let center = point + direction * offset;
            blocks.push((
                ZoneBlock {
                    position: Vec3::new(center.x, 0.0, center.y),
                    direction,
                    size: IVec2::new(BLOCK_CELLS_ALONG, depth),
                },
                ValidArea::new(0, BLOCK_CELLS_ALONG, 0, depth),
                ZoneCells::empty(BLOCK_CELLS_ALONG, depth),
            ));
        }
    }
    blocks
}

/// Spawn a segment and its blocks with creation markers.
///
/// `applied` marks the segment as the product of a committed edit, which is
/// what makes it eligible for endpoint reconciliation.
pub fn spawn_segment(
    world: &mut World,
    curve: RoadCurve,
    key: SegmentKey,
    applied: bool,
    depth: i32,
) -> Entity {
    let segment = world.spawn((curve, key, Created)).id();
    if applied {
        world.entity_mut(segment).insert(Applied);
    }
    for (block, area, cells) in block_rows_along(&curve.ground(), depth) {
        world.spawn((block, area, cells, Owner(segment), Created));
    }
    segment
}

/// Mark a segment and every block it owns for removal this tick.
pub fn delete_segment(world: &mut World, segment: Entity) {
    if !world.entities().contains(segment) {
        return;
    }
    let mut owned = world.query_filtered::<(Entity, &Owner), With<ZoneBlock>>();
    let blocks: Vec<Entity> = owned
        .iter(world)
        .filter(|(_, owner)| owner.0 == segment)
        .map(|(e, _)| e)
        .collect();
    world.entity_mut(segment).insert(Deleted);
    for block in blocks {
        world.entity_mut(block).insert(Deleted);
    }
}

/// Plays the host's end-of-tick role: removes deleted entities and clears the
/// per-tick lifecycle markers.
pub struct HostLifecyclePlugin;

impl Plugin for HostLifecyclePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CursorHit>()
            .add_event::<HostToolChanged>()
            .add_systems(
                FixedUpdate,
                (despawn_deleted, clear_lifecycle_markers)
                    .chain()
                    .in_set(HostEndOfTick),
            );
    }
}

fn despawn_deleted(mut commands: Commands, deleted: Query<Entity, With<Deleted>>) {
    for entity in &deleted {
        commands.entity(entity).despawn();
    }
}

#[allow(clippy::type_complexity)]
fn clear_lifecycle_markers(
    mut commands: Commands,
    marked: Query<Entity, (Or<(With<Created>, With<Updated>, With<Applied>)>, Without<Deleted>)>,
) {
    for entity in &marked {
        commands
            .entity(entity)
            .remove::<(Created, Updated, Applied)>();
    }
}
