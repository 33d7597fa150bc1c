//! Road editing helpers for `TestTown`. Each one mirrors a host edit: the old
//! segments are marked deleted and their replacements are spawned in the same
//! tick, so reconciliation sees both.

use bevy::prelude::*;

use crate::blocks::{ZoneBlock, ZoneCells};
use crate::geometry::Bezier3;
use crate::host::{delete_segment, spawn_segment, RoadCurve, SegmentKey, Updated};
use crate::preference::ZoningPreference;

use super::TestTown;

impl TestTown {
    // -----------------------------------------------------------------------
    // Road spawning
    // -----------------------------------------------------------------------

    fn spawn_curve(&mut self, curve: RoadCurve, applied: bool) -> Entity {
        let key = SegmentKey(self.next_key);
        self.next_key += 1;
        let depth = self.depth();
        spawn_segment(self.world_mut(), curve, key, applied, depth)
    }

    /// Spawn a straight road as the product of a committed edit.
    pub fn spawn_road(&mut self, from: Vec2, to: Vec2) -> Entity {
        self.spawn_curve(RoadCurve::straight(from, to), true)
    }

    /// Spawn a straight road that is not the product of a committed edit
    /// (a preview or a map load). It never inherits from deleted neighbours.
    pub fn spawn_preview_road(&mut self, from: Vec2, to: Vec2) -> Entity {
        self.spawn_curve(RoadCurve::straight(from, to), false)
    }

    /// Spawn a road along an arbitrary curve.
    pub fn spawn_curved_road(&mut self, bezier: Bezier3) -> Entity {
        self.spawn_curve(RoadCurve::new(bezier), true)
    }

    /// Spawn a road that already carries `preference`, then tick once so its
    /// blocks are sized and the creation markers are gone.
    pub fn spawn_settled_road(
        &mut self,
        from: Vec2,
        to: Vec2,
        preference: ZoningPreference,
    ) -> Entity {
        let road = self.spawn_road(from, to);
        self.world_mut().entity_mut(road).insert(preference);
        self.tick(1);
        road
    }

    // -----------------------------------------------------------------------
    // Road edits
    // -----------------------------------------------------------------------

    /// Split `road` at parameter `t` into two committed halves.
    pub fn split_road(&mut self, road: Entity, t: f32) -> (Entity, Entity) {
        let curve = self.curve(road);
        delete_segment(self.world_mut(), road);
        let (first, second) = curve.bezier.split(t);
        let a = self.spawn_curve(RoadCurve::new(first), true);
        let b = self.spawn_curve(RoadCurve::new(second), true);
        (a, b)
    }

    /// Replace `first` and `second`, which must meet end to start, with one
    /// straight road spanning both.
    pub fn merge_roads(&mut self, first: Entity, second: Entity) -> Entity {
        let from = self.curve(first).start();
        let to = self.curve(second).end();
        delete_segment(self.world_mut(), first);
        delete_segment(self.world_mut(), second);
        self.spawn_road(from, to)
    }

    /// Rebuild `road` between new endpoints in one edit.
    pub fn replace_road(&mut self, road: Entity, from: Vec2, to: Vec2) -> Entity {
        delete_segment(self.world_mut(), road);
        self.spawn_road(from, to)
    }

    /// Remove `road` with no replacement.
    pub fn bulldoze(&mut self, road: Entity) {
        delete_segment(self.world_mut(), road);
    }

    /// Flag every block of `road` as changed by the host this tick.
    pub fn touch(&mut self, road: Entity) {
        for block in self.blocks_of(road) {
            self.world_mut().entity_mut(block).insert(Updated);
        }
    }

    // -----------------------------------------------------------------------
    // Block state
    // -----------------------------------------------------------------------

    /// Mark cell `(x, z)` of `block` as occupied by a building.
    pub fn occupy(&mut self, block: Entity, x: i32, z: i32) {
        let world = self.world_mut();
        let width = world.get::<ZoneBlock>(block).map_or(0, |b| b.size.x);
        if let Some(mut cells) = world.get_mut::<ZoneCells>(block) {
            cells.set_occupied(width, x, z, true);
        }
    }
}
