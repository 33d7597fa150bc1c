//! A small street grid with one curved avenue, some of it already built on.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use zoning::blocks::{Owner, ZoneBlock, ZoneCells};
use zoning::geometry::{Bezier2, Bezier3};
use zoning::host::{HostToolChanged, RoadCurve};

use crate::host_edits::spawn_road;

pub const GRID_LINES: usize = 4;
pub const GRID_SPACING: f32 = 128.0;
const SEED: u64 = 0x5EED_2024;
/// Share of blocks that start with a building on them.
const OCCUPIED_SHARE: f64 = 0.15;

/// Street segments between neighbouring intersections, plus a curved avenue
/// across the south-east corner.
pub fn town_layout() -> Vec<RoadCurve> {
    let mut roads = Vec::new();
    let node = |i: usize, j: usize| Vec2::new(i as f32 * GRID_SPACING, j as f32 * GRID_SPACING);
    for i in 0..GRID_LINES {
        for j in 0..GRID_LINES {
            if i + 1 < GRID_LINES {
                roads.push(RoadCurve::straight(node(i, j), node(i + 1, j)));
            }
            if j + 1 < GRID_LINES {
                roads.push(RoadCurve::straight(node(i, j), node(i, j + 1)));
            }
        }
    }

    let far = (GRID_LINES - 1) as f32 * GRID_SPACING;
    roads.push(RoadCurve::new(Bezier3::from_xz(Bezier2::new(
        Vec2::new(far, far),
        Vec2::new(far + 120.0, far - 40.0),
        Vec2::new(far + 160.0, far + 140.0),
        Vec2::new(far + 60.0, far + 240.0),
    ))));
    roads
}

/// Ground rectangle covering every road.
pub fn layout_bounds(roads: &[RoadCurve]) -> (Vec2, Vec2) {
    let mut min = Vec2::splat(f32::MAX);
    let mut max = Vec2::splat(f32::MIN);
    for road in roads {
        let b = road.ground();
        for p in [b.a, b.b, b.c, b.d] {
            min = min.min(p);
            max = max.max(p);
        }
    }
    if min.x > max.x {
        return (Vec2::ZERO, Vec2::ZERO);
    }
    (min, max)
}

pub fn spawn_demo_town(world: &mut World) {
    let roads = town_layout();
    for curve in &roads {
        spawn_road(world, *curve, false);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let mut blocks = world.query_filtered::<(&ZoneBlock, &mut ZoneCells), With<Owner>>();
    let mut built = 0;
    for (block, mut cells) in blocks.iter_mut(world) {
        if !rng.gen_bool(OCCUPIED_SHARE) {
            continue;
        }
        let x = rng.gen_range(0..block.size.x.max(1));
        let z = rng.gen_range(0..block.size.y.max(1));
        cells.set_occupied(block.size.x, x, z, true);
        built += 1;
    }

    // The demo host starts with its road tool active.
    world.send_event(HostToolChanged {
        zoning_capable: true,
    });
    info!(
        "Demo town: {} roads, {} blocks already built on",
        roads.len(),
        built
    );
}
