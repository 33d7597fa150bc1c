//! Gizmo drawing for road segments, their zoning blocks and the tool's
//! highlights.

use bevy::prelude::*;

use zoning::blocks::{any_cell_occupied, Owner, ValidArea, ZoneBlock, ZoneCells};
use zoning::config::CELL_SIZE;
use zoning::geometry::{side_of, Bezier2, BlockSide};
use zoning::host::{Highlighted, RoadCurve, ROAD_HALF_WIDTH};

const ROAD_COLOR: Color = Color::srgba(0.75, 0.75, 0.78, 1.0);
const HIGHLIGHT_COLOR: Color = Color::srgba(0.2, 0.7, 1.0, 1.0);
const SIDE_A_COLOR: Color = Color::srgba(0.35, 0.8, 0.4, 0.8);
const SIDE_B_COLOR: Color = Color::srgba(0.95, 0.65, 0.25, 0.8);
/// Blocks with no depth show as a faint line along the road edge.
const EMPTY_BLOCK_COLOR: Color = Color::srgba(0.6, 0.6, 0.6, 0.25);
const OCCUPIED_COLOR: Color = Color::srgba(0.9, 0.25, 0.25, 0.9);

const ROAD_SAMPLES: usize = 24;
const ROAD_Y: f32 = 0.2;
const BLOCK_Y: f32 = 0.1;

/// Polyline approximation of a curve on the ground plane.
pub fn curve_points(curve: &Bezier2, samples: usize) -> Vec<Vec2> {
    let samples = samples.max(1);
    (0..=samples)
        .map(|i| curve.evaluate(i as f32 / samples as f32))
        .collect()
}

/// Corners of a block's active rectangle, near edge first.
///
/// The near edge sits on the road edge next to the block; the far edge is
/// `depth` cells further out along the block direction.
pub fn block_corners(curve: &Bezier2, block: &ZoneBlock, depth: i32) -> [Vec2; 4] {
    let position = block.ground_position();
    let road_point = curve.evaluate(curve.closest_t(position));
    let outward = block.direction;
    let along = Vec2::new(-outward.y, outward.x);

    let near_center = road_point + outward * ROAD_HALF_WIDTH;
    let lateral = position - road_point;
    let near_center = near_center + along * lateral.dot(along);

    let half_len = block.size.x as f32 * CELL_SIZE * 0.5;
    let far = outward * depth.max(0) as f32 * CELL_SIZE;
    [
        near_center - along * half_len,
        near_center + along * half_len,
        near_center + along * half_len + far,
        near_center - along * half_len + far,
    ]
}

fn ground(point: Vec2, y: f32) -> Vec3 {
    Vec3::new(point.x, y, point.y)
}

pub fn draw_road_segments(
    mut gizmos: Gizmos,
    roads: Query<(&RoadCurve, Has<Highlighted>)>,
) {
    for (curve, highlighted) in &roads {
        let color = if highlighted { HIGHLIGHT_COLOR } else { ROAD_COLOR };
        let y = if highlighted { ROAD_Y + 0.1 } else { ROAD_Y };
        let points = curve_points(&curve.ground(), ROAD_SAMPLES);
        gizmos.linestrip(points.into_iter().map(|p| ground(p, y)), color);
    }
}

pub fn draw_zone_blocks(
    mut gizmos: Gizmos,
    blocks: Query<(&ZoneBlock, &ValidArea, &Owner, Option<&ZoneCells>)>,
    roads: Query<&RoadCurve>,
) {
    for (block, area, owner, cells) in &blocks {
        let Ok(road) = roads.get(owner.0) else {
            continue;
        };
        let curve = road.ground();
        let corners = block_corners(&curve, block, area.z1);

        if area.is_empty() {
            gizmos.line(
                ground(corners[0], BLOCK_Y),
                ground(corners[1], BLOCK_Y),
                EMPTY_BLOCK_COLOR,
            );
            continue;
        }

        let occupied = cells.is_some_and(|c| any_cell_occupied(&c.0, block.size.x, area));
        let color = if occupied {
            OCCUPIED_COLOR
        } else {
            match side_of(&curve, block.ground_position(), block.direction) {
                BlockSide::SideA => SIDE_A_COLOR,
                BlockSide::SideB => SIDE_B_COLOR,
            }
        };
        for i in 0..4 {
            gizmos.line(
                ground(corners[i], BLOCK_Y),
                ground(corners[(i + 1) % 4], BLOCK_Y),
                color,
            );
        }
        if occupied {
            gizmos.line(ground(corners[0], BLOCK_Y), ground(corners[2], BLOCK_Y), color);
            gizmos.line(ground(corners[1], BLOCK_Y), ground(corners[3], BLOCK_Y), color);
        }
    }
}
