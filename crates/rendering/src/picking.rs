//! Cursor picking: ray from the camera to the ground plane, then the nearest
//! road segment within [`PICK_RADIUS`].

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use zoning::config::PICK_RADIUS;
use zoning::host::{CursorHit, Deleted, RoadCurve};

use crate::egui_input_guard::egui_wants_pointer;

/// Ground point under the cursor, or `None` when the cursor is outside the
/// window or the ray misses the ground.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct CursorGroundPos(pub Option<Vec2>);

/// Intersect a ray with the `y = 0` plane.
pub fn ground_hit(origin: Vec3, direction: Vec3) -> Option<Vec2> {
    if direction.y.abs() <= 0.001 {
        return None;
    }
    let t = -origin.y / direction.y;
    if t <= 0.0 {
        return None;
    }
    let hit = origin + direction * t;
    Some(Vec2::new(hit.x, hit.z))
}

/// Nearest segment to `point` within `radius`.
pub fn nearest_segment<'a>(
    point: Vec2,
    radius: f32,
    segments: impl IntoIterator<Item = (Entity, &'a RoadCurve)>,
) -> Option<Entity> {
    let mut best: Option<(Entity, f32)> = None;
    for (entity, curve) in segments {
        let (distance, _) = curve.ground().distance(point);
        if distance > radius {
            continue;
        }
        match best {
            Some((_, d)) if d <= distance => {}
            _ => best = Some((entity, distance)),
        }
    }
    best.map(|(entity, _)| entity)
}

pub fn update_cursor_ground_pos(
    windows: Query<&Window>,
    camera_q: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    mut cursor: ResMut<CursorGroundPos>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Ok((camera, cam_transform)) = camera_q.get_single() else {
        return;
    };

    let hit = window
        .cursor_position()
        .and_then(|screen_pos| camera.viewport_to_world(cam_transform, screen_pos).ok())
        .and_then(|ray| ground_hit(ray.origin, *ray.direction));
    if cursor.0 != hit {
        cursor.0 = hit;
    }
}

/// Write the segment under the cursor for the selection tool. Nothing is hit
/// while egui owns the pointer.
pub fn update_cursor_hit(
    mut contexts: EguiContexts,
    cursor: Res<CursorGroundPos>,
    segments: Query<(Entity, &RoadCurve), Without<Deleted>>,
    mut hit: ResMut<CursorHit>,
) {
    let picked = match cursor.0 {
        Some(point) if !egui_wants_pointer(&mut contexts) => {
            nearest_segment(point, PICK_RADIUS, segments.iter())
        }
        _ => None,
    };
    if hit.0 != picked {
        hit.0 = picked;
    }
}
