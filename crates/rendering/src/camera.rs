use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

const PAN_SPEED: f32 = 500.0;
const ZOOM_SPEED: f32 = 0.15;
const MIN_DISTANCE: f32 = 20.0;
const MAX_DISTANCE: f32 = 2000.0;
const MIN_PITCH: f32 = 10.0 * std::f32::consts::PI / 180.0;
const MAX_PITCH: f32 = 85.0 * std::f32::consts::PI / 180.0;
const ROTATE_SPEED: f32 = 1.5;
/// How far the focus may wander from the town's bounds.
const FOCUS_MARGIN: f32 = 200.0;

/// Orbital camera model: camera orbits around a focus point on the ground.
#[derive(Resource, Debug, Clone, Copy)]
pub struct OrbitCamera {
    /// Ground point the camera looks at
    pub focus: Vec3,
    /// Horizontal rotation in radians
    pub yaw: f32,
    /// Elevation angle in radians (clamped between MIN_PITCH and MAX_PITCH)
    pub pitch: f32,
    /// Distance from focus point
    pub distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            focus: Vec3::ZERO,
            yaw: 0.0,
            pitch: 55.0_f32.to_radians(),
            distance: 400.0,
        }
    }
}

impl OrbitCamera {
    pub fn looking_at(focus: Vec2) -> Self {
        Self {
            focus: Vec3::new(focus.x, 0.0, focus.y),
            ..default()
        }
    }
}

/// Ground rectangle the camera focus is kept near. The app sets it to the
/// extent of its roads.
#[derive(Resource, Debug, Clone, Copy)]
pub struct CameraBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for CameraBounds {
    fn default() -> Self {
        Self {
            min: Vec2::splat(-1000.0),
            max: Vec2::splat(1000.0),
        }
    }
}

#[derive(Resource, Default)]
pub struct CameraDrag {
    pub dragging: bool,
    pub last_pos: Vec2,
}

pub fn setup_camera(mut commands: Commands, orbit: Option<Res<OrbitCamera>>) {
    let orbit = orbit.map(|o| *o).unwrap_or_default();
    let (pos, look_at) = orbit_to_transform(&orbit);

    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(pos).looking_at(look_at, Vec3::Y),
    ));
    commands.insert_resource(orbit);
}

fn clamp_focus(focus: &mut Vec3, bounds: &CameraBounds) {
    focus.x = focus
        .x
        .clamp(bounds.min.x - FOCUS_MARGIN, bounds.max.x + FOCUS_MARGIN);
    focus.z = focus
        .z
        .clamp(bounds.min.y - FOCUS_MARGIN, bounds.max.y + FOCUS_MARGIN);
}

pub(crate) fn orbit_to_transform(orbit: &OrbitCamera) -> (Vec3, Vec3) {
    // Spherical to cartesian offset from focus
    let x = orbit.distance * orbit.pitch.cos() * orbit.yaw.sin();
    let y = orbit.distance * orbit.pitch.sin();
    let z = orbit.distance * orbit.pitch.cos() * orbit.yaw.cos();
    (orbit.focus + Vec3::new(x, y, z), orbit.focus)
}

/// Rotate a screen-space pan direction by the camera yaw.
fn pan_on_ground(dir: Vec2, yaw: f32) -> Vec2 {
    let (sin_yaw, cos_yaw) = yaw.sin_cos();
    Vec2::new(
        dir.x * cos_yaw + dir.y * sin_yaw,
        -dir.x * sin_yaw + dir.y * cos_yaw,
    )
}

/// System: apply OrbitCamera state to the actual camera Transform.
pub fn apply_orbit_camera(
    orbit: Res<OrbitCamera>,
    mut query: Query<&mut Transform, With<Camera3d>>,
) {
    if !orbit.is_changed() {
        return;
    }
    let (pos, look_at) = orbit_to_transform(&orbit);
    let Ok(mut transform) = query.get_single_mut() else {
        return;
    };
    *transform = Transform::from_translation(pos).looking_at(look_at, Vec3::Y);
}

/// WASD/Arrow keys pan the focus, Q/E rotate around it.
pub fn camera_keyboard(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    bounds: Res<CameraBounds>,
    mut orbit: ResMut<OrbitCamera>,
) {
    let mut dir = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyW) || keys.pressed(KeyCode::ArrowUp) {
        dir.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyS) || keys.pressed(KeyCode::ArrowDown) {
        dir.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft) {
        dir.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight) {
        dir.x += 1.0;
    }

    if dir != Vec2::ZERO {
        let delta = PAN_SPEED * (orbit.distance / 1000.0) * time.delta_secs();
        let ground = pan_on_ground(dir.normalize(), orbit.yaw) * delta;
        orbit.focus.x += ground.x;
        orbit.focus.z += ground.y;
        clamp_focus(&mut orbit.focus, &bounds);
    }

    let mut spin = 0.0;
    if keys.pressed(KeyCode::KeyQ) {
        spin -= 1.0;
    }
    if keys.pressed(KeyCode::KeyE) {
        spin += 1.0;
    }
    if spin != 0.0 {
        orbit.yaw += spin * ROTATE_SPEED * time.delta_secs();
    }
}

/// Middle-mouse drag: pan focus. The right button belongs to the tool's
/// cancel, so orbiting is keyboard-only.
pub fn camera_pan_drag(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    bounds: Res<CameraBounds>,
    mut drag: ResMut<CameraDrag>,
    mut orbit: ResMut<OrbitCamera>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };

    if buttons.just_pressed(MouseButton::Middle) {
        if let Some(pos) = window.cursor_position() {
            drag.dragging = true;
            drag.last_pos = pos;
        }
    }
    if buttons.just_released(MouseButton::Middle) {
        drag.dragging = false;
    }

    if drag.dragging {
        if let Some(pos) = window.cursor_position() {
            let scale = orbit.distance / 1000.0;
            let ground = pan_on_ground(-(pos - drag.last_pos), orbit.yaw) * scale;
            orbit.focus.x += ground.x;
            orbit.focus.z += ground.y;
            clamp_focus(&mut orbit.focus, &bounds);
            drag.last_pos = pos;
        }
    }
}

/// Scroll wheel: zoom (change distance). R/F tilt.
pub fn camera_zoom(
    mut scroll_evts: EventReader<MouseWheel>,
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut orbit: ResMut<OrbitCamera>,
) {
    for evt in scroll_evts.read() {
        let dy = match evt.unit {
            MouseScrollUnit::Line => evt.y,
            MouseScrollUnit::Pixel => evt.y / 100.0,
        };
        let factor = 1.0 - dy * ZOOM_SPEED;
        orbit.distance = (orbit.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    let mut tilt = 0.0;
    if keys.pressed(KeyCode::KeyR) {
        tilt += 1.0;
    }
    if keys.pressed(KeyCode::KeyF) {
        tilt -= 1.0;
    }
    if tilt != 0.0 {
        orbit.pitch = (orbit.pitch + tilt * time.delta_secs()).clamp(MIN_PITCH, MAX_PITCH);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_camera_sits_above_focus() {
        let orbit = OrbitCamera::looking_at(Vec2::new(100.0, 50.0));
        let (pos, look_at) = orbit_to_transform(&orbit);
        assert_eq!(look_at, Vec3::new(100.0, 0.0, 50.0));
        assert!(pos.y > 0.0);
        assert!(((pos - look_at).length() - orbit.distance).abs() < 1e-3);
    }

    #[test]
    fn test_pan_follows_yaw() {
        let forward = pan_on_ground(Vec2::new(0.0, -1.0), 0.0);
        assert!((forward - Vec2::new(0.0, -1.0)).length() < 1e-5);
        let turned = pan_on_ground(Vec2::new(0.0, -1.0), std::f32::consts::FRAC_PI_2);
        assert!((turned - Vec2::new(-1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_focus_clamped_near_bounds() {
        let bounds = CameraBounds {
            min: Vec2::ZERO,
            max: Vec2::splat(100.0),
        };
        let mut focus = Vec3::new(5000.0, 0.0, -5000.0);
        clamp_focus(&mut focus, &bounds);
        assert_eq!(focus, Vec3::new(100.0 + FOCUS_MARGIN, 0.0, -FOCUS_MARGIN));
    }
}
