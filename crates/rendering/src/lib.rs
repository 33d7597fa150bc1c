use bevy::prelude::*;

use zoning::ZoningUpdateSet;

pub mod camera;
pub mod egui_input_guard;
pub mod picking;
pub mod tool_input;
pub mod zoning_gizmos;

use camera::{CameraBounds, CameraDrag};
use picking::CursorGroundPos;
use tool_input::PointerCapturedByUi;

/// Camera, picking, tool input and gizmo drawing for the zoning toolkit.
///
/// Needs `bevy_egui::EguiPlugin` for the pointer guard.
pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraDrag>()
            .init_resource::<CameraBounds>()
            .init_resource::<CursorGroundPos>()
            .init_resource::<PointerCapturedByUi>()
            .add_systems(Startup, (camera::setup_camera, setup_lighting))
            .add_systems(
                Update,
                (
                    camera::camera_keyboard,
                    camera::camera_pan_drag,
                    camera::camera_zoom,
                    camera::apply_orbit_camera,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    picking::update_cursor_ground_pos,
                    picking::update_cursor_hit,
                    tool_input::write_tool_input,
                )
                    .chain()
                    .after(camera::apply_orbit_camera)
                    .before(ZoningUpdateSet::Tool),
            )
            .add_systems(
                Update,
                (
                    zoning_gizmos::draw_road_segments,
                    zoning_gizmos::draw_zone_blocks,
                )
                    .after(ZoningUpdateSet::Apply),
            );
    }
}

fn setup_lighting(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.9, 0.9, 1.0),
        brightness: 300.0,
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::XYZ,
            -std::f32::consts::FRAC_PI_4,
            std::f32::consts::FRAC_PI_6,
            0.0,
        )),
    ));
}
